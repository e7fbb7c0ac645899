use regimpact_core::Envelope;
use serde_json::Value;

use crate::error::CliError;

pub fn render(envelope: &Envelope<Value>, pretty: bool) -> Result<(), CliError> {
    println!("{}", to_json(envelope, pretty)?);
    Ok(())
}

fn to_json(envelope: &Envelope<Value>, pretty: bool) -> Result<String, CliError> {
    let payload = if pretty {
        serde_json::to_string_pretty(envelope)?
    } else {
        serde_json::to_string(envelope)?
    };
    Ok(payload)
}

#[cfg(test)]
mod tests {
    use regimpact_core::EnvelopeMeta;
    use serde_json::json;

    use super::*;

    #[test]
    fn compact_output_is_a_single_line() {
        let meta = EnvelopeMeta::new("req-00000001", 0).expect("valid meta");
        let envelope = Envelope::new(meta, json!({"action": "none"}));

        let compact = to_json(&envelope, false).expect("serializes");
        assert!(!compact.contains('\n'));

        let pretty = to_json(&envelope, true).expect("serializes");
        assert!(pretty.lines().count() > 1);
    }
}
