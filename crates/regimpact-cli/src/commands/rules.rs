use regimpact_core::EngineConfig;

use crate::error::CliError;

use super::CommandResult;

pub fn run(config: &EngineConfig) -> Result<CommandResult, CliError> {
    let table = config.load_rules()?;
    Ok(CommandResult::ok(serde_json::to_value(&table)?)
        .with_rule_table_version(table.version()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prints_builtin_table() {
        let result = run(&EngineConfig::default()).expect("builtin rules");
        assert_eq!(result.data["version"], "1.0.0");
        assert_eq!(result.data["rules"].as_array().map(Vec::len), Some(6));
        assert_eq!(result.data["rules"][0]["keyword"], "semiconductor");
    }
}
