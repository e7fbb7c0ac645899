use tracing_subscriber::EnvFilter;

use crate::error::CliError;

const DEFAULT_FILTER: &str = "warn";

/// Install the global subscriber. Logs go to stderr so stdout stays a single
/// JSON document.
pub fn init(level: Option<&str>) -> Result<(), CliError> {
    let filter = build_filter(level)?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|error| CliError::Logging(error.to_string()))
}

/// `--log-level` wins over `RUST_LOG`, which wins over the default.
fn build_filter(level: Option<&str>) -> Result<EnvFilter, CliError> {
    match level {
        Some(directive) => EnvFilter::try_new(directive)
            .map_err(|error| CliError::Logging(format!("invalid log level '{directive}': {error}"))),
        None => Ok(EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))),
    }
}
