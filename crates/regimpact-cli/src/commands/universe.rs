use regimpact_core::EngineConfig;
use serde_json::json;

use crate::error::CliError;

use super::CommandResult;

pub fn run(config: &EngineConfig) -> Result<CommandResult, CliError> {
    let directory = config.load_directory()?;
    Ok(CommandResult::ok(json!({
        "sectors": directory.sectors(),
        "securities": directory.records(),
    })))
}
