use regimpact_core::{EngineConfig, RegulationInsight, Ticker};

use crate::cli::DemoArgs;
use crate::error::CliError;

use super::evaluate::evaluate_insight;
use super::CommandResult;

pub async fn run(args: &DemoArgs, config: &EngineConfig) -> Result<CommandResult, CliError> {
    let insight = demo_insight()?;
    evaluate_insight(&insight, &args.market, args.with_severity, config).await
}

/// Carbon tax on US commercial aviation, naming Boeing.
fn demo_insight() -> Result<RegulationInsight, CliError> {
    Ok(RegulationInsight::new(
        vec![
            String::from("carbon tax"),
            String::from("emission standard"),
            String::from("aviation"),
        ],
        vec![String::from("Industrials")],
        vec![Ticker::parse("BA")?],
        "New carbon tax on US commercial aviation with stricter emission standards for aircraft.",
    ))
}
