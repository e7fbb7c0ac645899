use std::io::Read;
use std::path::Path;

use regimpact_core::{severity, CoreError, EngineConfig, RegulationInsight, RiskEngine};
use serde_json::{json, Value};

use crate::cli::{EvaluateArgs, MarketDataArgs};
use crate::error::CliError;

use super::{build_provider, CommandResult};

pub async fn run(args: &EvaluateArgs, config: &EngineConfig) -> Result<CommandResult, CliError> {
    let raw = read_input(&args.input)?;
    let insight = parse_insight(&raw)?;
    evaluate_insight(&insight, &args.market, args.with_severity, config).await
}

/// Malformed JSON and malformed insights map to different exit codes.
fn parse_insight(raw: &str) -> Result<RegulationInsight, CliError> {
    let value: Value = serde_json::from_str(raw)?;
    Ok(RegulationInsight::from_value(&value)?)
}

fn read_input(input: &str) -> Result<String, CliError> {
    if input == "-" {
        let mut buffer = String::new();
        std::io::stdin().read_to_string(&mut buffer)?;
        return Ok(buffer);
    }
    let path = Path::new(input);
    std::fs::read_to_string(path).map_err(|error| CliError::from(CoreError::io(path, error)))
}

pub(super) async fn evaluate_insight(
    insight: &RegulationInsight,
    market: &MarketDataArgs,
    with_severity: bool,
    config: &EngineConfig,
) -> Result<CommandResult, CliError> {
    let provider = build_provider(market, config)?;
    let engine = RiskEngine::from_config(config, provider)?;
    let run = engine.evaluate_detailed(insight).await;

    let mut warnings = Vec::new();
    if !run.timed_out.is_empty() {
        warnings.push(format!(
            "market data timed out for {} securities: {}",
            run.timed_out.len(),
            join_tickers(&run.timed_out)
        ));
    }
    if !run.missing_market_data.is_empty() {
        warnings.push(format!(
            "no market capitalization for {} of {} securities; default systemic weight applied",
            run.missing_market_data.len(),
            engine.directory().len()
        ));
    }
    if !run.unknown_mentions.is_empty() {
        warnings.push(format!(
            "mentioned tickers not in the security directory were ignored: {}",
            run.unknown_mentions.join(", ")
        ));
    }

    let enrichment = with_severity.then(|| json!({ "severity": severity::assess(&insight.summary) }));

    Ok(CommandResult::ok(serde_json::to_value(&run.evaluation)?)
        .with_warnings(warnings)
        .with_enrichment(enrichment)
        .with_provider(engine.provider_id())
        .with_rule_table_version(engine.rules().version()))
}

fn join_tickers(tickers: &[regimpact_core::Ticker]) -> String {
    tickers
        .iter()
        .map(|ticker| ticker.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}
