use regimpact_core::{EngineConfig, MarketSnapshot, Ticker};
use serde::Serialize;

use crate::cli::SnapshotArgs;
use crate::error::CliError;

use super::{build_provider, CommandResult};

#[derive(Debug, Serialize)]
struct SnapshotResponseData {
    snapshots: Vec<MarketSnapshot>,
}

pub async fn run(args: &SnapshotArgs, config: &EngineConfig) -> Result<CommandResult, CliError> {
    let tickers = args
        .tickers
        .iter()
        .map(|raw| Ticker::parse(raw))
        .collect::<Result<Vec<_>, _>>()?;
    let provider = build_provider(&args.market, config)?;

    let mut snapshots = Vec::with_capacity(tickers.len());
    let mut warnings = Vec::new();
    for ticker in &tickers {
        let snapshot =
            match tokio::time::timeout(config.fetch_timeout(), provider.snapshot(ticker)).await {
                Ok(snapshot) => snapshot,
                Err(_) => {
                    warnings.push(format!("market data for {ticker} timed out"));
                    MarketSnapshot::empty(ticker.clone())
                }
            };
        if snapshot.is_empty() {
            warnings.push(format!("no market data available for {ticker}"));
        }
        snapshots.push(snapshot);
    }

    Ok(
        CommandResult::ok(serde_json::to_value(SnapshotResponseData { snapshots })?)
            .with_warnings(warnings)
            .with_provider(provider.id()),
    )
}
