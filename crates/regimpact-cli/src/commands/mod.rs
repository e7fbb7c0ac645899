mod demo;
mod evaluate;
mod rules;
mod snapshot;
mod universe;

use std::sync::Arc;
use std::time::Instant;

use regimpact_core::{
    EngineConfig, Envelope, EnvelopeMeta, MarketDataProvider, StaticMarketData, YahooMarketData,
};
use serde_json::Value;
use tracing::debug;

use crate::cli::{Cli, Command, MarketDataArgs};
use crate::error::CliError;
use crate::metadata::RequestId;

#[derive(Debug)]
pub struct CommandResult {
    pub data: Value,
    pub warnings: Vec<String>,
    pub enrichment: Option<Value>,
    pub provider: Option<&'static str>,
    pub rule_table_version: Option<String>,
}

impl CommandResult {
    pub fn ok(data: Value) -> Self {
        Self {
            data,
            warnings: Vec::new(),
            enrichment: None,
            provider: None,
            rule_table_version: None,
        }
    }

    pub fn with_warnings(mut self, warnings: Vec<String>) -> Self {
        self.warnings.extend(warnings);
        self
    }

    pub fn with_enrichment(mut self, enrichment: Option<Value>) -> Self {
        self.enrichment = enrichment;
        self
    }

    pub fn with_provider(mut self, provider: &'static str) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn with_rule_table_version(mut self, version: impl Into<String>) -> Self {
        self.rule_table_version = Some(version.into());
        self
    }
}

pub async fn run(cli: &Cli) -> Result<Envelope<Value>, CliError> {
    let started = Instant::now();
    let config = resolve_config(cli)?;

    let command_result = match &cli.command {
        Command::Evaluate(args) => evaluate::run(args, &config).await?,
        Command::Demo(args) => demo::run(args, &config).await?,
        Command::Rules => rules::run(&config)?,
        Command::Universe => universe::run(&config)?,
        Command::Snapshot(args) => snapshot::run(args, &config).await?,
    };

    let CommandResult {
        data,
        warnings,
        enrichment,
        provider,
        rule_table_version,
    } = command_result;

    let latency_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
    let mut meta = EnvelopeMeta::new(RequestId::new_v4().to_string(), latency_ms)?;
    if let Some(provider) = provider {
        meta = meta.with_provider(provider);
    }
    if let Some(version) = rule_table_version {
        meta = meta.with_rule_table_version(version);
    }
    for warning in warnings {
        meta.push_warning(warning);
    }
    debug!(
        request_id = %meta.request_id,
        latency_ms,
        warnings = meta.warnings.len(),
        "command complete"
    );

    let envelope = Envelope::new(meta, data);
    Ok(match enrichment {
        Some(enrichment) => envelope.with_enrichment(enrichment),
        None => envelope,
    })
}

/// File and environment configuration, then command-line overrides.
fn resolve_config(cli: &Cli) -> Result<EngineConfig, CliError> {
    let mut config = EngineConfig::load(cli.config.as_deref())?;
    apply_flag_overrides(cli, &mut config);
    config.validate()?;
    Ok(config)
}

fn apply_flag_overrides(cli: &Cli, config: &mut EngineConfig) {
    if let Some(path) = &cli.rules {
        config.rules_path = Some(path.clone());
    }
    if let Some(path) = &cli.directory {
        config.directory_path = Some(path.clone());
    }
    if let Some(timeout_ms) = cli.timeout_ms {
        config.fetch_timeout_ms = timeout_ms;
        config.yahoo.request_timeout_ms = timeout_ms;
    }
    if let Some(limit) = cli.max_concurrent_fetches {
        config.max_concurrent_fetches = limit;
    }
}

/// Fixture file, empty offline provider, or live Yahoo Finance.
fn build_provider(
    args: &MarketDataArgs,
    config: &EngineConfig,
) -> Result<Arc<dyn MarketDataProvider>, CliError> {
    if let Some(path) = &args.market_data {
        return Ok(Arc::new(StaticMarketData::from_json_file(path)?));
    }
    if args.offline {
        return Ok(Arc::new(StaticMarketData::new()));
    }
    Ok(Arc::new(YahooMarketData::with_reqwest(config.yahoo.clone())))
}
