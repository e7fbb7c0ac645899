//! Evaluation orchestrator.
//!
//! [`RiskEngine::evaluate`] scans the whole security directory: every
//! security is scored, not only the ones the regulation names. Market data is
//! fetched concurrently (bounded by `max_concurrent_fetches`), each call under
//! its own timeout; a timeout or provider failure only costs that security its
//! systemic tier. Provider setup such as session handshakes runs once before
//! the fan-out and is not charged to any security's timeout.

use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, StreamExt};
use tracing::{debug, info, instrument, warn};

use crate::aggregation::summarize_sectors;
use crate::config::EngineConfig;
use crate::directory::SecurityDirectory;
use crate::market_data::MarketDataProvider;
use crate::recommendation::top_level_action;
use crate::rules::RuleTable;
use crate::scoring::{rank_securities, score_security};
use crate::{CoreError, Evaluation, MarketSnapshot, RegulationInsight, Ticker};

/// Evaluation plus what went wrong on the way, for callers that report it.
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationRun {
    pub evaluation: Evaluation,
    /// Securities whose fetch exceeded the timeout.
    pub timed_out: Vec<Ticker>,
    /// Securities scored without a market capitalization (timeouts included).
    pub missing_market_data: Vec<Ticker>,
    /// Mentions that name no directory security, as written in the insight.
    pub unknown_mentions: Vec<String>,
}

struct Fetched {
    snapshot: MarketSnapshot,
    timed_out: bool,
}

pub struct RiskEngine {
    rules: Arc<RuleTable>,
    directory: Arc<SecurityDirectory>,
    provider: Arc<dyn MarketDataProvider>,
    fetch_timeout: Duration,
    max_concurrent_fetches: usize,
}

impl RiskEngine {
    pub fn new(
        rules: Arc<RuleTable>,
        directory: Arc<SecurityDirectory>,
        provider: Arc<dyn MarketDataProvider>,
    ) -> Self {
        let defaults = EngineConfig::default();
        Self {
            rules,
            directory,
            provider,
            fetch_timeout: defaults.fetch_timeout(),
            max_concurrent_fetches: defaults.max_concurrent_fetches,
        }
    }

    /// Load the configured tables and apply the configured limits.
    pub fn from_config(
        config: &EngineConfig,
        provider: Arc<dyn MarketDataProvider>,
    ) -> Result<Self, CoreError> {
        config.validate()?;
        let rules = Arc::new(config.load_rules()?);
        let directory = Arc::new(config.load_directory()?);
        Ok(Self::new(rules, directory, provider)
            .with_fetch_timeout(config.fetch_timeout())
            .with_max_concurrent_fetches(config.max_concurrent_fetches))
    }

    pub fn with_fetch_timeout(mut self, fetch_timeout: Duration) -> Self {
        self.fetch_timeout = fetch_timeout;
        self
    }

    pub fn with_max_concurrent_fetches(mut self, max_concurrent_fetches: usize) -> Self {
        self.max_concurrent_fetches = max_concurrent_fetches.max(1);
        self
    }

    pub fn rules(&self) -> &RuleTable {
        &self.rules
    }

    pub fn directory(&self) -> &SecurityDirectory {
        &self.directory
    }

    pub fn provider_id(&self) -> &'static str {
        self.provider.id()
    }

    /// Parse and validate a JSON insight, then evaluate it. Syntax errors
    /// surface as [`CoreError::Serialization`], shape errors as
    /// [`CoreError::Validation`].
    pub async fn evaluate_json(&self, input: &str) -> Result<Evaluation, CoreError> {
        let value: serde_json::Value = serde_json::from_str(input)?;
        let insight = RegulationInsight::from_value(&value)?;
        Ok(self.evaluate(&insight).await)
    }

    pub async fn evaluate(&self, insight: &RegulationInsight) -> Evaluation {
        self.evaluate_detailed(insight).await.evaluation
    }

    #[instrument(
        skip_all,
        fields(
            provider = self.provider.id(),
            rules_version = self.rules.version(),
            keywords = insight.keywords.len(),
            mentioned = insight.mentioned_tickers.len(),
        )
    )]
    pub async fn evaluate_detailed(&self, insight: &RegulationInsight) -> EvaluationRun {
        let records = self.directory.records();
        self.provider.prepare().await;
        let fetched = self.fetch_snapshots(records.iter().map(|record| &record.ticker)).await;

        let mut timed_out = Vec::new();
        let mut missing_market_data = Vec::new();
        let mut scored = Vec::new();
        for (record, outcome) in records.iter().zip(&fetched) {
            if outcome.timed_out {
                timed_out.push(record.ticker.clone());
            }
            if outcome.snapshot.market_cap.is_none() {
                missing_market_data.push(record.ticker.clone());
            }

            match score_security(record, insight, &self.rules, &outcome.snapshot) {
                Some(risk) => {
                    debug!(
                        ticker = %risk.ticker,
                        base_risk = risk.base_risk,
                        direct_hit_bonus = risk.direct_hit_bonus,
                        systemic_weight = risk.systemic_weight,
                        risk_score = risk.risk_score,
                        "security scored"
                    );
                    scored.push(risk);
                }
                None => debug!(ticker = %record.ticker, "security below relevance floor"),
            }
        }

        let unknown_mentions: Vec<String> = insight
            .mentioned_tickers
            .iter()
            .filter(|raw| !self.names_security(raw))
            .cloned()
            .collect();
        if !unknown_mentions.is_empty() {
            warn!(
                count = unknown_mentions.len(),
                "mentioned tickers outside the security directory are ignored"
            );
        }

        let per_security = rank_securities(scored);
        let sector_summary = summarize_sectors(&per_security);
        let action = top_level_action(&sector_summary);

        info!(
            universe = records.len(),
            scored = per_security.len(),
            sectors = sector_summary.len(),
            timed_out = timed_out.len(),
            missing_market_data = missing_market_data.len(),
            "evaluation complete"
        );

        EvaluationRun {
            evaluation: Evaluation {
                per_security,
                sector_summary,
                action,
            },
            timed_out,
            missing_market_data,
            unknown_mentions,
        }
    }

    fn names_security(&self, mention: &str) -> bool {
        Ticker::parse(mention).is_ok_and(|ticker| self.directory.get(&ticker).is_some())
    }

    /// One snapshot per ticker, in input order.
    async fn fetch_snapshots<'a>(
        &'a self,
        tickers: impl Iterator<Item = &'a Ticker>,
    ) -> Vec<Fetched> {
        stream::iter(tickers)
            .map(|ticker| self.fetch_snapshot(ticker))
            .buffered(self.max_concurrent_fetches)
            .collect()
            .await
    }

    async fn fetch_snapshot(&self, ticker: &Ticker) -> Fetched {
        match tokio::time::timeout(self.fetch_timeout, self.provider.snapshot(ticker)).await {
            Ok(snapshot) => Fetched {
                snapshot,
                timed_out: false,
            },
            Err(_) => {
                warn!(
                    %ticker,
                    timeout_ms = self.fetch_timeout.as_millis() as u64,
                    "market data fetch timed out, continuing with empty snapshot"
                );
                Fetched {
                    snapshot: MarketSnapshot::empty(ticker.clone()),
                    timed_out: true,
                }
            }
        }
    }
}
