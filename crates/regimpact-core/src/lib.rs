//! Core contracts for regimpact.
//!
//! This crate contains:
//! - Domain models and input validation
//! - The keyword rule table and the security directory
//! - The market data provider contract and its adapters
//! - Scoring, sector aggregation and the top-level recommendation
//! - The evaluation orchestrator, configuration and output envelope

pub mod aggregation;
pub mod config;
pub mod directory;
pub mod domain;
pub mod engine;
pub mod envelope;
pub mod error;
pub mod http_client;
pub mod market_data;
pub mod recommendation;
pub mod rules;
pub mod scoring;
pub mod severity;

pub use aggregation::summarize_sectors;
pub use config::EngineConfig;
pub use directory::{SecurityDirectory, SecurityRecord};
pub use domain::{Evaluation, MarketSnapshot, RegulationInsight, SectorSummary, SecurityRisk, Ticker};
pub use engine::{EvaluationRun, RiskEngine};
pub use envelope::{Envelope, EnvelopeMeta};
pub use error::{CoreError, ValidationError};
pub use http_client::{HttpClient, HttpError, HttpRequest, HttpResponse, ReqwestHttpClient};
pub use market_data::{
    MarketDataError, MarketDataErrorKind, MarketDataProvider, StaticMarketData, YahooConfig,
    YahooMarketData,
};
pub use recommendation::top_level_action;
pub use rules::{KeywordRule, RuleTable, BUILTIN_RULES_VERSION};
pub use scoring::score_security;
pub use severity::{SeverityAssessment, SeverityLevel};
