use std::path::PathBuf;

use thiserror::Error;

/// Validation and contract errors exposed by `regimpact-core`.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    #[error("ticker cannot be empty")]
    EmptyTicker,
    #[error("ticker length {len} exceeds max {max}")]
    TickerTooLong { len: usize, max: usize },
    #[error("ticker must start with an ASCII letter: '{ch}'")]
    TickerInvalidStart { ch: char },
    #[error("ticker contains invalid character '{ch}' at index {index}")]
    TickerInvalidChar { ch: char, index: usize },

    #[error("insight must be a JSON object")]
    InsightNotAnObject,
    #[error("missing required field '{field}'")]
    MissingField { field: &'static str },
    #[error("field '{field}' must be {expected}")]
    InvalidFieldType {
        field: String,
        expected: &'static str,
    },

    #[error("rule table version cannot be empty")]
    EmptyRuleTableVersion,
    #[error("rule table must contain at least one rule")]
    EmptyRuleTable,
    #[error("rule #{index}: field '{field}' cannot be empty")]
    EmptyRuleField { index: usize, field: &'static str },
    #[error("rule #{index}: weight {weight} must be a finite value in [0, 1]")]
    WeightOutOfRange { index: usize, weight: f64 },

    #[error("security directory must contain at least one security")]
    EmptyDirectory,
    #[error("security '{ticker}': field '{field}' cannot be empty")]
    EmptySecurityField { ticker: String, field: &'static str },
    #[error("security '{ticker}' is listed more than once")]
    DuplicateTicker { ticker: String },

    #[error("request_id must contain at least 8 non-whitespace characters")]
    InvalidRequestId,

    #[error("config field '{field}' must be greater than zero")]
    NonPositiveConfig { field: &'static str },
    #[error("environment variable '{name}' has invalid value '{value}'")]
    InvalidEnvOverride { name: &'static str, value: String },
}

/// Top-level error type for core operations.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("failed to read '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl CoreError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
