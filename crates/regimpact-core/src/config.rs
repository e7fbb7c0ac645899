//! Engine configuration.
//!
//! Resolution order: built-in defaults, then an optional YAML file, then
//! `REGIMPACT_*` environment variables. Command-line flags are applied last by
//! the binary.
//!
//! ```yaml
//! fetch_timeout_ms: 3000
//! max_concurrent_fetches: 8
//! rules_path: ./rules.yaml
//! directory_path: ./universe.yaml
//! yahoo:
//!   requests_per_second: 5
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::directory::SecurityDirectory;
use crate::market_data::YahooConfig;
use crate::rules::RuleTable;
use crate::{CoreError, ValidationError};

pub const ENV_FETCH_TIMEOUT_MS: &str = "REGIMPACT_FETCH_TIMEOUT_MS";
pub const ENV_MAX_CONCURRENT_FETCHES: &str = "REGIMPACT_MAX_CONCURRENT_FETCHES";
pub const ENV_RULES_PATH: &str = "REGIMPACT_RULES_PATH";
pub const ENV_DIRECTORY_PATH: &str = "REGIMPACT_DIRECTORY_PATH";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Per-security budget for one market data fetch.
    pub fetch_timeout_ms: u64,
    pub max_concurrent_fetches: usize,
    /// Rule table replacing the built-in one.
    pub rules_path: Option<PathBuf>,
    /// Security directory replacing the built-in one.
    pub directory_path: Option<PathBuf>,
    pub yahoo: YahooConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            fetch_timeout_ms: 3_000,
            max_concurrent_fetches: 8,
            rules_path: None,
            directory_path: None,
            yahoo: YahooConfig::default(),
        }
    }
}

impl EngineConfig {
    pub fn from_yaml_str(input: &str) -> Result<Self, CoreError> {
        Ok(serde_yaml::from_str(input)?)
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, CoreError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|error| CoreError::io(path, error))?;
        Self::from_yaml_str(&contents)
    }

    /// Defaults or `path`, then the process environment, then validation.
    pub fn load(path: Option<&Path>) -> Result<Self, CoreError> {
        let mut config = match path {
            Some(path) => Self::from_yaml_file(path)?,
            None => Self::default(),
        };
        config.apply_env_overrides_with(|name| std::env::var(name).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `REGIMPACT_*` overrides read through `lookup`. Blank values are ignored.
    pub fn apply_env_overrides_with<F>(&mut self, lookup: F) -> Result<(), ValidationError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        if let Some(value) = read(ENV_FETCH_TIMEOUT_MS) {
            self.fetch_timeout_ms = parse_number(ENV_FETCH_TIMEOUT_MS, &value)?;
        }
        if let Some(value) = read(ENV_MAX_CONCURRENT_FETCHES) {
            self.max_concurrent_fetches = parse_number(ENV_MAX_CONCURRENT_FETCHES, &value)?;
        }
        if let Some(value) = read(ENV_RULES_PATH) {
            self.rules_path = Some(PathBuf::from(value));
        }
        if let Some(value) = read(ENV_DIRECTORY_PATH) {
            self.directory_path = Some(PathBuf::from(value));
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.fetch_timeout_ms == 0 {
            return Err(ValidationError::NonPositiveConfig {
                field: "fetch_timeout_ms",
            });
        }
        if self.max_concurrent_fetches == 0 {
            return Err(ValidationError::NonPositiveConfig {
                field: "max_concurrent_fetches",
            });
        }
        if self.yahoo.requests_per_second == 0 {
            return Err(ValidationError::NonPositiveConfig {
                field: "yahoo.requests_per_second",
            });
        }
        Ok(())
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }

    pub fn load_rules(&self) -> Result<RuleTable, CoreError> {
        match &self.rules_path {
            Some(path) => RuleTable::from_yaml_file(path),
            None => Ok(RuleTable::builtin()),
        }
    }

    pub fn load_directory(&self) -> Result<SecurityDirectory, CoreError> {
        match &self.directory_path {
            Some(path) => SecurityDirectory::from_yaml_file(path),
            None => Ok(SecurityDirectory::builtin()),
        }
    }
}

fn parse_number<T: std::str::FromStr>(name: &'static str, value: &str) -> Result<T, ValidationError> {
    value
        .trim()
        .parse()
        .map_err(|_| ValidationError::InvalidEnvOverride {
            name,
            value: value.to_owned(),
        })
}
