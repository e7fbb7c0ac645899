use regimpact_core::{CoreError, ValidationError};
use thiserror::Error;

/// CLI-level error categories mapped to exit codes.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("logging setup failed: {0}")]
    Logging(String),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Validation(error) | Self::Core(CoreError::Validation(error)) => {
                validation_exit_code(error)
            }
            Self::Core(CoreError::Yaml(_)) | Self::Logging(_) => 3,
            Self::Core(CoreError::Serialization(_)) | Self::Serialization(_) => 4,
            Self::Core(CoreError::Io { .. }) | Self::Io(_) => 10,
        }
    }
}

/// Bad configuration is reported apart from bad input.
const fn validation_exit_code(error: &ValidationError) -> u8 {
    match error {
        ValidationError::NonPositiveConfig { .. } | ValidationError::InvalidEnvOverride { .. } => 3,
        _ => 2,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_by_category() {
        assert_eq!(
            CliError::from(ValidationError::MissingField { field: "summary" }).exit_code(),
            2
        );
        assert_eq!(
            CliError::from(CoreError::from(ValidationError::NonPositiveConfig {
                field: "fetch_timeout_ms"
            }))
            .exit_code(),
            3
        );

        let yaml = regimpact_core::RuleTable::from_yaml_str("{ not: [a list")
            .expect_err("invalid yaml");
        assert!(matches!(yaml, CoreError::Yaml(_)));
        assert_eq!(CliError::from(yaml).exit_code(), 3);

        let json = serde_json::from_str::<serde_json::Value>("{").expect_err("invalid json");
        assert_eq!(CliError::from(json).exit_code(), 4);

        let io = CoreError::io(
            "/missing/insight.json",
            std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        );
        assert_eq!(CliError::from(io).exit_code(), 10);
    }
}
