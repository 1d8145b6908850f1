use serde::Deserialize;
use std::{fs, path::Path};
use thiserror::Error as ThisError;

/// Default maximum nesting of filters, relation writes, and includes.
pub const DEFAULT_MAX_DEPTH: usize = 32;

/// Default maximum length of any list operand (in, hasSome, nested create arrays).
pub const DEFAULT_MAX_LIST_LEN: usize = 1000;

///
/// ConfigError
///

#[derive(Debug, ThisError)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

///
/// Config
///
/// Validation limits for one session.
/// Loaded from TOML; omitted keys take their defaults.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub max_depth: usize,
    pub max_list_len: usize,
    /// Record validation and storage counters in the metrics sink.
    pub metrics: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            max_list_len: DEFAULT_MAX_LIST_LEN,
            metrics: true,
        }
    }
}

impl Config {
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(input)?;
        config.validate()?;

        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;

        Self::from_toml_str(&text)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.max_depth == 0 {
            return Err(ConfigError::Invalid("max_depth must be at least 1".into()));
        }
        if self.max_list_len == 0 {
            return Err(ConfigError::Invalid(
                "max_list_len must be at least 1".into(),
            ));
        }

        Ok(())
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        let config = Config::from_toml_str("").expect("empty config should parse");

        assert_eq!(config, Config::default());
    }

    #[test]
    fn partial_document_overrides_named_keys() {
        let config = Config::from_toml_str("max_depth = 4\nmetrics = false\n")
            .expect("partial config should parse");

        assert_eq!(config.max_depth, 4);
        assert_eq!(config.max_list_len, DEFAULT_MAX_LIST_LEN);
        assert!(!config.metrics);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = Config::from_toml_str("max_dept = 4").expect_err("typo should fail");

        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn zero_limits_are_rejected() {
        let err = Config::from_toml_str("max_list_len = 0").expect_err("zero limit should fail");

        assert!(matches!(err, ConfigError::Invalid(_)));
    }
}
