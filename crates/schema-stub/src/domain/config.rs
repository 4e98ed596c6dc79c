//! Stub middleware configuration with validation.

use crate::domain::types::Driver;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Stub middleware configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StubConfig {
    /// Only paths starting with this prefix are stubbed; it is stripped
    /// before route matching
    pub prefix: Option<String>,
    /// Call-through: run the downstream service even for stubbed routes
    pub call: bool,
    /// Schema dialect (detected from the document when unset)
    pub driver: Option<Driver>,
    /// Schema file used by [`crate::StubLayer::from_config`]
    pub schema_path: Option<PathBuf>,
}

impl StubConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(prefix) = &self.prefix {
            if prefix.is_empty() {
                return Err(ConfigError::InvalidPrefix(
                    "prefix cannot be empty".into(),
                ));
            }
            if !prefix.starts_with('/') {
                return Err(ConfigError::InvalidPrefix(format!(
                    "prefix \"{}\" must start with '/'",
                    prefix
                )));
            }
        }

        Ok(())
    }

    /// Set the URL prefix
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// Enable or disable call-through
    pub fn with_call(mut self, call: bool) -> Self {
        self.call = call;
        self
    }

    /// Force a schema driver
    pub fn with_driver(mut self, driver: Driver) -> Self {
        self.driver = Some(driver);
        self
    }

    /// Set the schema file
    pub fn with_schema_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.schema_path = Some(path.into());
        self
    }
}

/// Configuration errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// Unusable URL prefix
    #[error("invalid prefix: {0}")]
    InvalidPrefix(String),
    /// Driver name not recognised
    #[error("unknown schema driver \"{0}\" (expected hyper_schema, open_api_2 or open_api_3)")]
    UnknownDriver(String),
}
