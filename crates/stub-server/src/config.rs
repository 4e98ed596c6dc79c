//! Stub server configuration.
//!
//! Sources, later ones overriding earlier ones:
//! 1. defaults
//! 2. TOML file (`--config`)
//! 3. environment (`STUB_*`)
//! 4. command-line flags

use schema_stub::{ConfigError, Driver, StubConfig};
use serde::{Deserialize, Serialize};
use std::fs;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Main server configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// HTTP listener
    pub http: HttpConfig,
    /// Stub middleware
    pub stub: StubConfig,
    /// Log output
    pub logging: LoggingConfig,
}

impl ServerConfig {
    /// Load a TOML configuration file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ServerConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ServerConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(toml::from_str(&text)?)
    }

    /// Apply `STUB_*` overrides from the process environment
    pub fn apply_env(&mut self) -> Result<(), ServerConfigError> {
        self.apply_env_from(|key| std::env::var(key).ok())
    }

    /// Apply `STUB_*` overrides from `lookup`
    ///
    /// | Variable | Field |
    /// |----------|-------|
    /// | `STUB_HOST` | `http.host` |
    /// | `STUB_PORT` | `http.port` |
    /// | `STUB_SCHEMA` | `stub.schema_path` |
    /// | `STUB_PREFIX` | `stub.prefix` |
    /// | `STUB_DRIVER` | `stub.driver` |
    /// | `STUB_CALL` | `stub.call` |
    /// | `STUB_LOG_LEVEL` | `logging.level` |
    /// | `STUB_JSON_LOGS` | `logging.json` |
    pub fn apply_env_from<F>(&mut self, lookup: F) -> Result<(), ServerConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("STUB_HOST") {
            self.http.host = parse_env("STUB_HOST", &host)?;
        }
        if let Some(port) = lookup("STUB_PORT") {
            self.http.port = parse_env("STUB_PORT", &port)?;
        }
        if let Some(schema) = lookup("STUB_SCHEMA") {
            self.stub.schema_path = Some(PathBuf::from(schema));
        }
        if let Some(prefix) = lookup("STUB_PREFIX") {
            self.stub.prefix = Some(prefix);
        }
        if let Some(driver) = lookup("STUB_DRIVER") {
            self.stub.driver = Some(driver.parse::<Driver>()?);
        }
        if let Some(call) = lookup("STUB_CALL") {
            self.stub.call = parse_flag("STUB_CALL", &call)?;
        }
        if let Some(level) = lookup("STUB_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(json) = lookup("STUB_JSON_LOGS") {
            self.logging.json = parse_flag("STUB_JSON_LOGS", &json)?;
        }

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ServerConfigError> {
        if self.http.port == 0 {
            return Err(ServerConfigError::InvalidPort);
        }

        if self.stub.schema_path.is_none() {
            return Err(ServerConfigError::MissingSchema);
        }

        EnvFilter::try_new(&self.logging.level)
            .map_err(|e| ServerConfigError::InvalidLogLevel(format!("{}: {}", self.logging.level, e)))?;

        self.stub.validate()?;
        Ok(())
    }

    /// Listener address
    pub fn http_addr(&self) -> SocketAddr {
        SocketAddr::new(self.http.host, self.http.port)
    }
}

/// HTTP listener configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Bind address
    pub host: IpAddr,
    /// Port (default: 9292)
    pub port: u16,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)),
            port: 9292,
        }
    }
}

/// Log output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` takes precedence)
    pub level: String,
    /// JSON formatted logs
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ServerConfigError {
    /// Config file could not be read
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Config file is not valid TOML for [`ServerConfig`]
    #[error("invalid config file: {0}")]
    Toml(#[from] toml::de::Error),
    /// Environment variable with an unusable value
    #[error("invalid value for {key}: \"{value}\"")]
    InvalidEnv { key: String, value: String },
    /// Port 0
    #[error("port cannot be 0")]
    InvalidPort,
    /// Log filter that does not parse
    #[error("invalid log level: {0}")]
    InvalidLogLevel(String),
    /// No schema file configured
    #[error("no schema file configured (pass a path, set STUB_SCHEMA or stub.schema_path)")]
    MissingSchema,
    /// Invalid stub middleware configuration
    #[error(transparent)]
    Stub(#[from] ConfigError),
}

fn parse_env<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ServerConfigError> {
    value.trim().parse().map_err(|_| ServerConfigError::InvalidEnv {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_flag(key: &str, value: &str) -> Result<bool, ServerConfigError> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ServerConfigError::InvalidEnv {
            key: key.to_string(),
            value: value.to_string(),
        }),
    }
}
