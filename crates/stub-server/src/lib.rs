//! # Stub Server
//!
//! Standalone HTTP server answering every route of a JSON Hyper-Schema or
//! OpenAPI document with generated stub data.
//!
//! ```text
//! request ──→ TraceLayer ──→ StubLayer ──→ 404 fallback
//!                               │
//!                               └── matched link → stub response
//! ```

#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod app;
pub mod config;
pub mod telemetry;

pub use app::{build_router, serve};
pub use config::{HttpConfig, LoggingConfig, ServerConfig, ServerConfigError};
pub use telemetry::{init_logging, TelemetryError};
