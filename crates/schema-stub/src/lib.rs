//! Schema Stub - stub HTTP responses generated from an API schema.
//!
//! A tower middleware that matches requests against the links of a JSON
//! Hyper-Schema or OpenAPI document and answers them with example data from
//! the schema instead of running the application.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                           StubLayer                              │
//! ├──────────────────────────────────────────────────────────────────┤
//! │  Request ──→ Router (prefix, method, href pattern)               │
//! │                 │                                                │
//! │          no link│            link                                │
//! │                 ▼              │                                 │
//! │         downstream service     ▼                                 │
//! │                       ResponseGenerator (cached per route)       │
//! │                                │                                 │
//! │                   call-through?├── no ──→ stub response          │
//! │                                ▼                                 │
//! │                      downstream service                          │
//! │                       │ SuppressStub → downstream response       │
//! │                       │ ReplaceStub  → replaced stub             │
//! │                       └ otherwise    → stub + downstream headers │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use schema_stub::{Schema, StubConfig, StubLayer};
//!
//! let schema = Schema::from_path("schema.json", None)?;
//! let layer = StubLayer::new(schema, StubConfig::default().with_prefix("/v1"))?;
//! let app = axum::Router::new().fallback(handler).layer(layer);
//! ```

#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod domain;
pub mod generator;
pub mod middleware;
pub mod router;
pub mod schema;

// Re-exports for public API
pub use domain::config::{ConfigError, StubConfig};
pub use domain::error::{ApiError, StubError};
pub use domain::types::{Driver, Link, StubData};
pub use generator::ResponseGenerator;
pub use middleware::{ReplaceStub, StubLayer, StubService, StubbedResponse, SuppressStub};
pub use router::{Route, Router};
pub use schema::{Schema, SchemaSource};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
