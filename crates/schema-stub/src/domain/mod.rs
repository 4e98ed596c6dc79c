//! Domain types for the stub responder.
//!
//! Configuration, errors and the link/stub data model shared by the schema
//! drivers, the router and the middleware.

pub mod config;
pub mod error;
pub mod types;

// Re-exports for convenience
pub use config::{ConfigError, StubConfig};
pub use error::{ApiError, StubError};
pub use types::{Driver, Link, StubData};
