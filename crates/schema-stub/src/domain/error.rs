//! Stub responder error types.
//!
//! [`StubError`] covers schema loading, routing and stub generation.
//! [`ApiError`] is the JSON body a client receives when the middleware itself
//! cannot produce a stub.

use crate::domain::config::ConfigError;
use axum::{
    body::Body,
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// Identifiers rendered in the `id` field of error bodies
pub mod ids {
    pub const INTERNAL_SERVER_ERROR: &str = "internal_server_error";
    pub const STUB_UNAVAILABLE: &str = "stub_unavailable";
    pub const NOT_FOUND: &str = "not_found";
}

/// Client-facing error with an HTTP status
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    /// HTTP status of the rendered response
    pub status: StatusCode,
    /// Machine-readable identifier
    pub id: String,
    /// Human-readable message
    pub message: String,
}

impl ApiError {
    /// Create a new API error
    pub fn new(status: StatusCode, id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status,
            id: id.into(),
            message: message.into(),
        }
    }

    /// Internal error
    pub fn internal(details: impl Into<String>) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            ids::INTERNAL_SERVER_ERROR,
            details,
        )
    }

    /// The schema describes the route but no stub could be generated for it
    pub fn stub_unavailable(details: impl Into<String>) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            ids::STUB_UNAVAILABLE,
            format!("Stub unavailable: {}", details.into()),
        )
    }

    /// No route for the request
    pub fn not_found(path: &str) -> Self {
        Self::new(
            StatusCode::NOT_FOUND,
            ids::NOT_FOUND,
            format!("No route for {}", path),
        )
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.status.as_u16(), self.id, self.message)
    }
}

impl std::error::Error for ApiError {}

impl Serialize for ApiError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeStruct;
        let mut state = serializer.serialize_struct("ApiError", 2)?;
        state.serialize_field("id", &self.id)?;
        state.serialize_field("message", &self.message)?;
        state.end()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut response = Response::new(Body::from(serde_json::to_vec(&self).unwrap_or_default()));
        *response.status_mut() = self.status;
        response.headers_mut().insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        response
    }
}

impl From<&StubError> for ApiError {
    fn from(e: &StubError) -> Self {
        match e {
            StubError::Generation { .. } | StubError::RecursionLimit { .. } => {
                ApiError::stub_unavailable(e.to_string())
            }
            _ => ApiError::internal(e.to_string()),
        }
    }
}

/// Errors raised while loading a schema or producing a stub
#[derive(Debug, thiserror::Error)]
pub enum StubError {
    /// Neither a schema nor a schema path was configured
    #[error("no schema configured: pass a schema or set `schema_path`")]
    MissingSchema,

    /// Schema file could not be read
    #[error("failed to read schema {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Schema text is not valid JSON
    #[error("failed to parse schema JSON: {0}")]
    Parse(#[from] serde_json::Error),

    /// Document is JSON but not a usable schema
    #[error("invalid schema at \"{pointer}\": {reason}")]
    InvalidSchema { pointer: String, reason: String },

    /// `$ref` that does not point into the document
    #[error("unresolved reference \"{0}\"")]
    UnresolvedReference(String),

    /// Link href that cannot be turned into a route pattern
    #[error("invalid route pattern for \"{href}\": {source}")]
    Pattern {
        href: String,
        #[source]
        source: regex::Error,
    },

    /// Schema node with nothing to build a value from
    #[error("at \"{method} {href}\" \"{pointer}\": {reason}")]
    Generation {
        method: String,
        href: String,
        pointer: String,
        reason: String,
    },

    /// Schema nesting too deep (usually a recursive schema)
    #[error("at \"{method} {href}\": schema nesting exceeds {limit} levels")]
    RecursionLimit {
        method: String,
        href: String,
        limit: usize,
    },

    /// Invalid middleware configuration
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl StubError {
    pub(crate) fn invalid(pointer: impl Into<String>, reason: impl Into<String>) -> Self {
        StubError::InvalidSchema {
            pointer: pointer.into(),
            reason: reason.into(),
        }
    }
}
