//! Core types shared by the schema drivers, router and generator.

use crate::domain::config::ConfigError;
use axum::http::{Method, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Schema dialect used to read links out of a document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Driver {
    /// JSON Hyper-Schema (resources with `links`)
    #[serde(rename = "hyper_schema")]
    HyperSchema,
    /// OpenAPI 2.0 / Swagger
    #[serde(rename = "open_api_2")]
    OpenApi2,
    /// OpenAPI 3.x
    #[serde(rename = "open_api_3")]
    OpenApi3,
}

impl Driver {
    /// Configuration name of the driver
    pub fn name(&self) -> &'static str {
        match self {
            Driver::HyperSchema => "hyper_schema",
            Driver::OpenApi2 => "open_api_2",
            Driver::OpenApi3 => "open_api_3",
        }
    }

    /// Guess the driver from the document's version markers
    pub fn detect(document: &Value) -> Self {
        if document
            .get("openapi")
            .and_then(Value::as_str)
            .is_some_and(|v| v.starts_with('3'))
        {
            Driver::OpenApi3
        } else if document.get("swagger").and_then(Value::as_str) == Some("2.0") {
            Driver::OpenApi2
        } else {
            Driver::HyperSchema
        }
    }
}

impl fmt::Display for Driver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Driver {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "hyper_schema" => Ok(Driver::HyperSchema),
            "open_api_2" => Ok(Driver::OpenApi2),
            "open_api_3" => Ok(Driver::OpenApi3),
            other => Err(ConfigError::UnknownDriver(other.to_string())),
        }
    }
}

/// One schema operation: method, path template and response description
#[derive(Debug, Clone, PartialEq)]
pub struct Link {
    /// HTTP method
    pub method: Method,
    /// Path template, e.g. `/apps/{id}`
    pub href: String,
    /// Hyper-Schema relation (`create`, `self`, `instances`, ...)
    pub rel: Option<String>,
    /// Status of the stubbed response
    pub status_success: StatusCode,
    /// Schema of the response body
    pub target_schema: Option<Value>,
    /// JSON pointer of `target_schema` inside the document
    pub schema_pointer: String,
    /// Literal response example taken from the document
    pub example: Option<Value>,
    /// Generated data is wrapped in a one-element array
    pub list: bool,
    /// JSON pointer of the link itself
    pub pointer: String,
}

/// Stub body and the schema it was generated from
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StubData {
    /// Response body; `None` renders an empty body
    pub data: Option<Value>,
    /// Schema describing `data`
    pub schema: Option<Value>,
}
