//! Schema loading and link extraction.
//!
//! A [`Schema`] keeps the raw document (for `$ref` resolution during stub
//! generation) next to the links its driver found in it.

mod hyper_schema;
mod openapi;
pub mod reference;

use crate::domain::error::StubError;
use crate::domain::types::{Driver, Link};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

/// Target used for deprecation warnings
pub const DEPRECATION_TARGET: &str = "schema_stub::deprecation";

/// Parsed API schema
#[derive(Debug, Clone)]
pub struct Schema {
    document: Value,
    driver: Driver,
    links: Vec<Link>,
}

impl Schema {
    /// Parse a JSON document. The driver is detected when not given.
    pub fn from_value(document: Value, driver: Option<Driver>) -> Result<Self, StubError> {
        if !document.is_object() {
            return Err(StubError::invalid("#", "schema document must be a JSON object"));
        }

        let driver = driver.unwrap_or_else(|| Driver::detect(&document));
        let links = match driver {
            Driver::HyperSchema => hyper_schema::parse_links(&document)?,
            Driver::OpenApi2 => openapi::parse_v2_links(&document)?,
            Driver::OpenApi3 => openapi::parse_v3_links(&document)?,
        };

        debug!(driver = %driver, links = links.len(), "Parsed schema");

        Ok(Self {
            document,
            driver,
            links,
        })
    }

    /// Parse JSON text
    pub fn from_json(text: &str, driver: Option<Driver>) -> Result<Self, StubError> {
        let document: Value = serde_json::from_str(text)?;
        Self::from_value(document, driver)
    }

    /// Read and parse a schema file
    pub fn from_path(path: impl AsRef<Path>, driver: Option<Driver>) -> Result<Self, StubError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| StubError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text, driver)
    }

    /// Raw document
    pub fn document(&self) -> &Value {
        &self.document
    }

    /// Driver used to read the document
    pub fn driver(&self) -> Driver {
        self.driver
    }

    /// Links in document order
    pub fn links(&self) -> &[Link] {
        &self.links
    }
}

/// The forms in which a schema can be handed to the middleware
#[derive(Debug, Clone)]
pub enum SchemaSource {
    /// Already parsed schema
    Parsed(Arc<Schema>),
    /// JSON document
    Document(Value),
    /// Schema file on disk
    Path(PathBuf),
    /// Raw JSON text.
    ///
    /// Legacy form: accepted with a deprecation warning. Parse the text
    /// with [`Schema::from_json`] or pass a [`SchemaSource::Path`] instead.
    Text(String),
}

impl SchemaSource {
    /// Produce the parsed schema
    pub fn load(self, driver: Option<Driver>) -> Result<Arc<Schema>, StubError> {
        match self {
            SchemaSource::Parsed(schema) => Ok(schema),
            SchemaSource::Document(document) => Schema::from_value(document, driver).map(Arc::new),
            SchemaSource::Path(path) => Schema::from_path(&path, driver).map(Arc::new),
            SchemaSource::Text(text) => {
                warn_deprecated(
                    "passing the schema as a JSON string is deprecated; \
                     pass a parsed schema or a schema path instead",
                );
                Schema::from_json(&text, driver).map(Arc::new)
            }
        }
    }
}

impl From<Schema> for SchemaSource {
    fn from(schema: Schema) -> Self {
        SchemaSource::Parsed(Arc::new(schema))
    }
}

impl From<Arc<Schema>> for SchemaSource {
    fn from(schema: Arc<Schema>) -> Self {
        SchemaSource::Parsed(schema)
    }
}

impl From<Value> for SchemaSource {
    fn from(document: Value) -> Self {
        SchemaSource::Document(document)
    }
}

impl From<PathBuf> for SchemaSource {
    fn from(path: PathBuf) -> Self {
        SchemaSource::Path(path)
    }
}

impl From<&Path> for SchemaSource {
    fn from(path: &Path) -> Self {
        SchemaSource::Path(path.to_path_buf())
    }
}

/// Emit a deprecation warning for a legacy configuration form
pub fn warn_deprecated(message: &str) {
    warn!(target: DEPRECATION_TARGET, "[DEPRECATION] {}", message);
}
