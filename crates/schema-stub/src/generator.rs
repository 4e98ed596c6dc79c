//! Stub data generation from response schemas.
//!
//! Resolution order for a schema node:
//! 1. non-null `example`
//! 2. `allOf` / `properties` → object (allOf members merged first)
//! 3. `array` with `items` → one-element array
//! 4. `enum` → first value
//! 5. scalar `type` → its zero value, by [`SCALAR_PRIORITY`] rather than
//!    listing order (so nullable types still produce a value)
//! 6. `anyOf` / `oneOf` → first alternative
//!
//! Anything else cannot be generated.

use crate::domain::error::StubError;
use crate::domain::types::{Link, StubData};
use crate::schema::reference::{self, escape_token};
use crate::schema::Schema;
use serde_json::{json, Map, Value};

/// Maximum schema nesting followed while generating
pub const MAX_DEPTH: usize = 64;

/// Scalar types in the order their defaults are preferred
pub const SCALAR_PRIORITY: &[&str] = &["boolean", "integer", "number", "string", "null"];

/// Builds stub data for the links of one schema
pub struct ResponseGenerator<'a> {
    document: &'a Value,
}

impl<'a> ResponseGenerator<'a> {
    pub fn new(schema: &'a Schema) -> Self {
        Self {
            document: schema.document(),
        }
    }

    /// Stub data for `link`
    pub fn generate(&self, link: &Link) -> Result<StubData, StubError> {
        if let Some(example) = &link.example {
            return Ok(StubData {
                data: Some(example.clone()),
                schema: link.target_schema.clone(),
            });
        }

        let Some(target) = &link.target_schema else {
            return Ok(StubData::default());
        };

        let mut data = self.generate_properties(link, target, &link.schema_pointer, 0)?;
        if link.list {
            data = Value::Array(vec![data]);
        }

        Ok(StubData {
            data: Some(data),
            schema: Some(target.clone()),
        })
    }

    fn generate_properties(
        &self,
        link: &Link,
        node: &Value,
        pointer: &str,
        depth: usize,
    ) -> Result<Value, StubError> {
        if depth > MAX_DEPTH {
            return Err(StubError::RecursionLimit {
                method: link.method.to_string(),
                href: link.href.clone(),
                limit: MAX_DEPTH,
            });
        }

        let (schema, pointer) = reference::resolve(self.document, node, pointer)?;

        if let Some(example) = schema.get("example").filter(|e| !e.is_null()) {
            return Ok(example.clone());
        }

        let all_of = schema
            .get("allOf")
            .and_then(Value::as_array)
            .filter(|members| !members.is_empty());
        let properties = schema
            .get("properties")
            .and_then(Value::as_object)
            .filter(|properties| !properties.is_empty());

        if all_of.is_some() || properties.is_some() {
            let mut data = Map::new();

            for (index, member) in all_of.into_iter().flatten().enumerate() {
                let member_pointer = format!("{}/allOf/{}", pointer, index);
                if let Value::Object(fields) =
                    self.generate_properties(link, member, &member_pointer, depth + 1)?
                {
                    data.extend(fields);
                }
            }

            for (key, property) in properties.into_iter().flatten() {
                let property_pointer = format!("{}/properties/{}", pointer, escape_token(key));
                let value = self.generate_properties(link, property, &property_pointer, depth + 1)?;
                data.insert(key.clone(), value);
            }

            return Ok(Value::Object(data));
        }

        let types = schema_types(schema);

        if types.contains(&"array") {
            if let Some(items) = schema.get("items") {
                // Tuple-style `items` arrays use their first entry
                let (items, items_pointer) = match items.as_array() {
                    Some(tuple) => match tuple.first() {
                        Some(first) => (first, format!("{}/items/0", pointer)),
                        None => return Ok(json!([])),
                    },
                    None => (items, format!("{}/items", pointer)),
                };
                let item = self.generate_properties(link, items, &items_pointer, depth + 1)?;
                return Ok(Value::Array(vec![item]));
            }
        }

        if let Some(first) = schema
            .get("enum")
            .and_then(Value::as_array)
            .and_then(|values| values.first())
        {
            return Ok(first.clone());
        }

        if let Some(value) = SCALAR_PRIORITY
            .iter()
            .copied()
            .find(|scalar| types.contains(scalar))
            .and_then(scalar_default)
        {
            return Ok(value);
        }

        for keyword in ["anyOf", "oneOf"] {
            if let Some(first) = schema
                .get(keyword)
                .and_then(Value::as_array)
                .and_then(|alternatives| alternatives.first())
            {
                let alternative_pointer = format!("{}/{}/0", pointer, keyword);
                return self.generate_properties(link, first, &alternative_pointer, depth + 1);
            }
        }

        Err(StubError::Generation {
            method: link.method.to_string(),
            href: link.href.clone(),
            pointer,
            reason: "no \"example\" attribute and \"null\" is not allowed; \
                     don't know how to generate property"
                .to_string(),
        })
    }
}

/// `type` as a list: `"string"` and `["string"]` read the same
fn schema_types(schema: &Value) -> Vec<&str> {
    match schema.get("type") {
        Some(Value::String(t)) => vec![t.as_str()],
        Some(Value::Array(types)) => types.iter().filter_map(Value::as_str).collect(),
        _ => Vec::new(),
    }
}

fn scalar_default(schema_type: &str) -> Option<Value> {
    match schema_type {
        "boolean" => Some(Value::Bool(false)),
        "integer" => Some(json!(0)),
        "null" => Some(Value::Null),
        "number" => Some(json!(0.0)),
        "string" => Some(Value::String(String::new())),
        _ => None,
    }
}
