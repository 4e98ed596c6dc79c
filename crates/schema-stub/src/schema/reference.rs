//! Local `$ref` resolution.
//!
//! Only references into the same document (`#/...`) are supported.

use crate::domain::error::StubError;
use serde_json::Value;

/// Maximum number of `$ref` hops followed from a single node
pub const MAX_REFERENCE_HOPS: usize = 32;

/// Follow `$ref` from `node` until a schema without one is reached.
///
/// Returns the resolved node together with the pointer it was found at
/// (`pointer` itself when `node` is not a reference).
pub fn resolve<'a>(
    document: &'a Value,
    node: &'a Value,
    pointer: &str,
) -> Result<(&'a Value, String), StubError> {
    let mut current = node;
    let mut location = pointer.to_string();

    for _ in 0..MAX_REFERENCE_HOPS {
        match current.get("$ref").and_then(Value::as_str) {
            Some(reference) => {
                current = lookup(document, reference)?;
                location = reference.to_string();
            }
            None => return Ok((current, location)),
        }
    }

    Err(StubError::UnresolvedReference(format!(
        "{} (more than {} hops)",
        location, MAX_REFERENCE_HOPS
    )))
}

/// Look up a single local reference
pub fn lookup<'a>(document: &'a Value, reference: &str) -> Result<&'a Value, StubError> {
    let fragment = reference
        .strip_prefix('#')
        .ok_or_else(|| StubError::UnresolvedReference(reference.to_string()))?;

    if fragment.is_empty() {
        return Ok(document);
    }

    document
        .pointer(fragment)
        .ok_or_else(|| StubError::UnresolvedReference(reference.to_string()))
}

/// Escape a key for use as a JSON pointer token
pub fn escape_token(token: &str) -> String {
    token.replace('~', "~0").replace('/', "~1")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn document() -> Value {
        json!({
            "definitions": {
                "app": {
                    "definitions": {
                        "name": {"type": ["string"], "example": "example"},
                        "alias": {"$ref": "#/definitions/app/definitions/name"}
                    }
                },
                "a/b": {"type": "integer"},
                "loop": {"$ref": "#/definitions/loop"}
            }
        })
    }

    #[test]
    fn test_resolve_plain_node() {
        let doc = document();
        let node = json!({"type": "string"});
        let (resolved, pointer) = resolve(&doc, &node, "#/x").unwrap();
        assert_eq!(resolved, &node);
        assert_eq!(pointer, "#/x");
    }

    #[test]
    fn test_resolve_chain() {
        let doc = document();
        let node = json!({"$ref": "#/definitions/app/definitions/alias"});
        let (resolved, pointer) = resolve(&doc, &node, "#/x").unwrap();
        assert_eq!(resolved["example"], "example");
        assert_eq!(pointer, "#/definitions/app/definitions/name");
    }

    #[test]
    fn test_escaped_token() {
        let doc = document();
        let reference = format!("#/definitions/{}", escape_token("a/b"));
        assert_eq!(lookup(&doc, &reference).unwrap()["type"], "integer");
    }

    #[test]
    fn test_root_reference() {
        let doc = document();
        assert_eq!(lookup(&doc, "#").unwrap(), &doc);
    }

    #[test]
    fn test_unresolved_reference() {
        let doc = document();
        assert!(matches!(
            lookup(&doc, "#/definitions/missing"),
            Err(StubError::UnresolvedReference(_))
        ));
        assert!(matches!(
            lookup(&doc, "other.json#/definitions/app"),
            Err(StubError::UnresolvedReference(_))
        ));
    }

    #[test]
    fn test_reference_cycle() {
        let doc = document();
        let node = json!({"$ref": "#/definitions/loop"});
        assert!(matches!(
            resolve(&doc, &node, "#"),
            Err(StubError::UnresolvedReference(_))
        ));
    }
}
