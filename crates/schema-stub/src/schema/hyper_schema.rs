//! JSON Hyper-Schema driver.
//!
//! Resources are the root `properties` (or `definitions` when the root has
//! no properties). Every entry of a resource's `links` that carries a
//! `method` becomes a [`Link`].

use super::reference::{self, escape_token};
use crate::domain::error::StubError;
use crate::domain::types::Link;
use axum::http::{Method, StatusCode};
use serde_json::Value;

/// Relations whose response is the resource itself when no `targetSchema`
/// is given
const LEGACY_RELS: &[&str] = &["create", "destroy", "self", "update", "instances"];

pub(super) fn parse_links(document: &Value) -> Result<Vec<Link>, StubError> {
    let (resources, section) = match document.get("properties").and_then(Value::as_object) {
        Some(properties) if !properties.is_empty() => (properties, "properties"),
        _ => match document.get("definitions").and_then(Value::as_object) {
            Some(definitions) => (definitions, "definitions"),
            None => return Ok(Vec::new()),
        },
    };

    let mut links = Vec::new();
    for (name, resource) in resources {
        let pointer = format!("#/{}/{}", section, escape_token(name));
        let (resource, resource_pointer) = reference::resolve(document, resource, &pointer)?;

        let Some(entries) = resource.get("links") else {
            continue;
        };
        let entries = entries
            .as_array()
            .ok_or_else(|| StubError::invalid(format!("{}/links", resource_pointer), "links must be an array"))?;

        for (index, entry) in entries.iter().enumerate() {
            let link_pointer = format!("{}/links/{}", resource_pointer, index);
            if let Some(link) = parse_link(entry, resource, &resource_pointer, link_pointer)? {
                links.push(link);
            }
        }
    }

    Ok(links)
}

fn parse_link(
    entry: &Value,
    parent: &Value,
    parent_pointer: &str,
    pointer: String,
) -> Result<Option<Link>, StubError> {
    // Links without a method (e.g. root `self` links) are not routable
    let Some(method) = entry.get("method").and_then(Value::as_str) else {
        return Ok(None);
    };
    let method = Method::from_bytes(method.to_ascii_uppercase().as_bytes())
        .map_err(|_| StubError::invalid(format!("{}/method", pointer), format!("invalid method \"{}\"", method)))?;

    let href = entry
        .get("href")
        .and_then(Value::as_str)
        .ok_or_else(|| StubError::invalid(&pointer, "link has no href"))?
        .to_string();

    let rel = entry.get("rel").and_then(Value::as_str).map(String::from);
    let explicit_target = entry.get("targetSchema");

    let (target_schema, schema_pointer) = match (explicit_target, rel.as_deref()) {
        (Some(target), _) => (Some(target.clone()), format!("{}/targetSchema", pointer)),
        (None, Some(rel)) if LEGACY_RELS.contains(&rel) => {
            (Some(parent.clone()), parent_pointer.to_string())
        }
        _ => (None, pointer.clone()),
    };

    let status_success = if rel.as_deref() == Some("create") {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    let list = explicit_target.is_none() && rel.as_deref() == Some("instances");

    Ok(Some(Link {
        method,
        href,
        rel,
        status_success,
        target_schema,
        schema_pointer,
        example: None,
        list,
        pointer,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn document() -> Value {
        json!({
            "definitions": {
                "app": {
                    "properties": {"name": {"type": ["string"]}},
                    "links": [
                        {"href": "/apps", "method": "POST", "rel": "create"},
                        {"href": "/apps", "method": "get", "rel": "instances"},
                        {"href": "/apps/{(%23%2Fdefinitions%2Fapp)}/restart", "method": "POST", "rel": "empty"},
                        {"href": "/apps/{(%23%2Fdefinitions%2Fapp)}/ping", "method": "GET", "rel": "ping",
                         "targetSchema": {"properties": {"ok": {"type": ["boolean"]}}}},
                        {"href": "/docs", "rel": "help"}
                    ]
                }
            },
            "properties": {"app": {"$ref": "#/definitions/app"}}
        })
    }

    #[test]
    fn test_parse_links() {
        let links = parse_links(&document()).unwrap();
        assert_eq!(links.len(), 4);

        let create = &links[0];
        assert_eq!(create.method, Method::POST);
        assert_eq!(create.status_success, StatusCode::CREATED);
        assert_eq!(create.schema_pointer, "#/definitions/app");
        assert!(create.target_schema.is_some());
        assert!(!create.list);

        let list = &links[1];
        assert_eq!(list.method, Method::GET);
        assert_eq!(list.status_success, StatusCode::OK);
        assert!(list.list);
    }

    #[test]
    fn test_non_legacy_rel_without_target_schema() {
        let links = parse_links(&document()).unwrap();
        let restart = &links[2];
        assert_eq!(restart.rel.as_deref(), Some("empty"));
        assert!(restart.target_schema.is_none());
    }

    #[test]
    fn test_explicit_target_schema() {
        let links = parse_links(&document()).unwrap();
        let ping = &links[3];
        assert_eq!(ping.schema_pointer, "#/definitions/app/links/3/targetSchema");
        assert_eq!(
            ping.target_schema.as_ref().unwrap()["properties"]["ok"]["type"],
            json!(["boolean"])
        );
        assert!(!ping.list);
    }

    #[test]
    fn test_definitions_fallback() {
        let mut doc = document();
        doc.as_object_mut().unwrap().remove("properties");
        let links = parse_links(&doc).unwrap();
        assert_eq!(links.len(), 4);
        assert_eq!(links[0].pointer, "#/definitions/app/links/0");
    }

    #[test]
    fn test_links_must_be_array() {
        let doc = json!({"properties": {"app": {"links": {"href": "/apps"}}}});
        assert!(matches!(
            parse_links(&doc),
            Err(StubError::InvalidSchema { .. })
        ));
    }

    #[test]
    fn test_missing_href() {
        let doc = json!({"properties": {"app": {"links": [{"method": "GET"}]}}});
        assert!(matches!(
            parse_links(&doc),
            Err(StubError::InvalidSchema { .. })
        ));
    }
}
