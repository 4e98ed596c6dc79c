//! OpenAPI 2.0 and 3.x drivers.
//!
//! Every operation under `paths` becomes a [`Link`]. The stubbed response is
//! the best-fit success response: `200`, then `201`, then the first
//! three-digit status in document order.

use super::reference::{self, escape_token};
use crate::domain::error::StubError;
use crate::domain::types::Link;
use axum::http::{Method, StatusCode};
use serde_json::{Map, Value};

const OPERATION_KEYS: &[&str] = &["get", "put", "post", "delete", "options", "head", "patch", "trace"];

const JSON_MEDIA_TYPE: &str = "application/json";

#[derive(Clone, Copy)]
enum Version {
    V2,
    V3,
}

/// Links of an OpenAPI 2.0 document (`basePath` is prepended to each path)
pub(super) fn parse_v2_links(document: &Value) -> Result<Vec<Link>, StubError> {
    let base_path = document
        .get("basePath")
        .and_then(Value::as_str)
        .unwrap_or("")
        .trim_end_matches('/');
    parse_paths(document, base_path, Version::V2)
}

/// Links of an OpenAPI 3.x document
pub(super) fn parse_v3_links(document: &Value) -> Result<Vec<Link>, StubError> {
    parse_paths(document, "", Version::V3)
}

fn parse_paths(document: &Value, base_path: &str, version: Version) -> Result<Vec<Link>, StubError> {
    let Some(paths) = document.get("paths") else {
        return Ok(Vec::new());
    };
    let paths = paths
        .as_object()
        .ok_or_else(|| StubError::invalid("#/paths", "paths must be an object"))?;

    let mut links = Vec::new();
    for (path, item) in paths {
        let item_pointer = format!("#/paths/{}", escape_token(path));
        let (item, _) = reference::resolve(document, item, &item_pointer)?;
        let item = item
            .as_object()
            .ok_or_else(|| StubError::invalid(&item_pointer, "path item must be an object"))?;

        for (key, operation) in item {
            if !OPERATION_KEYS.contains(&key.as_str()) {
                continue;
            }
            let pointer = format!("{}/{}", item_pointer, key);
            let method = Method::from_bytes(key.to_ascii_uppercase().as_bytes())
                .map_err(|_| StubError::invalid(&pointer, format!("invalid method \"{}\"", key)))?;
            let href = format!("{}{}", base_path, path);

            links.push(parse_operation(document, operation, method, href, pointer, version)?);
        }
    }

    Ok(links)
}

fn parse_operation(
    document: &Value,
    operation: &Value,
    method: Method,
    href: String,
    pointer: String,
    version: Version,
) -> Result<Link, StubError> {
    let mut link = Link {
        method,
        href,
        rel: None,
        status_success: StatusCode::OK,
        target_schema: None,
        schema_pointer: pointer.clone(),
        example: None,
        list: false,
        pointer,
    };

    let Some(responses) = operation.get("responses").and_then(Value::as_object) else {
        return Ok(link);
    };
    let Some((status, code, response)) = best_fit_response(responses) else {
        return Ok(link);
    };
    link.status_success = status;

    let response_pointer = format!("{}/responses/{}", link.pointer, code);
    let (response, response_pointer) = reference::resolve(document, response, &response_pointer)?;

    match version {
        Version::V2 => {
            if let Some(schema) = response.get("schema") {
                link.target_schema = Some(schema.clone());
                link.schema_pointer = format!("{}/schema", response_pointer);
            }
            link.example = response
                .get("examples")
                .and_then(|examples| examples.get(JSON_MEDIA_TYPE))
                .cloned();
        }
        Version::V3 => {
            let Some((media_type, media)) = json_media(response) else {
                return Ok(link);
            };
            let media_pointer = format!(
                "{}/content/{}",
                response_pointer,
                escape_token(media_type)
            );
            if let Some(schema) = media.get("schema") {
                link.target_schema = Some(schema.clone());
                link.schema_pointer = format!("{}/schema", media_pointer);
            }
            link.example = media_example(document, media, &media_pointer)?;
        }
    }

    Ok(link)
}

/// Pick the response to stub: `200`, then `201`, then any three-digit code
fn best_fit_response(responses: &Map<String, Value>) -> Option<(StatusCode, &str, &Value)> {
    for preferred in ["200", "201"] {
        if let Some((code, response)) = responses.get_key_value(preferred) {
            let status = StatusCode::from_bytes(code.as_bytes()).ok()?;
            return Some((status, code.as_str(), response));
        }
    }

    responses.iter().find_map(|(code, response)| {
        if code.len() != 3 || !code.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let status = StatusCode::from_bytes(code.as_bytes()).ok()?;
        Some((status, code.as_str(), response))
    })
}

/// `application/json`, or else the first `+json` style media type
fn json_media(response: &Value) -> Option<(&str, &Value)> {
    let content = response.get("content")?.as_object()?;
    if let Some((media_type, media)) = content.get_key_value(JSON_MEDIA_TYPE) {
        return Some((media_type.as_str(), media));
    }
    content
        .iter()
        .find(|(media_type, _)| media_type.contains("json"))
        .map(|(media_type, media)| (media_type.as_str(), media))
}

fn media_example(
    document: &Value,
    media: &Value,
    media_pointer: &str,
) -> Result<Option<Value>, StubError> {
    if let Some(example) = media.get("example") {
        return Ok(Some(example.clone()));
    }

    let Some((name, example)) = media
        .get("examples")
        .and_then(Value::as_object)
        .and_then(|examples| examples.iter().next())
    else {
        return Ok(None);
    };

    let pointer = format!("{}/examples/{}", media_pointer, escape_token(name));
    let (example, _) = reference::resolve(document, example, &pointer)?;
    Ok(example.get("value").cloned())
}
