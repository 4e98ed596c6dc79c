//! Route table: (method, path) → schema link.
//!
//! Link hrefs are compiled into anchored patterns where each `{...}` template
//! segment matches `[^/]+`. Routes of a method are tried in document order.

use crate::domain::error::StubError;
use crate::domain::types::{Link, StubData};
use crate::generator::ResponseGenerator;
use crate::schema::Schema;
use axum::http::Method;
use regex::Regex;
use std::collections::HashMap;
use std::sync::OnceLock;

/// A link with its compiled pattern and cached stub
#[derive(Debug)]
pub struct Route {
    pattern: Regex,
    link: Link,
    stub: OnceLock<Result<StubData, StubError>>,
}

impl Route {
    fn new(link: Link) -> Result<Self, StubError> {
        Ok(Self {
            pattern: compile_pattern(&link.href)?,
            link,
            stub: OnceLock::new(),
        })
    }

    /// Link this route was built from
    pub fn link(&self) -> &Link {
        &self.link
    }

    /// Whether `path` (prefix already stripped) matches this route
    pub fn matches(&self, path: &str) -> bool {
        self.pattern.is_match(path)
    }

    /// Stub data, generated on first use and cached afterwards
    pub fn stub(&self, schema: &Schema) -> &Result<StubData, StubError> {
        self.stub
            .get_or_init(|| ResponseGenerator::new(schema).generate(&self.link))
    }
}

/// Route table built from a schema's links
#[derive(Debug)]
pub struct Router {
    prefix: Option<String>,
    routes: HashMap<Method, Vec<Route>>,
    len: usize,
}

impl Router {
    /// Build the table for every link of `schema`
    pub fn new(schema: &Schema, prefix: Option<String>) -> Result<Self, StubError> {
        let mut routes: HashMap<Method, Vec<Route>> = HashMap::new();
        for link in schema.links() {
            routes
                .entry(link.method.clone())
                .or_default()
                .push(Route::new(link.clone())?);
        }

        Ok(Self {
            prefix: prefix.and_then(normalize_prefix),
            routes,
            len: schema.links().len(),
        })
    }

    /// Configured prefix
    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    /// Number of routes
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the table has no routes
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Whether `path` is inside the configured prefix
    pub fn includes(&self, path: &str) -> bool {
        match &self.prefix {
            Some(prefix) => path.starts_with(prefix.as_str()),
            None => true,
        }
    }

    /// First route of `method` matching `path`
    pub fn find_route(&self, method: &Method, path: &str) -> Option<&Route> {
        let path = match &self.prefix {
            Some(prefix) => path.strip_prefix(prefix.as_str()).unwrap_or(path),
            None => path,
        };

        self.routes
            .get(method)?
            .iter()
            .find(|route| route.matches(path))
    }

    /// First link of `method` matching `path`
    pub fn find_link(&self, method: &Method, path: &str) -> Option<&Link> {
        self.find_route(method, path).map(Route::link)
    }
}

/// Trailing slashes are dropped so stripping leaves a rooted path;
/// `/` alone is no prefix at all
fn normalize_prefix(prefix: String) -> Option<String> {
    let trimmed = prefix.trim_end_matches('/');
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// `/apps/{id}/config.json` → `^/apps/[^/]+/config\.json$`
fn compile_pattern(href: &str) -> Result<Regex, StubError> {
    let mut pattern = String::from("^");
    let mut rest = href;

    while let Some(start) = rest.find('{') {
        let Some(length) = rest[start..].find('}') else {
            break;
        };
        pattern.push_str(&regex::escape(&rest[..start]));
        pattern.push_str("[^/]+");
        rest = &rest[start + length + 1..];
    }
    pattern.push_str(&regex::escape(rest));
    pattern.push('$');

    Regex::new(&pattern).map_err(|source| StubError::Pattern {
        href: href.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn schema() -> Schema {
        Schema::from_value(
            json!({
                "swagger": "2.0",
                "paths": {
                    "/apps": {"get": {}, "post": {}},
                    "/apps/{id}": {"get": {}, "delete": {}},
                    "/apps/{id}/config.json": {"get": {}},
                    "/apps/{app}-{env}": {"put": {}}
                }
            }),
            None,
        )
        .unwrap()
    }

    #[test]
    fn test_compile_pattern() {
        let pattern = compile_pattern("/apps/{id}/config.json").unwrap();
        assert_eq!(pattern.as_str(), r"^/apps/[^/]+/config\.json$");
        assert!(pattern.is_match("/apps/heroku-api/config.json"));
        assert!(!pattern.is_match("/apps/heroku-api/configxjson"));
        assert!(!pattern.is_match("/apps/a/b/config.json"));
    }

    #[test]
    fn test_hyper_schema_href_template() {
        let pattern =
            compile_pattern("/apps/{(%23%2Fdefinitions%2Fapp%2Fdefinitions%2Fidentity)}").unwrap();
        assert!(pattern.is_match("/apps/heroku-api"));
        assert!(!pattern.is_match("/apps/"));
    }

    #[test]
    fn test_unclosed_template_is_literal() {
        let pattern = compile_pattern("/apps/{id").unwrap();
        assert!(pattern.is_match("/apps/{id"));
        assert!(!pattern.is_match("/apps/1"));
    }

    #[test]
    fn test_find_link_by_method() {
        let router = Router::new(&schema(), None).unwrap();
        assert_eq!(router.len(), 6);

        let link = router.find_link(&Method::GET, "/apps").unwrap();
        assert_eq!(link.href, "/apps");
        let link = router.find_link(&Method::DELETE, "/apps/42").unwrap();
        assert_eq!(link.href, "/apps/{id}");
        let link = router.find_link(&Method::PUT, "/apps/web-prod").unwrap();
        assert_eq!(link.href, "/apps/{app}-{env}");

        assert!(router.find_link(&Method::PATCH, "/apps/42").is_none());
        assert!(router.find_link(&Method::GET, "/apps/42/other").is_none());
    }

    #[test]
    fn test_prefix() {
        let router = Router::new(&schema(), Some("/v1".into())).unwrap();
        assert!(router.includes("/v1/apps"));
        assert!(!router.includes("/apps"));
        assert_eq!(
            router.find_link(&Method::GET, "/v1/apps/1").unwrap().href,
            "/apps/{id}"
        );
        // Prefix is stripped once, from the start only
        assert!(router.find_link(&Method::GET, "/v1/v1/apps").is_none());
    }

    #[test]
    fn test_trailing_slash_prefix_is_trimmed() {
        let router = Router::new(&schema(), Some("/v1/".into())).unwrap();
        assert_eq!(router.prefix(), Some("/v1"));
        assert_eq!(
            router.find_link(&Method::GET, "/v1/apps/1").unwrap().href,
            "/apps/{id}"
        );

        let router = Router::new(&schema(), Some("/".into())).unwrap();
        assert!(router.prefix().is_none());
        assert!(router.includes("/apps"));
        assert_eq!(router.find_link(&Method::GET, "/apps").unwrap().href, "/apps");
    }

    #[test]
    fn test_no_prefix_includes_everything() {
        let router = Router::new(&schema(), None).unwrap();
        assert!(router.includes("/anything"));
        assert!(router.prefix().is_none());
    }

    proptest! {
        #[test]
        fn prop_template_matches_any_segment(segment in "[A-Za-z0-9._~-]{1,24}") {
            let router = Router::new(&schema(), None).unwrap();
            let path = format!("/apps/{}", segment);
            let link = router.find_link(&Method::GET, &path);
            prop_assert_eq!(link.map(|l| l.href.as_str()), Some("/apps/{id}"));
        }

        #[test]
        fn prop_prefixed_and_bare_paths_agree(segment in "[a-z0-9-]{1,16}") {
            let bare = Router::new(&schema(), None).unwrap();
            let prefixed = Router::new(&schema(), Some("/v1".into())).unwrap();
            let path = format!("/apps/{}", segment);
            let prefixed_path = format!("/v1{}", path);
            prop_assert_eq!(
                bare.find_link(&Method::DELETE, &path).map(|l| l.href.clone()),
                prefixed.find_link(&Method::DELETE, &prefixed_path).map(|l| l.href.clone())
            );
        }
    }
}
