//! Stub middleware.
//!
//! Requests matching a schema link are answered with the link's stub data.
//! With call-through enabled the downstream service still runs: it sees the
//! stub as a [`StubbedResponse`] request extension and may answer with
//! [`ReplaceStub`] or [`SuppressStub`] response extensions.

use crate::domain::config::StubConfig;
use crate::domain::error::{ApiError, StubError};
use crate::router::Router;
use crate::schema::{Schema, SchemaSource};
use axum::{
    body::Body,
    http::{
        header::{self, HeaderName},
        HeaderMap, HeaderValue, Request, StatusCode,
    },
    response::{IntoResponse, Response},
};
use serde_json::Value;
use std::sync::Arc;
use std::task::{Context, Poll};
use tower::{Layer, Service};
use tracing::{debug, error, info};

/// Stub data handed to the downstream service in call-through mode
#[derive(Debug, Clone, PartialEq)]
pub struct StubbedResponse {
    /// Status the stub will be sent with
    pub status: StatusCode,
    /// Stub body (`None` for an empty body)
    pub data: Option<Value>,
    /// Schema the body was generated from
    pub schema: Option<Value>,
}

/// Response extension: send this value instead of the generated stub
#[derive(Debug, Clone, PartialEq)]
pub struct ReplaceStub(pub Value);

/// Response extension: send the downstream response as-is
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SuppressStub;

struct StubState {
    schema: Arc<Schema>,
    router: Router,
    call: bool,
}

/// Stub layer
#[derive(Clone)]
pub struct StubLayer {
    state: Arc<StubState>,
}

impl StubLayer {
    /// Create the layer from a schema source
    pub fn new(source: impl Into<SchemaSource>, config: StubConfig) -> Result<Self, StubError> {
        config.validate()?;

        let schema = source.into().load(config.driver)?;
        let router = Router::new(&schema, config.prefix.clone())?;

        info!(
            driver = %schema.driver(),
            routes = router.len(),
            prefix = ?config.prefix,
            call = config.call,
            "Stub layer ready"
        );

        Ok(Self {
            state: Arc::new(StubState {
                schema,
                router,
                call: config.call,
            }),
        })
    }

    /// Create the layer from `config.schema_path`
    pub fn from_config(config: StubConfig) -> Result<Self, StubError> {
        let path = config.schema_path.clone().ok_or(StubError::MissingSchema)?;
        Self::new(SchemaSource::Path(path), config)
    }

    /// Schema served by this layer
    pub fn schema(&self) -> &Schema {
        &self.state.schema
    }

    /// Route table
    pub fn router(&self) -> &Router {
        &self.state.router
    }
}

impl<S> Layer<S> for StubLayer {
    type Service = StubService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        StubService {
            inner,
            state: Arc::clone(&self.state),
        }
    }
}

/// Stub service
#[derive(Clone)]
pub struct StubService<S> {
    inner: S,
    state: Arc<StubState>,
}

impl<S> Service<Request<Body>> for StubService<S>
where
    S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
    S::Future: Send,
{
    type Response = Response;
    type Error = S::Error;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<Body>) -> Self::Future {
        let state = Arc::clone(&self.state);
        // Keep the instance that was driven to readiness
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);

        Box::pin(async move {
            let path = req.uri().path();
            if !state.router.includes(path) {
                return inner.call(req).await;
            }
            let Some(route) = state.router.find_route(req.method(), path) else {
                debug!(method = %req.method(), path = %path, "No schema link; passing through");
                return inner.call(req).await;
            };

            let link = route.link();
            let stub = match route.stub(&state.schema) {
                Ok(stub) => stub,
                Err(e) => {
                    error!(method = %link.method, href = %link.href, error = %e, "Failed to generate stub");
                    return Ok(ApiError::from(e).into_response());
                }
            };
            debug!(method = %link.method, href = %link.href, call = state.call, "Stubbing request");

            let status = link.status_success;
            let mut headers = HeaderMap::new();
            headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));

            if !state.call {
                return Ok(render(status, headers, stub.data.as_ref()));
            }

            req.extensions_mut().insert(StubbedResponse {
                status,
                data: stub.data.clone(),
                schema: stub.schema.clone(),
            });
            let response = inner.call(req).await?;

            if response.extensions().get::<SuppressStub>().is_some() {
                debug!(status = %response.status(), "Stub suppressed; returning downstream response");
                return Ok(response);
            }

            let (parts, _body) = response.into_parts();
            merge_headers(&mut headers, parts.headers);

            let data = match parts.extensions.get::<ReplaceStub>() {
                Some(ReplaceStub(replacement)) => Some(replacement),
                None => stub.data.as_ref(),
            };
            Ok(render(status, headers, data))
        })
    }
}

/// Merge downstream headers over the stub's; framing and encoding headers
/// are dropped since the body is rewritten
fn merge_headers(base: &mut HeaderMap, overrides: HeaderMap) {
    let mut current: Option<HeaderName> = None;
    for (name, value) in overrides {
        if let Some(name) = name {
            base.remove(&name);
            current = Some(name);
        }
        let Some(name) = current.as_ref() else {
            continue;
        };
        if describes_body(name) {
            continue;
        }
        base.append(name.clone(), value);
    }
}

/// Headers describing a downstream body the stub replaces
fn describes_body(name: &HeaderName) -> bool {
    name == header::CONTENT_LENGTH
        || name == header::TRANSFER_ENCODING
        || name == header::CONTENT_ENCODING
}

/// Pretty-printed JSON body; `None` renders an empty body
fn render(status: StatusCode, headers: HeaderMap, data: Option<&Value>) -> Response {
    let body = match data {
        Some(value) => match serde_json::to_vec_pretty(value) {
            Ok(bytes) => Body::from(bytes),
            Err(e) => return ApiError::internal(format!("failed to encode stub: {}", e)).into_response(),
        },
        None => Body::empty(),
    };

    let mut response = Response::new(body);
    *response.status_mut() = status;
    *response.headers_mut() = headers;
    response
}
