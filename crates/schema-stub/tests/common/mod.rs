//! Shared helpers for the stub middleware integration tests.

#![allow(dead_code)]

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::response::Response;
use schema_stub::{ReplaceStub, StubLayer, StubbedResponse, SuppressStub};
use serde_json::{json, Value};
use std::convert::Infallible;
use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tower::{service_fn, Layer, ServiceExt};

pub const HYPER_SCHEMA: &str = include_str!("../fixtures/schema.json");
pub const OPENAPI_2: &str = include_str!("../fixtures/petstore-openapi2.json");
pub const OPENAPI_3: &str = include_str!("../fixtures/users-openapi3.json");

/// Header the downstream uses to echo the stub it received
pub const ECHO_HEADER: &str = "x-stub-response";

pub fn document(text: &str) -> Value {
    serde_json::from_str(text).unwrap()
}

/// The app resource as generated from the hyper-schema fixture
pub fn valid_app() -> Value {
    json!({
        "buildpack_provided_description": "",
        "created_at": "2012-01-01T12:00:00Z",
        "id": "01234567-89ab-cdef-0123-456789abcdef",
        "maintenance": false,
        "name": "example",
        "region": {
            "id": "01234567-89ab-cdef-0123-456789abcdef",
            "name": "us"
        },
        "web_url": "https://example.herokuapp.com/"
    })
}

/// Downstream application: echoes the stub in a header and answers
/// `429` with an empty body
#[derive(Clone, Default)]
pub struct Downstream {
    pub replace: Option<Value>,
    pub suppress: bool,
    pub calls: Arc<AtomicUsize>,
}

impl Downstream {
    pub fn replacing(value: Value) -> Self {
        Self {
            replace: Some(value),
            ..Self::default()
        }
    }

    pub fn suppressing() -> Self {
        Self {
            suppress: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn respond(&self, req: Request<Body>) -> Response {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let stub = req
            .extensions()
            .get::<StubbedResponse>()
            .and_then(|stub| stub.data.clone());
        let echoed = serde_json::to_string(&stub).unwrap();

        let mut response = Response::builder()
            .status(StatusCode::TOO_MANY_REQUESTS)
            .header(ECHO_HEADER, echoed)
            .header(header::CONTENT_LENGTH, "0")
            .body(Body::empty())
            .unwrap();

        if let Some(replacement) = &self.replace {
            response
                .extensions_mut()
                .insert(ReplaceStub(replacement.clone()));
        }
        if self.suppress {
            response.extensions_mut().insert(SuppressStub);
        }
        response
    }
}

/// Send one request through `layer` wrapped around `downstream`
pub async fn send(layer: &StubLayer, downstream: &Downstream, method: Method, uri: &str) -> Response {
    let downstream = downstream.clone();
    let service = layer.layer(service_fn(move |req: Request<Body>| {
        let downstream = downstream.clone();
        async move { Ok::<_, Infallible>(downstream.respond(req)) }
    }));

    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    service.oneshot(request).await.unwrap()
}

pub async fn body_bytes(response: Response) -> Vec<u8> {
    to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

pub async fn body_json(response: Response) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

pub fn echoed_stub(response: &Response) -> Value {
    let header = response.headers()[ECHO_HEADER].to_str().unwrap();
    serde_json::from_str(header).unwrap()
}

pub fn sorted_keys(value: &Value) -> Vec<String> {
    let mut keys: Vec<String> = value.as_object().unwrap().keys().cloned().collect();
    keys.sort();
    keys
}

/// Log sink for asserting on emitted warnings
#[derive(Clone, Default)]
pub struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    pub fn contents(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }
}

impl io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Run `f` with a subscriber writing to the returned log sink
pub fn with_captured_logs<T>(f: impl FnOnce() -> T) -> (T, CapturedLogs) {
    let logs = CapturedLogs::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::WARN)
        .finish();

    let result = tracing::subscriber::with_default(subscriber, f);
    (result, logs)
}
