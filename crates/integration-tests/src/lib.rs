//! Test harness for the Cashier BOPIS plugin.
//!
//! Tests drive the real router in-process with `tower::ServiceExt::oneshot`.
//! Cashier and the location provider are replaced by small axum servers bound
//! to an ephemeral local port, so the plugin's real `reqwest` clients are
//! exercised end to end.
//!
//! ```rust,ignore
//! let cashier = FakeUpstream::spawn(Router::new().route(..)).await;
//! let app = TestApp::new(&cashier.url(""), UNREACHABLE);
//! let response = app.send(signed(Request::post("/shipping?..")).body(..)).await;
//! ```

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::{
    Router,
    body::{Body, Bytes},
    http::{HeaderMap, Request, Response, StatusCode, Uri, header, request::Builder},
    routing::{MethodRouter, any},
};
use cashier_bopis_plugin::{config::PluginConfig, routes, state::AppState};
use chrono::Utc;
use hmac::{Hmac, Mac};
use serde_json::Value;
use sha2::Sha256;
use tokio::task::JoinHandle;
use tower::ServiceExt;

pub const CASHIER_DOMAIN: &str = "cashier.test";
pub const CLIENT_ID: &str = "plugin-client-id";
pub const CLIENT_SECRET: &str = "k3Jd9QmZ2vLp8RtY5wNc";
pub const ACCESS_TOKEN: &str = "Tn4Gh7Ws1Xe6Bq0Uy3Mf";
pub const APP_URL: &str = "https://plugin.example.test";

/// An address nothing listens on.
pub const UNREACHABLE: &str = "http://127.0.0.1:9";

/// Query string selecting the test shop.
pub const SHOP_QUERY: &str = "platform=shopify&shop=example.myshopify.com";

/// Build plugin configuration pointing at the given upstreams.
pub fn test_config(cashier_base_url: &str, location_url: &str) -> PluginConfig {
    let vars: HashMap<&str, String> = HashMap::from([
        ("CASHIER_DOMAIN", CASHIER_DOMAIN.to_string()),
        ("CASHIER_API_BASE_URL", cashier_base_url.to_string()),
        ("CASHIER_CLIENT_ID", CLIENT_ID.to_string()),
        ("CASHIER_CLIENT_SECRET", CLIENT_SECRET.to_string()),
        ("CASHIER_ACCESS_TOKEN", ACCESS_TOKEN.to_string()),
        ("APP_URL", APP_URL.to_string()),
        ("LOCATION_PROVIDER_URL", location_url.to_string()),
        ("UPSTREAM_TIMEOUT_SECS", "5".to_string()),
    ]);

    PluginConfig::from_vars(&|key| vars.get(key).cloned()).unwrap()
}

/// The plugin router under test.
pub struct TestApp {
    router: Router,
}

impl TestApp {
    pub fn new(cashier_base_url: &str, location_url: &str) -> Self {
        Self::with_config(test_config(cashier_base_url, location_url))
    }

    pub fn with_config(config: PluginConfig) -> Self {
        let state = AppState::new(config).unwrap();
        Self {
            router: routes::router(state),
        }
    }

    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(request).await.unwrap()
    }
}

/// Hex HMAC-SHA256 of `timestamp` under `secret`.
pub fn signature(secret: &str, timestamp: &str) -> String {
    let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes()).unwrap();
    mac.update(timestamp.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// Add valid Cashier signature headers to a request.
pub fn signed(builder: Builder) -> Builder {
    let timestamp = Utc::now().to_rfc3339();
    let signature = signature(CLIENT_SECRET, &timestamp);
    builder
        .header("X-HMAC-Timestamp", timestamp)
        .header("X-HMAC", signature)
}

/// Build a signed JSON POST.
pub fn signed_json(uri: &str, body: &Value) -> Request<Body> {
    signed(Request::post(uri))
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

pub async fn body_json(response: Response<Body>) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

pub async fn body_text(response: Response<Body>) -> String {
    String::from_utf8(body_bytes(response).await).unwrap()
}

/// A request received by a fake upstream.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub uri: Uri,
    pub headers: HeaderMap,
    pub body: Value,
}

/// Shared log of requests received by a fake upstream.
#[derive(Debug, Clone, Default)]
pub struct Recorder(Arc<Mutex<Vec<Recorded>>>);

impl Recorder {
    pub fn record(&self, uri: Uri, headers: HeaderMap, body: &[u8]) {
        let body = serde_json::from_slice(body).unwrap_or(Value::Null);
        self.0.lock().unwrap().push(Recorded { uri, headers, body });
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.0.lock().unwrap().clone()
    }
}

/// Handler that records every request and answers with `status` and the raw
/// JSON `body`.
///
/// The body is sent verbatim so tests control key order in JSON objects.
pub fn respond_with(recorder: &Recorder, status: StatusCode, body: &'static str) -> MethodRouter {
    let recorder = recorder.clone();
    any(move |uri: Uri, headers: HeaderMap, payload: Bytes| {
        let recorder = recorder.clone();
        async move {
            recorder.record(uri, headers, &payload);
            (status, [(header::CONTENT_TYPE, "application/json")], body)
        }
    })
}

/// An axum server standing in for an upstream service.
pub struct FakeUpstream {
    addr: SocketAddr,
    handle: JoinHandle<()>,
}

impl FakeUpstream {
    pub async fn spawn(router: Router) -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        Self { addr, handle }
    }

    /// Absolute URL for `path` on this server.
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }
}

impl Drop for FakeUpstream {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
