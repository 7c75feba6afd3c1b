//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Health check
//!
//! # Install flow (merchant browser)
//! GET  /oauth/redirect         - Redirect to Cashier's authorize page
//! GET  /oauth/authorize        - Exchange code, return to marketplace
//!
//! # Called by Cashier (signed)
//! POST /cashier/event          - Checkout event -> actions
//! POST /shipping               - Shipping rate override
//! GET  /settings               - Settings form schema
//! POST /settings               - Receive settings
//! POST /oauth/uninstalled      - Uninstall notice
//!
//! # Webhooks
//! POST /orderWebhook           - Order created acknowledgement
//! ```

pub mod events;
pub mod oauth;
pub mod settings;
pub mod shipping;
pub mod webhooks;

use axum::{
    Router,
    extract::rejection::JsonRejection,
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post},
};
use cashier_bopis_core::{Platform, ProviderContext, ShopDomain};
use serde::Deserialize;
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;

use crate::error::AppError;
use crate::middleware::{request_id_middleware, verify_signature};
use crate::state::AppState;

/// Build the plugin router with all routes and middleware.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/cashier/event", post(events::handle_event))
        .route("/shipping", post(shipping::resolve_shipping))
        .route(
            "/settings",
            get(settings::show_settings).post(settings::receive_settings),
        )
        .route("/oauth/uninstalled", post(oauth::uninstalled))
        .route_layer(from_fn_with_state(state.clone(), verify_signature))
        .route("/oauth/redirect", get(oauth::redirect))
        .route("/oauth/authorize", get(oauth::authorize))
        .route("/orderWebhook", post(webhooks::order_webhook))
        .route("/health", get(health))
        .layer(from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = tracing::field::Empty,
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record(
                            "latency_ms",
                            u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                        );
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .with_state(state)
}

/// Liveness health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// `platform` and `shop` query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct RoutingQuery {
    pub platform: Option<String>,
    pub shop: Option<String>,
}

impl RoutingQuery {
    /// Validate into a provider context.
    ///
    /// # Errors
    ///
    /// Returns `AppError::BadRequest` if either parameter is missing, blank or
    /// not a single path segment.
    pub fn into_context(self) -> Result<ProviderContext, AppError> {
        let (Some(platform), Some(shop)) = (self.platform, self.shop) else {
            return Err(AppError::BadRequest(
                "\"platform\" and \"shop\" are required".to_string(),
            ));
        };

        let platform = Platform::try_new(platform).map_err(|e| AppError::BadRequest(e.to_string()))?;
        let shop = ShopDomain::try_new(shop).map_err(|e| AppError::BadRequest(e.to_string()))?;

        Ok(ProviderContext::new(platform, shop))
    }
}

/// Map a JSON body rejection to a 400.
pub(crate) fn bad_json(rejection: &JsonRejection) -> AppError {
    AppError::BadRequest(rejection.body_text())
}
