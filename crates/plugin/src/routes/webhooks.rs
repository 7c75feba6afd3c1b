//! Order webhook endpoint.

use axum::{Json, body::Bytes};
use serde::Serialize;
use tracing::{info, instrument};

#[derive(Debug, Serialize)]
pub struct WebhookAck {
    pub success: bool,
}

/// Acknowledge an order-created webhook.
#[instrument(skip_all, fields(bytes = body.len()))]
pub async fn order_webhook(body: Bytes) -> Json<WebhookAck> {
    info!("Received order webhook");
    Json(WebhookAck { success: true })
}
