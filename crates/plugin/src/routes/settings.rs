//! Settings page handlers.

use axum::{Json, body::Bytes, extract::Query};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, instrument};

use crate::error::{AppError, Result};
use crate::services::settings_schema;

#[derive(Debug, Deserialize)]
pub struct SettingsQuery {
    pub token: Option<String>,
}

impl SettingsQuery {
    fn require_token(self) -> Result<String> {
        self.token
            .filter(|token| !token.is_empty())
            .ok_or_else(|| AppError::BadRequest("\"token\" is required".to_string()))
    }
}

#[derive(Debug, Serialize)]
pub struct SettingsResponse {
    pub token: String,
    pub settings: Value,
}

/// Return the settings form.
#[instrument(skip_all)]
pub async fn show_settings(Query(query): Query<SettingsQuery>) -> Result<Json<SettingsResponse>> {
    let token = query.require_token()?;

    Ok(Json(SettingsResponse {
        token,
        settings: settings_schema(),
    }))
}

/// Accept settings submitted from the Cashier admin.
#[instrument(skip_all, fields(bytes = body.len()))]
pub async fn receive_settings(
    Query(query): Query<SettingsQuery>,
    body: Bytes,
) -> Result<Json<SettingsResponse>> {
    let token = query.require_token()?;

    // Nothing stores settings yet
    info!("Received plugin settings");

    Ok(Json(SettingsResponse {
        token,
        settings: settings_schema(),
    }))
}
