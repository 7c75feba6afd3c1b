//! Unified error handling with Sentry integration.
//!
//! Route handlers return `Result<T, AppError>`. Server-side failures are
//! captured to Sentry before the response is written; client errors are not.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use cashier_bopis_core::InvalidCartError;
use thiserror::Error;

use crate::providers::{ProviderError, UpstreamProviderError};

/// Application-level error type for the plugin.
#[derive(Debug, Error)]
pub enum AppError {
    /// Cart payload failed validation.
    #[error("Invalid cart: {0}")]
    InvalidCart(#[from] InvalidCartError),

    /// A rate or location lookup failed.
    #[error("Upstream error: {0}")]
    Upstream(#[from] UpstreamProviderError),

    /// OAuth token exchange failed.
    #[error("OAuth error: {0}")]
    OAuth(ProviderError),

    /// Request signature was missing or did not verify.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl AppError {
    const fn status(&self) -> StatusCode {
        match self {
            Self::InvalidCart(_) | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Upstream(_) => StatusCode::BAD_GATEWAY,
            Self::OAuth(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        } else {
            tracing::warn!(error = %self, "Rejected request");
        }

        // Don't expose upstream or internal details to clients
        let message = match &self {
            Self::Upstream(_) => "External service error".to_string(),
            Self::OAuth(_) => "Internal server error".to_string(),
            _ => self.to_string(),
        };

        (status, message).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;
