//! Upstream providers the plugin calls out to.
//!
//! # Providers
//!
//! - [`CashierClient`] - Cashier API: OAuth token exchange and the shipping
//!   lines (rate) endpoint
//! - [`LocationClient`] - Geo lookup returning candidate pickup locations
//!
//! The rate aggregator only depends on the [`RateProvider`] and
//! [`LocationProvider`] traits, so tests can substitute in-memory providers.

pub mod cashier;
pub mod locations;

pub use cashier::{AccessToken, CashierClient, ShippingLinesRequest};
pub use locations::{LocationClient, PickupArea};

use async_trait::async_trait;
use cashier_bopis_core::{OrderClassification, PickupLocation, ProviderContext, ShippingLine};
use serde::de::DeserializeOwned;
use thiserror::Error;

/// Errors from a single upstream HTTP call.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// HTTP request failed (connection, TLS, timeout).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Upstream answered with a non-success status.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Response body did not have the expected shape.
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

impl ProviderError {
    /// Whether the call gave up waiting for the upstream.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Http(e) if e.is_timeout())
    }
}

/// A rate lookup failed; no rates are returned.
#[derive(Debug, Error)]
#[error("{branch} rate lookup failed: {source}")]
pub struct UpstreamProviderError {
    /// Which branch of the aggregator was running.
    pub branch: OrderClassification,
    pub source: ProviderError,
}

impl UpstreamProviderError {
    #[must_use]
    pub const fn new(branch: OrderClassification, source: ProviderError) -> Self {
        Self { branch, source }
    }
}

/// Source of paid shipping lines for standard orders.
#[async_trait]
pub trait RateProvider: Send + Sync {
    /// Fetch shipping lines for an order, in provider order.
    async fn shipping_lines(
        &self,
        context: &ProviderContext,
        request: &ShippingLinesRequest,
    ) -> Result<Vec<ShippingLine>, ProviderError>;
}

/// Source of pickup locations for BOPIS orders.
#[async_trait]
pub trait LocationProvider: Send + Sync {
    /// Fetch the locations inside `area`, in provider order.
    async fn locations_within(
        &self,
        area: &PickupArea,
    ) -> Result<Vec<PickupLocation>, ProviderError>;
}

/// Decode a JSON response body, mapping non-success statuses to [`ProviderError::Api`].
async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ProviderError> {
    let status = response.status();
    if !status.is_success() {
        let message = response.text().await.unwrap_or_default();
        return Err(ProviderError::Api {
            status: status.as_u16(),
            message,
        });
    }

    let body = response.bytes().await?;
    Ok(serde_json::from_slice(&body)?)
}
