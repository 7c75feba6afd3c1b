//! Cashier API client.
//!
//! Covers the two server-to-server calls the plugin makes against Cashier:
//!
//! 1. OAuth: exchange the authorization code from the install callback for an
//!    access token
//! 2. Shipping lines: ask checkout which rates apply to a cart and destination
//!
//! It also builds the browser-facing install and marketplace URLs.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use cashier_bopis_core::{
    DestinationAddress, NormalizedLineItem, ProviderContext, ShippingLine, ShippingLinesResponse,
};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use super::{ProviderError, RateProvider, read_json};
use crate::config::CashierConfig;

/// Header carrying the checkout access token.
const ACCESS_TOKEN_HEADER: &str = "X-Bold-Checkout-Access-Token";

/// Scopes requested at install time.
pub const OAUTH_SCOPES: &[&str] = &[
    "provide_shipping_rates",
    "read_shipping_lines",
    "modify_shipping",
    "read_orders",
    "modify_shipping_address",
    "read_shop_settings",
];

// ─────────────────────────────────────────────────────────────────────────────
// Request / Response Types
// ─────────────────────────────────────────────────────────────────────────────

/// Body of the shipping lines request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShippingLinesRequest {
    pub order: ShippingLinesOrder,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShippingLinesOrder {
    pub customer: ShippingLinesCustomer,
    pub items: Vec<NormalizedLineItem>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShippingLinesCustomer {
    pub shipping_address: ShippingAddressPayload,
}

/// Destination address in the shape Cashier's shipping lines endpoint expects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShippingAddressPayload {
    pub address: String,
    pub city: String,
    pub country_code: String,
    pub province_code: String,
    pub postal_code: String,
}

impl From<&DestinationAddress> for ShippingAddressPayload {
    fn from(address: &DestinationAddress) -> Self {
        Self {
            address: address.address_line.clone(),
            city: address.city.clone(),
            country_code: address.country_code.clone(),
            province_code: address.province_code.clone(),
            postal_code: address.postal_code.clone(),
        }
    }
}

impl ShippingLinesRequest {
    #[must_use]
    pub fn new(destination: &DestinationAddress, items: Vec<NormalizedLineItem>) -> Self {
        Self {
            order: ShippingLinesOrder {
                customer: ShippingLinesCustomer {
                    shipping_address: destination.into(),
                },
                items,
            },
        }
    }
}

#[derive(Serialize)]
struct AccessTokenRequest<'a> {
    client_id: &'a str,
    client_secret: &'a str,
    code: &'a str,
    grant_type: &'static str,
}

#[derive(Deserialize)]
struct AccessTokenResponse {
    access_token: String,
}

/// Access token issued for a shop.
///
/// Implements `Debug` manually to redact the token.
#[derive(Clone)]
pub struct AccessToken(SecretString);

impl AccessToken {
    #[must_use]
    pub const fn secret(&self) -> &SecretString {
        &self.0
    }
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AccessToken([REDACTED])")
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Cashier Client
// ─────────────────────────────────────────────────────────────────────────────

/// Client for the Cashier API.
#[derive(Clone)]
pub struct CashierClient {
    inner: Arc<CashierClientInner>,
}

struct CashierClientInner {
    client: reqwest::Client,
    domain: String,
    api_base_url: String,
    client_id: String,
    client_secret: SecretString,
    access_token: SecretString,
}

impl std::fmt::Debug for CashierClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CashierClient")
            .field("domain", &self.inner.domain)
            .field("api_base_url", &self.inner.api_base_url)
            .field("client_id", &self.inner.client_id)
            .finish_non_exhaustive()
    }
}

impl CashierClient {
    /// Create a new Cashier API client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &CashierConfig, timeout: Duration) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            inner: Arc::new(CashierClientInner {
                client,
                domain: config.domain.clone(),
                api_base_url: config.api_base_url.clone(),
                client_id: config.client_id.clone(),
                client_secret: config.client_secret.clone(),
                access_token: config.access_token.clone(),
            }),
        })
    }

    /// Get the Cashier domain.
    #[must_use]
    pub fn domain(&self) -> &str {
        &self.inner.domain
    }

    fn api_url(&self, context: &ProviderContext, path: &str) -> String {
        format!("{}{}{path}", self.inner.api_base_url, context.api_path())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // OAuth Flow
    // ─────────────────────────────────────────────────────────────────────────

    /// URL the merchant's browser is sent to when installing the plugin.
    #[must_use]
    pub fn authorization_url(&self, context: &ProviderContext) -> String {
        format!(
            "https://{}{}/oauth/authorize?client_id={}&scope={}&response_type=code",
            self.inner.domain,
            context.api_path(),
            urlencoding::encode(&self.inner.client_id),
            urlencoding::encode(&OAUTH_SCOPES.join(" ")),
        )
    }

    /// Cashier admin page the merchant returns to after installing.
    #[must_use]
    pub fn marketplace_url(&self, context: &ProviderContext) -> String {
        format!(
            "https://{}/admin/{}/{}/marketplace",
            self.inner.domain, context.platform, context.shop
        )
    }

    /// Exchange an authorization code for a shop access token.
    ///
    /// # Errors
    ///
    /// Returns an error if the token exchange fails.
    #[instrument(skip(self, code), fields(platform = %context.platform, shop = %context.shop))]
    pub async fn exchange_code(
        &self,
        context: &ProviderContext,
        code: &str,
    ) -> Result<AccessToken, ProviderError> {
        let body = AccessTokenRequest {
            client_id: &self.inner.client_id,
            client_secret: self.inner.client_secret.expose_secret(),
            code,
            grant_type: "authorization_code",
        };

        let response = self
            .inner
            .client
            .post(self.api_url(context, "/oauth/access_token"))
            .json(&body)
            .send()
            .await?;

        let token: AccessTokenResponse = read_json(response).await?;
        debug!("Exchanged authorization code for access token");

        Ok(AccessToken(SecretString::from(token.access_token)))
    }
}

#[async_trait]
impl RateProvider for CashierClient {
    #[instrument(
        skip(self, request),
        fields(platform = %context.platform, shop = %context.shop, items = request.order.items.len())
    )]
    async fn shipping_lines(
        &self,
        context: &ProviderContext,
        request: &ShippingLinesRequest,
    ) -> Result<Vec<ShippingLine>, ProviderError> {
        let response = self
            .inner
            .client
            .post(self.api_url(context, "/shipping_lines"))
            .header(ACCESS_TOKEN_HEADER, self.inner.access_token.expose_secret())
            .json(request)
            .send()
            .await?;

        let body: ShippingLinesResponse = read_json(response).await?;
        debug!(count = body.shipping_lines.len(), "Fetched shipping lines");

        Ok(body.shipping_lines)
    }
}
