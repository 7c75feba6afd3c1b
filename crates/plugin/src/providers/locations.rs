//! Pickup location lookup client.
//!
//! Queries a Socrata-style geo dataset for every location within a radius of
//! a fixed origin. The default endpoint is NASA's open meteorite landings
//! dataset, a stand-in until a real store locator is wired up.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use cashier_bopis_core::PickupLocation;
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, instrument};
use url::Url;

use super::{LocationProvider, ProviderError, read_json};
use crate::config::PickupConfig;

/// Header carrying the Socrata app token.
const APP_TOKEN_HEADER: &str = "X-App-Token";

/// Circle to search for pickup locations.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PickupArea {
    pub latitude: f64,
    pub longitude: f64,
    pub radius_meters: u32,
}

impl PickupArea {
    /// Socrata `$where` clause selecting locations inside the circle.
    #[must_use]
    pub fn where_clause(&self) -> String {
        format!(
            "within_circle(GeoLocation,{},{}, {})",
            self.latitude, self.longitude, self.radius_meters
        )
    }
}

impl From<&PickupConfig> for PickupArea {
    fn from(config: &PickupConfig) -> Self {
        Self {
            latitude: config.origin_latitude,
            longitude: config.origin_longitude,
            radius_meters: config.radius_meters,
        }
    }
}

/// Client for the pickup location provider.
#[derive(Clone)]
pub struct LocationClient {
    inner: Arc<LocationClientInner>,
}

struct LocationClientInner {
    client: reqwest::Client,
    endpoint: Url,
    app_token: Option<SecretString>,
}

impl std::fmt::Debug for LocationClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocationClient")
            .field("endpoint", &self.inner.endpoint.as_str())
            .field("app_token", &self.inner.app_token.as_ref().map(|_| "[REDACTED]"))
            .finish_non_exhaustive()
    }
}

impl LocationClient {
    /// Create a new location client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &PickupConfig, timeout: Duration) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            inner: Arc::new(LocationClientInner {
                client,
                endpoint: config.location_provider_url.clone(),
                app_token: config.location_access_token.clone(),
            }),
        })
    }

    /// Full query URL for `area`.
    #[must_use]
    pub fn query_url(&self, area: &PickupArea) -> Url {
        let mut url = self.inner.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("$where", &area.where_clause());
        url
    }
}

#[async_trait]
impl LocationProvider for LocationClient {
    #[instrument(skip(self), fields(radius_meters = area.radius_meters))]
    async fn locations_within(
        &self,
        area: &PickupArea,
    ) -> Result<Vec<PickupLocation>, ProviderError> {
        let mut request = self.inner.client.get(self.query_url(area));
        if let Some(token) = &self.inner.app_token {
            request = request.header(APP_TOKEN_HEADER, token.expose_secret());
        }

        let response = request.send().await?;
        let locations: Vec<PickupLocation> = read_json(response).await?;
        debug!(count = locations.len(), "Fetched pickup locations");

        Ok(locations)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use cashier_bopis_core::PickupAddress;

    use super::*;

    fn config() -> PickupConfig {
        PickupConfig {
            marker: "pick up".to_string(),
            origin_latitude: 30.268_466,
            origin_longitude: -97.742_811,
            radius_meters: 100_000,
            location_provider_url: Url::parse("https://data.nasa.gov/resource/gh4g-9sfh.json")
                .unwrap(),
            location_access_token: None,
            default_address: PickupAddress::default(),
        }
    }

    #[test]
    fn test_where_clause() {
        let area = PickupArea::from(&config());
        assert_eq!(
            area.where_clause(),
            "within_circle(GeoLocation,30.268466,-97.742811, 100000)"
        );
    }

    #[test]
    fn test_query_url_round_trips_where_clause() {
        let client = LocationClient::new(&config(), Duration::from_secs(1)).unwrap();
        let area = PickupArea::from(&config());
        let url = client.query_url(&area);

        assert_eq!(url.path(), "/resource/gh4g-9sfh.json");
        let (key, value) = url.query_pairs().next().unwrap();
        assert_eq!(key, "$where");
        assert_eq!(value, area.where_clause());
    }
}
