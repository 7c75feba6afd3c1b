//! Application state shared across handlers.

use std::sync::Arc;

use cashier_bopis_core::{EventActionComposer, OrderClassifier};

use crate::config::PluginConfig;
use crate::middleware::SignatureVerifier;
use crate::providers::{CashierClient, LocationClient, PickupArea, ProviderError};
use crate::services::ShippingRateAggregator;

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`. Everything in here is built once at startup
/// and read-only afterwards.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: PluginConfig,
    cashier: CashierClient,
    composer: EventActionComposer,
    aggregator: ShippingRateAggregator,
    signatures: SignatureVerifier,
}

impl AppState {
    /// Build the application state from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if an upstream HTTP client cannot be built.
    pub fn new(config: PluginConfig) -> Result<Self, ProviderError> {
        let cashier = CashierClient::new(&config.cashier, config.upstream_timeout)?;
        let locations = LocationClient::new(&config.pickup, config.upstream_timeout)?;
        let classifier = OrderClassifier::new(config.pickup.marker.clone());

        let composer = EventActionComposer::new(
            classifier.clone(),
            config.shipping_callback_url(),
            config.pickup.default_address.clone(),
        );
        let aggregator = ShippingRateAggregator::new(
            classifier,
            Arc::new(cashier.clone()),
            Arc::new(locations),
            PickupArea::from(&config.pickup),
        );
        let signatures = SignatureVerifier::new(config.cashier.client_secret.clone());

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                cashier,
                composer,
                aggregator,
                signatures,
            }),
        })
    }

    #[must_use]
    pub fn config(&self) -> &PluginConfig {
        &self.inner.config
    }

    /// Get a reference to the Cashier API client.
    #[must_use]
    pub fn cashier(&self) -> &CashierClient {
        &self.inner.cashier
    }

    #[must_use]
    pub fn composer(&self) -> &EventActionComposer {
        &self.inner.composer
    }

    #[must_use]
    pub fn aggregator(&self) -> &ShippingRateAggregator {
        &self.inner.aggregator
    }

    /// Get the verifier for platform request signatures.
    #[must_use]
    pub fn signatures(&self) -> &SignatureVerifier {
        &self.inner.signatures
    }
}
