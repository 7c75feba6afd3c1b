//! Shipping rate aggregation.
//!
//! Checkout calls the plugin's `/shipping` endpoint once `OVERRIDE_SHIPPING`
//! is in effect. Standard orders get Cashier's own shipping lines re-labelled
//! under the plugin's override; pick-up orders get one free rate per nearby
//! location. Exactly one upstream call is made per request and its failure is
//! terminal: no retries, no partial rate list.

use std::sync::Arc;

use cashier_bopis_core::{
    Cart, DestinationAddress, OrderClassification, OrderClassifier, ProviderContext, RateResponse,
};
use tracing::{error, info, instrument};

use crate::providers::{
    LocationProvider, PickupArea, RateProvider, ShippingLinesRequest, UpstreamProviderError,
};

/// Resolves the shipping override for a cart.
#[derive(Clone)]
pub struct ShippingRateAggregator {
    classifier: OrderClassifier,
    rates: Arc<dyn RateProvider>,
    locations: Arc<dyn LocationProvider>,
    pickup_area: PickupArea,
}

impl ShippingRateAggregator {
    #[must_use]
    pub fn new(
        classifier: OrderClassifier,
        rates: Arc<dyn RateProvider>,
        locations: Arc<dyn LocationProvider>,
        pickup_area: PickupArea,
    ) -> Self {
        Self {
            classifier,
            rates,
            locations,
            pickup_area,
        }
    }

    /// Resolve the rate list for `cart` shipped to `destination`.
    ///
    /// # Errors
    ///
    /// Returns [`UpstreamProviderError`] tagged with the branch that ran when
    /// the provider call fails for any reason.
    #[instrument(
        skip(self, cart, destination),
        fields(
            platform = %context.platform,
            shop = %context.shop,
            classification = tracing::field::Empty
        )
    )]
    pub async fn resolve_rates(
        &self,
        cart: &Cart,
        destination: &DestinationAddress,
        context: &ProviderContext,
    ) -> Result<RateResponse, UpstreamProviderError> {
        let items = cart.normalized_items();
        let classification = self.classifier.classify(cart);
        tracing::Span::current().record("classification", tracing::field::display(classification));

        let result = match classification {
            OrderClassification::Standard => {
                let request = ShippingLinesRequest::new(destination, items);
                self.rates
                    .shipping_lines(context, &request)
                    .await
                    .map(RateResponse::standard)
            }
            OrderClassification::Pickup => self
                .locations
                .locations_within(&self.pickup_area)
                .await
                .map(RateResponse::pickup),
        };

        match result {
            Ok(response) => {
                info!(rates = response.rates.len(), "Resolved shipping rates");
                Ok(response)
            }
            Err(source) => {
                error!(
                    %classification,
                    timeout = source.is_timeout(),
                    error = %source,
                    "Shipping rate lookup failed"
                );
                Err(UpstreamProviderError::new(classification, source))
            }
        }
    }
}
