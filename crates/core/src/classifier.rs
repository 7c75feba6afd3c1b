//! Order classification.
//!
//! An order is a BOPIS (buy online, pick up in store) order when any line item
//! title carries the pickup marker. That title is the only signal Cashier
//! gives us, so the check is a plain case-sensitive substring match.

use serde::{Deserialize, Serialize};

use crate::types::{Cart, CartLineItemPayload, InvalidCartError};

/// Marker used when none is configured.
pub const DEFAULT_PICKUP_MARKER: &str = "pick up";

/// How an order will be fulfilled. Derived per request, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderClassification {
    /// Shipped to the customer's address.
    Standard,
    /// Picked up in store.
    Pickup,
}

impl OrderClassification {
    #[must_use]
    pub const fn is_pickup(self) -> bool {
        matches!(self, Self::Pickup)
    }
}

impl std::fmt::Display for OrderClassification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Standard => write!(f, "standard"),
            Self::Pickup => write!(f, "pickup"),
        }
    }
}

/// Classifies carts by looking for the pickup marker in line item titles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderClassifier {
    marker: String,
}

impl Default for OrderClassifier {
    fn default() -> Self {
        Self::new(DEFAULT_PICKUP_MARKER)
    }
}

impl OrderClassifier {
    #[must_use]
    pub fn new(marker: impl Into<String>) -> Self {
        Self {
            marker: marker.into(),
        }
    }

    #[must_use]
    pub fn marker(&self) -> &str {
        &self.marker
    }

    /// Classify a validated cart. An empty cart is a standard order.
    #[must_use]
    pub fn classify(&self, cart: &Cart) -> OrderClassification {
        if cart
            .items()
            .iter()
            .any(|item| item.title.contains(self.marker.as_str()))
        {
            OrderClassification::Pickup
        } else {
            OrderClassification::Standard
        }
    }

    /// Validate raw line items and classify them in one step.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidCartError`] if any line item is malformed, even when an
    /// earlier item already carries the marker.
    pub fn classify_payload(
        &self,
        items: Vec<CartLineItemPayload>,
    ) -> Result<(Cart, OrderClassification), InvalidCartError> {
        let cart = Cart::from_payload(items)?;
        let classification = self.classify(&cart);
        Ok((cart, classification))
    }
}
