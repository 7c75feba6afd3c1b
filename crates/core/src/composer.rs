//! Checkout event dispatch and action composition.
//!
//! Cashier posts a platform event for each checkout lifecycle step and applies
//! whatever actions the plugin answers with, in order. For `initialize_checkout`
//! the plugin replaces checkout's shipping rates with its own and, for pick-up
//! orders, turns checkout into a BOPIS flow:
//!
//! ```text
//! standard:  OVERRIDE_SHIPPING
//! pick up:   FLAG_ORDER_AS_BOPIS -> OVERRIDE_SHIPPING -> CHANGE_SHIPPING_ADDRESS
//! ```
//!
//! Checkout hides the address sections before it shows the override, and the
//! store address must arrive with both, so the pick-up order is fixed.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::classifier::{OrderClassification, OrderClassifier};
use crate::types::{CartLineItemPayload, InvalidCartError, PickupAddress};

/// A declarative instruction for the checkout UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionDirective {
    /// Mark the order as pick up in store and hide address entry.
    FlagOrderAsBopis(BopisFlag),
    /// Fetch shipping rates from `url` instead of checkout's own.
    OverrideShipping { url: String },
    /// Replace the shipping address.
    ChangeShippingAddress(PickupAddress),
}

impl ActionDirective {
    /// Wire name of the directive type.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::FlagOrderAsBopis(_) => "FLAG_ORDER_AS_BOPIS",
            Self::OverrideShipping { .. } => "OVERRIDE_SHIPPING",
            Self::ChangeShippingAddress(_) => "CHANGE_SHIPPING_ADDRESS",
        }
    }
}

/// Payload of `FLAG_ORDER_AS_BOPIS`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BopisFlag {
    pub flag_order_as_bopis: bool,
    pub hidden_sections: HiddenSections,
}

/// Checkout sections hidden for pick-up orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HiddenSections {
    pub shipping_address: bool,
    pub saved_addresses: bool,
}

impl BopisFlag {
    /// Flag the order as BOPIS and hide both address sections.
    #[must_use]
    pub const fn pickup() -> Self {
        Self {
            flag_order_as_bopis: true,
            hidden_sections: HiddenSections {
                shipping_address: true,
                saved_addresses: true,
            },
        }
    }
}

/// Body of a Cashier platform event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutEvent {
    #[serde(default)]
    pub event: String,
    #[serde(default)]
    pub cart: Option<EventCart>,
}

/// Cart snapshot attached to an event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventCart {
    #[serde(default)]
    pub line_items: Vec<CartLineItemPayload>,
}

/// Platform events the plugin reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    InitializeCheckout,
    OrderSubmitted,
}

impl EventKind {
    /// Look up an event by its wire name. Unknown names yield `None`.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "initialize_checkout" => Some(Self::InitializeCheckout),
            "order_submitted" => Some(Self::OrderSubmitted),
            _ => None,
        }
    }
}

/// Turns platform events into ordered checkout actions.
#[derive(Debug, Clone)]
pub struct EventActionComposer {
    classifier: OrderClassifier,
    shipping_callback_url: String,
    pickup_address: PickupAddress,
}

impl EventActionComposer {
    /// Create a composer.
    ///
    /// # Arguments
    ///
    /// * `classifier` - Decides between standard and pick-up orders
    /// * `shipping_callback_url` - Full URL checkout calls for rate overrides
    /// * `pickup_address` - Store address substituted for pick-up orders
    #[must_use]
    pub const fn new(
        classifier: OrderClassifier,
        shipping_callback_url: String,
        pickup_address: PickupAddress,
    ) -> Self {
        Self {
            classifier,
            shipping_callback_url,
            pickup_address,
        }
    }

    #[must_use]
    pub fn shipping_callback_url(&self) -> &str {
        &self.shipping_callback_url
    }

    /// Compose the actions for an event.
    ///
    /// Unknown events and `order_submitted` produce no actions.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidCartError`] when an `initialize_checkout` event has no
    /// cart or a malformed line item.
    pub fn compose(&self, event: CheckoutEvent) -> Result<Vec<ActionDirective>, InvalidCartError> {
        match EventKind::from_name(&event.event) {
            Some(EventKind::InitializeCheckout) => {
                let cart = event.cart.ok_or(InvalidCartError::MissingCart)?;
                self.initialize_checkout(cart.line_items)
            }
            // Settlement confirmation is not handled yet.
            Some(EventKind::OrderSubmitted) => Ok(Vec::new()),
            None => {
                debug!(event = %event.event, "Ignoring unknown checkout event");
                Ok(Vec::new())
            }
        }
    }

    fn initialize_checkout(
        &self,
        line_items: Vec<CartLineItemPayload>,
    ) -> Result<Vec<ActionDirective>, InvalidCartError> {
        let (_, classification) = self.classifier.classify_payload(line_items)?;
        debug!(%classification, "Composing initialize_checkout actions");

        let override_shipping = ActionDirective::OverrideShipping {
            url: self.shipping_callback_url.clone(),
        };

        Ok(match classification {
            OrderClassification::Standard => vec![override_shipping],
            OrderClassification::Pickup => vec![
                ActionDirective::FlagOrderAsBopis(BopisFlag::pickup()),
                override_shipping,
                ActionDirective::ChangeShippingAddress(self.pickup_address.clone()),
            ],
        })
    }
}
