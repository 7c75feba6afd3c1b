//! Core types for the Cashier BOPIS plugin.
//!
//! This module provides type-safe wrappers for the request-scoped domain
//! concepts exchanged with Cashier and the upstream providers.

pub mod address;
pub mod cart;
pub mod id;
pub mod money;
pub mod rate;

pub use address::{DestinationAddress, PickupAddress};
pub use cart::{Cart, CartLineItem, CartLineItemPayload, InvalidCartError, NormalizedLineItem};
pub use id::*;
pub use money::minor_units_to_display;
pub use rate::{
    PICKUP_RATE_NAME, PickupLocation, RateResponse, STANDARD_RATE_NAME, ShippingLine,
    ShippingLineDetails, ShippingLinesResponse, ShippingRateQuote,
};
