//! Cashier BOPIS Core - Shared types and checkout decision logic.
//!
//! This crate holds everything the plugin decides without talking to the
//! network:
//! - cart and address models as they arrive from Cashier
//! - order classification (standard vs. pick up in store)
//! - the ordered checkout action list for each platform event
//! - normalization of upstream shipping lines and pickup locations into quotes
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no HTTP
//! clients. The `plugin` crate owns the upstream calls and the HTTP surface.
//!
//! # Modules
//!
//! - [`types`] - Cart, address, money, rate and routing identifier types
//! - [`classifier`] - Pickup-marker order classification
//! - [`composer`] - Event dispatch and checkout action composition

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod classifier;
pub mod composer;
pub mod types;

pub use classifier::{DEFAULT_PICKUP_MARKER, OrderClassification, OrderClassifier};
pub use composer::{
    ActionDirective, BopisFlag, CheckoutEvent, EventActionComposer, EventCart, EventKind,
    HiddenSections,
};
pub use types::*;
