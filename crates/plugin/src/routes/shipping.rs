//! Shipping rate override handler.
//!
//! Checkout calls this once `OVERRIDE_SHIPPING` is active, sending the cart
//! and the destination address.

use axum::{
    Json,
    extract::{Query, State, rejection::JsonRejection},
};
use cashier_bopis_core::{Cart, CartLineItemPayload, DestinationAddress, RateResponse};
use serde::Deserialize;
use tracing::instrument;

use super::{RoutingQuery, bad_json};
use crate::error::Result;
use crate::state::AppState;

/// Body of a shipping rate request.
#[derive(Debug, Deserialize)]
pub struct ShippingRequest {
    pub cart: Vec<CartLineItemPayload>,
    #[serde(default)]
    pub destination_address: DestinationAddress,
}

/// Resolve shipping rates for the posted cart.
#[instrument(skip_all)]
pub async fn resolve_shipping(
    State(state): State<AppState>,
    Query(query): Query<RoutingQuery>,
    payload: std::result::Result<Json<ShippingRequest>, JsonRejection>,
) -> Result<Json<RateResponse>> {
    let context = query.into_context()?;
    let Json(request) = payload.map_err(|e| bad_json(&e))?;
    let cart = Cart::from_payload(request.cart)?;

    let response = state
        .aggregator()
        .resolve_rates(&cart, &request.destination_address, &context)
        .await?;

    Ok(Json(response))
}
