//! Checkout event handler.

use axum::{Json, extract::State, extract::rejection::JsonRejection};
use cashier_bopis_core::{ActionDirective, CheckoutEvent};
use serde::Serialize;
use tracing::{info, instrument};

use super::bad_json;
use crate::error::Result;
use crate::state::AppState;

/// Response consumed by checkout.
#[derive(Debug, Serialize)]
pub struct EventResponse {
    pub success: bool,
    pub actions: Vec<ActionDirective>,
}

/// Compose the actions for a checkout event.
#[instrument(skip_all)]
pub async fn handle_event(
    State(state): State<AppState>,
    payload: std::result::Result<Json<CheckoutEvent>, JsonRejection>,
) -> Result<Json<EventResponse>> {
    let Json(event) = payload.map_err(|e| bad_json(&e))?;
    let name = event.event.clone();

    let actions = state.composer().compose(event)?;
    info!(
        event = %name,
        actions = ?actions.iter().map(ActionDirective::kind).collect::<Vec<_>>(),
        "Composed checkout actions"
    );

    Ok(Json(EventResponse {
        success: true,
        actions,
    }))
}
