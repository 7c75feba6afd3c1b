//! Plugin install and uninstall flow.
//!
//! # Install
//!
//! 1. The merchant clicks install; Cashier sends their browser to
//!    `/oauth/redirect?platform=..&shop=..`
//! 2. We redirect to Cashier's authorize page with the scopes we need
//! 3. Cashier redirects back to `/oauth/authorize` with a `code`
//! 4. We exchange the code for an access token and send the merchant back to
//!    the marketplace

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Redirect,
};
use serde::Deserialize;
use tracing::{info, instrument};

use super::RoutingQuery;
use crate::error::{AppError, Result};
use crate::state::AppState;

/// Query parameters on the authorize callback.
#[derive(Debug, Deserialize)]
pub struct AuthorizeQuery {
    pub platform: Option<String>,
    pub shop: Option<String>,
    pub code: Option<String>,
}

/// Start the install flow.
#[instrument(skip_all)]
pub async fn redirect(
    State(state): State<AppState>,
    Query(query): Query<RoutingQuery>,
) -> Result<Redirect> {
    let context = query.into_context()?;
    let url = state.cashier().authorization_url(&context);

    info!(platform = %context.platform, shop = %context.shop, "Redirecting to Cashier OAuth");
    Ok(Redirect::to(&url))
}

/// Finish the install flow.
#[instrument(skip_all)]
pub async fn authorize(
    State(state): State<AppState>,
    Query(query): Query<AuthorizeQuery>,
) -> Result<Redirect> {
    let context = RoutingQuery {
        platform: query.platform,
        shop: query.shop,
    }
    .into_context()?;
    let code = query
        .code
        .filter(|code| !code.is_empty())
        .ok_or_else(|| AppError::BadRequest("\"code\" is required".to_string()))?;

    let _token = state
        .cashier()
        .exchange_code(&context, &code)
        .await
        .map_err(AppError::OAuth)?;

    // No persistence layer: the token is dropped here.
    info!(
        platform = %context.platform,
        shop = %context.shop,
        has_token = true,
        "Plugin installed"
    );

    Ok(Redirect::to(&state.cashier().marketplace_url(&context)))
}

/// Cashier notifies us the plugin was removed from a shop.
#[instrument(skip_all)]
pub async fn uninstalled(Query(query): Query<RoutingQuery>) -> Result<StatusCode> {
    let context = query.into_context()?;
    info!(platform = %context.platform, shop = %context.shop, "Plugin uninstalled");
    Ok(StatusCode::OK)
}
