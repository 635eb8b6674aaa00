//! Shop catalog and checkout handlers.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tracing::instrument;
use uuid::Uuid;

use crate::db::ShopItemRepository;
use crate::error::ApiError;
use crate::middleware::RequireAuth;
use crate::models::purchase::{DeviceType, Platform, Purchase};
use crate::models::shop::ShopItem;
use crate::routes::Envelope;
use crate::services::ShopService;
use crate::services::shop::CheckoutRequest;
use crate::state::AppState;

/// Build the shop router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/shop/items", get(list_items))
        .route("/api/shop/checkout", post(checkout))
}

/// The purchasable catalog.
async fn list_items(
    State(state): State<AppState>,
) -> Result<Json<Envelope<Vec<ShopItem>>>, ApiError> {
    let items = ShopItemRepository::new(state.pool()).list_active().await?;
    Ok(Json(Envelope::ok(items)))
}

/// Checkout request body.
#[derive(Debug, Deserialize)]
pub struct CheckoutBody {
    pub item_id: String,
    #[serde(default = "default_quantity")]
    pub quantity: i32,
    pub platform: Platform,
    pub device_type: DeviceType,
    /// Client-generated key; resend the same key when retrying.
    pub idempotency_key: Uuid,
}

const fn default_quantity() -> i32 {
    1
}

/// Checkout response payload: the committed purchase and resulting balances.
#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    pub purchase: Purchase,
    pub gems: i32,
    pub hearts: i32,
}

/// Buy one catalog item with gems.
///
/// Validation, the gem debit, the entitlement credit and the purchase record
/// all happen server-side in one transaction; clients never sequence
/// balance mutations themselves.
#[instrument(skip(state, body), fields(user_id = %current.id, item_id = %body.item_id))]
async fn checkout(
    RequireAuth(current): RequireAuth,
    State(state): State<AppState>,
    Json(body): Json<CheckoutBody>,
) -> Result<(StatusCode, Json<Envelope<CheckoutResponse>>), ApiError> {
    let outcome = ShopService::new(state.pool())
        .checkout(
            current.id,
            &CheckoutRequest {
                item_id: body.item_id,
                quantity: body.quantity,
                platform: body.platform,
                device_type: body.device_type,
                idempotency_key: body.idempotency_key,
            },
        )
        .await?;

    let status = if outcome.replayed {
        StatusCode::OK
    } else {
        StatusCode::CREATED
    };

    tracing::info!(
        purchase_id = %outcome.purchase.id,
        replayed = outcome.replayed,
        "checkout committed"
    );

    Ok((
        status,
        Json(Envelope::ok(CheckoutResponse {
            purchase: outcome.purchase,
            gems: outcome.balances.gems,
            hearts: outcome.balances.hearts,
        })),
    ))
}
