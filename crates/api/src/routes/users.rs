//! User profile, balance and purchase-record handlers.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post, put},
};
use serde::Deserialize;
use tracing::instrument;
use uuid::Uuid;

use chirp_core::UserId;

use crate::db::purchases::NewPurchase;
use crate::db::users::ProfileUpdate;
use crate::db::{PurchaseRepository, RepositoryError, SettingsRepository, UserRepository};
use crate::error::ApiError;
use crate::middleware::RequireAuth;
use crate::models::purchase::{DeviceType, PaymentMethod, Platform, Purchase};
use crate::models::settings::DEFAULT_MAX_HEARTS;
use crate::models::user::{Balances, CurrentUser, User};
use crate::routes::Envelope;
use crate::state::AppState;

/// Build the users router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/api/users/profile",
            get(get_profile).put(update_profile).delete(delete_account),
        )
        .route("/api/users/{user_id}/gems", put(update_gems))
        .route("/api/users/{user_id}/hearts", put(update_hearts))
        .route(
            "/api/users/{user_id}/purchases",
            post(create_purchase).get(list_purchases),
        )
}

// =============================================================================
// Profile
// =============================================================================

/// Request to update the caller's profile.
#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub display_name: String,
    pub native_language: String,
    pub learning_language: String,
    pub daily_goal_minutes: i32,
}

impl UpdateProfileRequest {
    fn validate(&self) -> Result<(), ApiError> {
        if self.display_name.is_empty() || self.display_name.len() > 64 {
            return Err(ApiError::BadRequest(
                "display_name must be 1-64 characters".to_owned(),
            ));
        }
        if !(1..=240).contains(&self.daily_goal_minutes) {
            return Err(ApiError::BadRequest(
                "daily_goal_minutes must be between 1 and 240".to_owned(),
            ));
        }
        if self.native_language.is_empty() || self.learning_language.is_empty() {
            return Err(ApiError::BadRequest(
                "native_language and learning_language are required".to_owned(),
            ));
        }
        Ok(())
    }
}

/// Get the caller's profile, including balances.
async fn get_profile(
    RequireAuth(current): RequireAuth,
    State(state): State<AppState>,
) -> Result<Json<Envelope<User>>, ApiError> {
    let user = UserRepository::new(state.pool())
        .get_by_id(current.id)
        .await?
        .ok_or_else(|| ApiError::NotFound("user not found".to_owned()))?;

    Ok(Json(Envelope::ok(user)))
}

/// Update the caller's profile fields.
#[instrument(skip(state, body), fields(user_id = %current.id))]
async fn update_profile(
    RequireAuth(current): RequireAuth,
    State(state): State<AppState>,
    Json(body): Json<UpdateProfileRequest>,
) -> Result<Json<Envelope<User>>, ApiError> {
    body.validate()?;

    let user = UserRepository::new(state.pool())
        .update_profile(
            current.id,
            &ProfileUpdate {
                display_name: body.display_name,
                native_language: body.native_language,
                learning_language: body.learning_language,
                daily_goal_minutes: body.daily_goal_minutes,
            },
        )
        .await?;

    Ok(Json(Envelope::ok(user)))
}

/// Delete the caller's account. Tokens, purchases, progress and reports cascade.
#[instrument(skip(state), fields(user_id = %current.id))]
async fn delete_account(
    RequireAuth(current): RequireAuth,
    State(state): State<AppState>,
) -> Result<StatusCode, ApiError> {
    UserRepository::new(state.pool()).delete(current.id).await?;
    tracing::info!("account deleted");

    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// Currency mutation
// =============================================================================

/// `?action=inc|dec` on the balance endpoints.
#[derive(Debug, Deserialize)]
pub struct ActionQuery {
    pub action: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CurrencyAction {
    Inc,
    Dec,
}

impl ActionQuery {
    fn parse(&self) -> Result<CurrencyAction, ApiError> {
        match self.action.as_deref() {
            Some("inc") => Ok(CurrencyAction::Inc),
            Some("dec") => Ok(CurrencyAction::Dec),
            _ => Err(ApiError::BadRequest(
                "action must be 'inc' or 'dec'".to_owned(),
            )),
        }
    }
}

/// Body of a balance mutation.
#[derive(Debug, Deserialize)]
pub struct AmountRequest {
    pub amount: i32,
}

impl AmountRequest {
    fn validate(&self) -> Result<i32, ApiError> {
        if self.amount <= 0 {
            return Err(ApiError::BadRequest(
                "amount must be a positive integer".to_owned(),
            ));
        }
        Ok(self.amount)
    }
}

fn check_ownership(current: &CurrentUser, target: UserId) -> Result<(), ApiError> {
    if current.can_act_for(target) {
        Ok(())
    } else {
        Err(ApiError::Forbidden(
            "cannot modify another user's balance".to_owned(),
        ))
    }
}

/// Adjust a user's gem balance.
///
/// Decrements are refused outright when the balance is too small; nothing is
/// partially applied.
#[instrument(skip(state, body))]
async fn update_gems(
    RequireAuth(current): RequireAuth,
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
    Query(query): Query<ActionQuery>,
    Json(body): Json<AmountRequest>,
) -> Result<Json<Envelope<Balances>>, ApiError> {
    check_ownership(&current, user_id)?;
    let action = query.parse()?;
    let amount = body.validate()?;

    let users = UserRepository::new(state.pool());
    let gems = match action {
        CurrencyAction::Inc => users.increment_gems(user_id, amount).await?,
        CurrencyAction::Dec => users.decrement_gems(user_id, amount).await.map_err(|e| {
            if matches!(e, RepositoryError::InsufficientBalance) {
                ApiError::BadRequest("insufficient gems".to_owned())
            } else {
                e.into()
            }
        })?,
    };
    let hearts = users.balances(user_id).await?.hearts;

    Ok(Json(Envelope::ok(Balances { gems, hearts })))
}

/// Adjust a user's heart balance.
///
/// Increments clamp at the configured maximum; decrements below zero are
/// refused.
#[instrument(skip(state, body))]
async fn update_hearts(
    RequireAuth(current): RequireAuth,
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
    Query(query): Query<ActionQuery>,
    Json(body): Json<AmountRequest>,
) -> Result<Json<Envelope<Balances>>, ApiError> {
    check_ownership(&current, user_id)?;
    let action = query.parse()?;
    let amount = body.validate()?;

    let users = UserRepository::new(state.pool());
    let hearts = match action {
        CurrencyAction::Inc => {
            let max_hearts = SettingsRepository::new(state.pool())
                .get_active()
                .await?
                .map_or(DEFAULT_MAX_HEARTS, |s| s.hearts_config().max_hearts);
            users.increment_hearts(user_id, amount, max_hearts).await?
        }
        CurrencyAction::Dec => users.decrement_hearts(user_id, amount).await.map_err(|e| {
            if matches!(e, RepositoryError::InsufficientBalance) {
                ApiError::BadRequest("insufficient hearts".to_owned())
            } else {
                e.into()
            }
        })?,
    };
    let gems = users.balances(user_id).await?.gems;

    Ok(Json(Envelope::ok(Balances { gems, hearts })))
}

// =============================================================================
// Purchase records
// =============================================================================

/// Request to append a purchase record.
#[derive(Debug, Deserialize)]
pub struct CreatePurchaseRequest {
    pub item_id: String,
    #[serde(default = "default_quantity")]
    pub quantity: i32,
    pub payment_method: PaymentMethod,
    pub platform: Platform,
    pub device_type: DeviceType,
    /// Defaults to a fresh key when the client does not supply one.
    pub idempotency_key: Option<Uuid>,
}

const fn default_quantity() -> i32 {
    1
}

/// Append a purchase record for audit/history.
///
/// Replaying a previously used idempotency key returns the original record
/// with 200 instead of creating a duplicate.
#[instrument(skip(state, body))]
async fn create_purchase(
    RequireAuth(current): RequireAuth,
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
    Json(body): Json<CreatePurchaseRequest>,
) -> Result<(StatusCode, Json<Envelope<Purchase>>), ApiError> {
    check_ownership(&current, user_id)?;

    if body.item_id.is_empty() {
        return Err(ApiError::BadRequest("item_id is required".to_owned()));
    }
    if body.quantity < 1 {
        return Err(ApiError::BadRequest(
            "quantity must be a positive integer".to_owned(),
        ));
    }

    let purchases = PurchaseRepository::new(state.pool());

    if let Some(key) = body.idempotency_key
        && let Some(existing) = purchases.find_by_key(user_id, key).await?
    {
        return Ok((StatusCode::OK, Json(Envelope::ok(existing))));
    }

    let purchase = purchases
        .create(&NewPurchase {
            user_id,
            item_id: body.item_id,
            quantity: body.quantity,
            payment_method: body.payment_method,
            platform: body.platform,
            device_type: body.device_type,
            idempotency_key: body.idempotency_key.unwrap_or_else(Uuid::new_v4),
            gems_spent: 0,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(Envelope::ok(purchase))))
}

/// A user's purchase history, newest first.
async fn list_purchases(
    RequireAuth(current): RequireAuth,
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
) -> Result<Json<Envelope<Vec<Purchase>>>, ApiError> {
    check_ownership(&current, user_id)?;

    let purchases = PurchaseRepository::new(state.pool())
        .list_for_user(user_id)
        .await?;

    Ok(Json(Envelope::ok(purchases)))
}
