//! Shop checkout — the one path allowed to move currency and entitlements.
//!
//! The whole purchase (debit gems, credit hearts, append the purchase record)
//! runs inside a single database transaction, so a failure at any step leaves
//! balances untouched. Retried attempts carry the same idempotency key and
//! are answered from the already-committed purchase instead of re-applying.

use axum::http::StatusCode;
use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

use chirp_core::{CurrencyKind, UserId};

use crate::db::purchases::PURCHASE_COLUMNS;
use crate::db::{
    PurchaseRepository, RepositoryError, SettingsRepository, ShopItemRepository, UserRepository,
};
use crate::models::purchase::{DeviceType, PaymentMethod, Platform, Purchase};
use crate::models::settings::DEFAULT_MAX_HEARTS;
use crate::models::shop::ItemCategory;
use crate::models::user::Balances;

/// One checkout attempt from a client.
#[derive(Debug, Clone)]
pub struct CheckoutRequest {
    pub item_id: String,
    pub quantity: i32,
    pub platform: Platform,
    pub device_type: DeviceType,
    /// Client-generated; the same key always resolves to the same purchase.
    pub idempotency_key: Uuid,
}

/// The committed purchase and the balances after it.
#[derive(Debug, Clone)]
pub struct CheckoutOutcome {
    pub purchase: Purchase,
    pub balances: Balances,
    /// True when this call matched an earlier commit and applied nothing.
    pub replayed: bool,
}

/// Errors the checkout flow can surface to the client.
#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("unknown item: {0}")]
    UnknownItem(String),

    #[error("item {0} cannot be bought with gems")]
    NotGemPriced(String),

    #[error("quantity must be a positive integer")]
    InvalidQuantity,

    #[error("insufficient gems: need {needed}, have {available}")]
    InsufficientGems { needed: i32, available: i32 },

    #[error("hearts are already full")]
    HeartsFull,

    #[error("not enough room for that many hearts: only {room} more can be bought")]
    HeartsCapReached { room: i32 },

    #[error("user not found")]
    UserNotFound,

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl CheckoutError {
    /// HTTP status this error maps to.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::NotGemPriced(_)
            | Self::InvalidQuantity
            | Self::InsufficientGems { .. }
            | Self::HeartsFull
            | Self::HeartsCapReached { .. } => StatusCode::BAD_REQUEST,
            Self::UnknownItem(_) | Self::UserNotFound => StatusCode::NOT_FOUND,
            Self::Repository(inner) => match inner {
                RepositoryError::NotFound => StatusCode::NOT_FOUND,
                RepositoryError::Conflict(_) => StatusCode::CONFLICT,
                RepositoryError::InsufficientBalance => StatusCode::BAD_REQUEST,
                RepositoryError::Database(_) | RepositoryError::DataCorruption(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
        }
    }
}

/// Service running the transactional checkout flow.
pub struct ShopService<'a> {
    pool: &'a PgPool,
}

impl<'a> ShopService<'a> {
    /// Create a new shop service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Execute one checkout attempt.
    ///
    /// # Errors
    ///
    /// Returns a [`CheckoutError`] describing why the purchase was refused;
    /// refusals never leave a partial mutation behind.
    pub async fn checkout(
        &self,
        user_id: UserId,
        request: &CheckoutRequest,
    ) -> Result<CheckoutOutcome, CheckoutError> {
        if request.quantity < 1 {
            return Err(CheckoutError::InvalidQuantity);
        }

        // A retried attempt resolves to the purchase it already committed.
        let purchases = PurchaseRepository::new(self.pool);
        if let Some(purchase) = purchases
            .find_by_key(user_id, request.idempotency_key)
            .await?
        {
            let balances = self.balances(user_id).await?;
            return Ok(CheckoutOutcome {
                purchase,
                balances,
                replayed: true,
            });
        }

        let item = ShopItemRepository::new(self.pool)
            .get_by_id(&request.item_id)
            .await?
            .filter(|item| item.active)
            .ok_or_else(|| CheckoutError::UnknownItem(request.item_id.clone()))?;

        if item.currency != CurrencyKind::Gems {
            return Err(CheckoutError::NotGemPriced(item.id));
        }

        let max_hearts = SettingsRepository::new(self.pool)
            .get_active()
            .await?
            .map_or(DEFAULT_MAX_HEARTS, |s| s.hearts_config().max_hearts);

        let balances = self.balances(user_id).await?;

        let total = item.total_price(request.quantity);
        if balances.gems < total {
            return Err(CheckoutError::InsufficientGems {
                needed: total,
                available: balances.gems,
            });
        }

        let hearts_granted = if item.category == ItemCategory::Hearts {
            item.hearts_per_unit.saturating_mul(request.quantity)
        } else {
            0
        };

        // Over-cap requests are refused with the remaining allowance, never
        // silently clamped.
        if hearts_granted > 0 && balances.hearts + hearts_granted > max_hearts {
            let room = (max_hearts - balances.hearts).max(0) / item.hearts_per_unit.max(1);
            return Err(if room == 0 {
                CheckoutError::HeartsFull
            } else {
                CheckoutError::HeartsCapReached { room }
            });
        }

        self.commit(user_id, request, total, hearts_granted, max_hearts, balances)
            .await
    }

    /// Debit, credit and record in one transaction.
    async fn commit(
        &self,
        user_id: UserId,
        request: &CheckoutRequest,
        total: i32,
        hearts_granted: i32,
        max_hearts: i32,
        balances: Balances,
    ) -> Result<CheckoutOutcome, CheckoutError> {
        let mut tx = self.pool.begin().await.map_err(RepositoryError::from)?;

        let gems = sqlx::query_scalar::<_, i32>(
            "UPDATE users SET gems = gems - $2, updated_at = NOW()
             WHERE id = $1 AND gems >= $2
             RETURNING gems",
        )
        .bind(user_id)
        .bind(total)
        .fetch_optional(&mut *tx)
        .await
        .map_err(RepositoryError::from)?
        .ok_or(CheckoutError::InsufficientGems {
            needed: total,
            available: balances.gems,
        })?;

        let hearts = if hearts_granted > 0 {
            sqlx::query_scalar::<_, i32>(
                "UPDATE users SET hearts = hearts + $2, updated_at = NOW()
                 WHERE id = $1 AND hearts + $2 <= $3
                 RETURNING hearts",
            )
            .bind(user_id)
            .bind(hearts_granted)
            .bind(max_hearts)
            .fetch_optional(&mut *tx)
            .await
            .map_err(RepositoryError::from)?
            // A concurrent refill raced us past the cap; the open transaction
            // rolls back on drop.
            .ok_or(CheckoutError::HeartsFull)?
        } else {
            balances.hearts
        };

        let inserted = sqlx::query_as::<_, Purchase>(&format!(
            "INSERT INTO purchases
                 (user_id, item_id, quantity, payment_method, platform, device_type,
                  idempotency_key, gems_spent)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING {PURCHASE_COLUMNS}"
        ))
        .bind(user_id)
        .bind(&request.item_id)
        .bind(request.quantity)
        .bind(PaymentMethod::Gems)
        .bind(request.platform)
        .bind(request.device_type)
        .bind(request.idempotency_key)
        .bind(total)
        .fetch_one(&mut *tx)
        .await;

        let purchase = match inserted {
            Ok(purchase) => purchase,
            Err(e) => {
                if let sqlx::Error::Database(ref db_err) = e
                    && db_err.is_unique_violation()
                {
                    // A concurrent request with the same key committed first;
                    // abandon this attempt and answer from its purchase.
                    drop(tx);
                    return self.replay(user_id, request.idempotency_key).await;
                }
                return Err(RepositoryError::Database(e).into());
            }
        };

        tx.commit().await.map_err(RepositoryError::from)?;

        Ok(CheckoutOutcome {
            purchase,
            balances: Balances { gems, hearts },
            replayed: false,
        })
    }

    async fn replay(
        &self,
        user_id: UserId,
        idempotency_key: Uuid,
    ) -> Result<CheckoutOutcome, CheckoutError> {
        let purchase = PurchaseRepository::new(self.pool)
            .find_by_key(user_id, idempotency_key)
            .await?
            .ok_or_else(|| {
                CheckoutError::Repository(RepositoryError::Conflict(
                    "purchase already recorded".to_owned(),
                ))
            })?;
        let balances = self.balances(user_id).await?;
        Ok(CheckoutOutcome {
            purchase,
            balances,
            replayed: true,
        })
    }

    async fn balances(&self, user_id: UserId) -> Result<Balances, CheckoutError> {
        UserRepository::new(self.pool)
            .balances(user_id)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => CheckoutError::UserNotFound,
                other => CheckoutError::Repository(other),
            })
    }
}
