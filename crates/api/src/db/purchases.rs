//! Purchase record repository.

use sqlx::PgPool;
use uuid::Uuid;

use chirp_core::UserId;

use super::RepositoryError;
use crate::models::purchase::{DeviceType, PaymentMethod, Platform, Purchase};

pub(crate) const PURCHASE_COLUMNS: &str = "id, user_id, item_id, quantity, payment_method, \
     platform, device_type, idempotency_key, gems_spent, created_at";

/// Everything needed to append one purchase record.
#[derive(Debug, Clone)]
pub struct NewPurchase {
    pub user_id: UserId,
    pub item_id: String,
    pub quantity: i32,
    pub payment_method: PaymentMethod,
    pub platform: Platform,
    pub device_type: DeviceType,
    pub idempotency_key: Uuid,
    pub gems_spent: i32,
}

/// Repository for purchase records.
pub struct PurchaseRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> PurchaseRepository<'a> {
    /// Create a new purchase repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Append a purchase record.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` when the `(user, idempotency_key)`
    /// pair was already recorded, `RepositoryError::Database` otherwise.
    pub async fn create(&self, new: &NewPurchase) -> Result<Purchase, RepositoryError> {
        let purchase = sqlx::query_as::<_, Purchase>(&format!(
            "INSERT INTO purchases
                 (user_id, item_id, quantity, payment_method, platform, device_type,
                  idempotency_key, gems_spent)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING {PURCHASE_COLUMNS}"
        ))
        .bind(new.user_id)
        .bind(&new.item_id)
        .bind(new.quantity)
        .bind(new.payment_method)
        .bind(new.platform)
        .bind(new.device_type)
        .bind(new.idempotency_key)
        .bind(new.gems_spent)
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict("purchase already recorded".to_owned());
            }
            RepositoryError::Database(e)
        })?;

        Ok(purchase)
    }

    /// Find a previously committed purchase by its idempotency key.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn find_by_key(
        &self,
        user_id: UserId,
        idempotency_key: Uuid,
    ) -> Result<Option<Purchase>, RepositoryError> {
        let purchase = sqlx::query_as::<_, Purchase>(&format!(
            "SELECT {PURCHASE_COLUMNS} FROM purchases
             WHERE user_id = $1 AND idempotency_key = $2"
        ))
        .bind(user_id)
        .bind(idempotency_key)
        .fetch_optional(self.pool)
        .await?;

        Ok(purchase)
    }

    /// A user's purchase history, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Purchase>, RepositoryError> {
        let purchases = sqlx::query_as::<_, Purchase>(&format!(
            "SELECT {PURCHASE_COLUMNS} FROM purchases
             WHERE user_id = $1
             ORDER BY created_at DESC"
        ))
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        Ok(purchases)
    }
}
