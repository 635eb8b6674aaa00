//! Shop catalog repository.

use sqlx::PgPool;

use super::RepositoryError;
use crate::models::shop::ShopItem;

const ITEM_COLUMNS: &str = "id, name, price, currency, category, hearts_per_unit, active";

/// Repository for shop catalog entries.
pub struct ShopItemRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ShopItemRepository<'a> {
    /// Create a new shop item repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a catalog entry by slug.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: &str) -> Result<Option<ShopItem>, RepositoryError> {
        let item = sqlx::query_as::<_, ShopItem>(&format!(
            "SELECT {ITEM_COLUMNS} FROM shop_items WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(item)
    }

    /// The purchasable catalog, cheapest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_active(&self) -> Result<Vec<ShopItem>, RepositoryError> {
        let items = sqlx::query_as::<_, ShopItem>(&format!(
            "SELECT {ITEM_COLUMNS} FROM shop_items
             WHERE active = TRUE
             ORDER BY price ASC"
        ))
        .fetch_all(self.pool)
        .await?;

        Ok(items)
    }
}
