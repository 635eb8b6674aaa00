//! Subscription plan repository.

use sqlx::PgPool;

use super::RepositoryError;
use crate::models::plan::SubscriptionPlan;

const PLAN_COLUMNS: &str = "id, name, description, price, currency, billing_period, \
     promo_price, promo_starts_at, promo_ends_at, active";

/// Repository for subscription plans.
pub struct PlanRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> PlanRepository<'a> {
    /// Create a new plan repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a plan by its slug.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: &str) -> Result<Option<SubscriptionPlan>, RepositoryError> {
        let plan = sqlx::query_as::<_, SubscriptionPlan>(&format!(
            "SELECT {PLAN_COLUMNS} FROM subscription_plans WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(plan)
    }

    /// All active plans, cheapest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_active(&self) -> Result<Vec<SubscriptionPlan>, RepositoryError> {
        let plans = sqlx::query_as::<_, SubscriptionPlan>(&format!(
            "SELECT {PLAN_COLUMNS} FROM subscription_plans
             WHERE active = TRUE
             ORDER BY price ASC"
        ))
        .fetch_all(self.pool)
        .await?;

        Ok(plans)
    }
}
