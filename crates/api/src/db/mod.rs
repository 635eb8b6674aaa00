//! Database operations for the Chirp `PostgreSQL` database.
//!
//! ## Tables
//!
//! - `users` - Learner accounts with their gem/heart balances
//! - `api_tokens` - Hashed bearer tokens
//! - `shop_items` - Purchasable catalog
//! - `purchases` - Purchase audit records
//! - `reports` - Content reports
//! - `payment_settings` - Singleton payment configuration (JSONB sections)
//! - `subscription_plans` - Plan catalog
//! - `units` / `lessons` / `lesson_progress` - Course content and progress
//!
//! # Migrations
//!
//! Migrations are stored in `crates/api/migrations/` and run via:
//! ```bash
//! cargo run -p chirp-cli -- migrate
//! ```

pub mod lessons;
pub mod plans;
pub mod purchases;
pub mod reports;
pub mod settings;
pub mod shop_items;
pub mod tokens;
pub mod users;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use lessons::LessonRepository;
pub use plans::PlanRepository;
pub use purchases::PurchaseRepository;
pub use reports::ReportRepository;
pub use settings::SettingsRepository;
pub use shop_items::ShopItemRepository;
pub use tokens::TokenRepository;
pub use users::UserRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., duplicate report, stale settings version).
    #[error("constraint violation: {0}")]
    Conflict(String),

    /// A guarded balance decrement did not apply.
    #[error("insufficient balance")]
    InsufficientBalance,
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
