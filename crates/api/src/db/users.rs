//! User repository: profiles and currency balances.
//!
//! Balance mutations are single guarded `UPDATE` statements; the guard in the
//! `WHERE` clause is what keeps balances from going negative under concurrent
//! writers, not any check-then-write sequence in Rust.

use sqlx::PgPool;
use uuid::Uuid;

use chirp_core::{Email, UserId, UserRole};

use super::RepositoryError;
use crate::models::user::{Balances, User};

const USER_COLUMNS: &str = "id, external_id, email, display_name, native_language, \
     learning_language, daily_goal_minutes, role, gems, hearts, created_at, updated_at";

/// Fields a user may change on their own profile.
#[derive(Debug, Clone)]
pub struct ProfileUpdate {
    pub display_name: String,
    pub native_language: String,
    pub learning_language: String,
    pub daily_goal_minutes: i32,
}

/// Repository for user database operations.
pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a user by their ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(user)
    }

    /// Create a new user with default balances.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(
        &self,
        email: &Email,
        display_name: &str,
        role: UserRole,
    ) -> Result<User, RepositoryError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (external_id, email, display_name, role)
             VALUES ($1, $2, $3, $4)
             RETURNING {USER_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(email)
        .bind(display_name)
        .bind(role)
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict("email already exists".to_owned());
            }
            RepositoryError::Database(e)
        })?;

        Ok(user)
    }

    /// Update a user's profile fields.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    pub async fn update_profile(
        &self,
        id: UserId,
        update: &ProfileUpdate,
    ) -> Result<User, RepositoryError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "UPDATE users
             SET display_name = $2, native_language = $3, learning_language = $4,
                 daily_goal_minutes = $5, updated_at = NOW()
             WHERE id = $1
             RETURNING {USER_COLUMNS}"
        ))
        .bind(id)
        .bind(&update.display_name)
        .bind(&update.native_language)
        .bind(&update.learning_language)
        .bind(update.daily_goal_minutes)
        .fetch_optional(self.pool)
        .await?;

        user.ok_or(RepositoryError::NotFound)
    }

    /// Delete a user account. Tokens, purchases, progress and reports cascade.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    pub async fn delete(&self, id: UserId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// Get a user's current balances.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    pub async fn balances(&self, id: UserId) -> Result<Balances, RepositoryError> {
        let balances =
            sqlx::query_as::<_, Balances>("SELECT gems, hearts FROM users WHERE id = $1")
                .bind(id)
                .fetch_optional(self.pool)
                .await?;

        balances.ok_or(RepositoryError::NotFound)
    }

    /// Add gems to a user's balance. Unbounded above.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    pub async fn increment_gems(&self, id: UserId, amount: i32) -> Result<i32, RepositoryError> {
        let gems = sqlx::query_scalar::<_, i32>(
            "UPDATE users SET gems = gems + $2, updated_at = NOW()
             WHERE id = $1
             RETURNING gems",
        )
        .bind(id)
        .bind(amount)
        .fetch_optional(self.pool)
        .await?;

        gems.ok_or(RepositoryError::NotFound)
    }

    /// Subtract gems from a user's balance, refusing to go below zero.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::InsufficientBalance` when the balance is
    /// smaller than `amount` (nothing is applied), `RepositoryError::NotFound`
    /// if the user doesn't exist.
    pub async fn decrement_gems(&self, id: UserId, amount: i32) -> Result<i32, RepositoryError> {
        let gems = sqlx::query_scalar::<_, i32>(
            "UPDATE users SET gems = gems - $2, updated_at = NOW()
             WHERE id = $1 AND gems >= $2
             RETURNING gems",
        )
        .bind(id)
        .bind(amount)
        .fetch_optional(self.pool)
        .await?;

        match gems {
            Some(gems) => Ok(gems),
            None => Err(self.missing_or_insufficient(id).await?),
        }
    }

    /// Add hearts, clamped at `max_hearts`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    pub async fn increment_hearts(
        &self,
        id: UserId,
        amount: i32,
        max_hearts: i32,
    ) -> Result<i32, RepositoryError> {
        let hearts = sqlx::query_scalar::<_, i32>(
            "UPDATE users SET hearts = LEAST(hearts + $2, $3), updated_at = NOW()
             WHERE id = $1
             RETURNING hearts",
        )
        .bind(id)
        .bind(amount)
        .bind(max_hearts)
        .fetch_optional(self.pool)
        .await?;

        hearts.ok_or(RepositoryError::NotFound)
    }

    /// Subtract hearts, refusing to go below zero.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::InsufficientBalance` when fewer than `amount`
    /// hearts remain, `RepositoryError::NotFound` if the user doesn't exist.
    pub async fn decrement_hearts(&self, id: UserId, amount: i32) -> Result<i32, RepositoryError> {
        let hearts = sqlx::query_scalar::<_, i32>(
            "UPDATE users SET hearts = hearts - $2, updated_at = NOW()
             WHERE id = $1 AND hearts >= $2
             RETURNING hearts",
        )
        .bind(id)
        .bind(amount)
        .fetch_optional(self.pool)
        .await?;

        match hearts {
            Some(hearts) => Ok(hearts),
            None => Err(self.missing_or_insufficient(id).await?),
        }
    }

    /// Distinguish "no such user" from "guard refused the update".
    async fn missing_or_insufficient(
        &self,
        id: UserId,
    ) -> Result<RepositoryError, RepositoryError> {
        let exists = sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
            .bind(id)
            .fetch_one(self.pool)
            .await?;

        Ok(if exists {
            RepositoryError::InsufficientBalance
        } else {
            RepositoryError::NotFound
        })
    }
}
