//! Bearer token repository.
//!
//! Tokens are opaque strings minted by the identity layer; only their SHA-256
//! digest is stored, so a database leak does not leak usable credentials.

use chrono::{DateTime, Utc};
use rand::Rng;
use rand::distr::Alphanumeric;
use sha2::{Digest, Sha256};
use sqlx::PgPool;

use chirp_core::UserId;

use super::RepositoryError;
use crate::models::user::CurrentUser;

/// Length of a freshly minted token, in characters.
const TOKEN_LENGTH: usize = 48;

/// Generate a new random bearer token.
#[must_use]
pub fn generate_token() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(TOKEN_LENGTH)
        .map(char::from)
        .collect()
}

/// Hex-encoded SHA-256 digest of a raw token.
#[must_use]
pub fn hash_token(raw: &str) -> String {
    hex::encode(Sha256::digest(raw.as_bytes()))
}

/// Repository for API token operations.
pub struct TokenRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> TokenRepository<'a> {
    /// Create a new token repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Resolve a raw bearer token to its user, if valid and unexpired.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn authenticate(&self, raw: &str) -> Result<Option<CurrentUser>, RepositoryError> {
        let user = sqlx::query_as::<_, CurrentUser>(
            "SELECT u.id, u.email, u.role
             FROM api_tokens t
             JOIN users u ON u.id = t.user_id
             WHERE t.token_hash = $1
               AND (t.expires_at IS NULL OR t.expires_at > NOW())",
        )
        .bind(hash_token(raw))
        .fetch_optional(self.pool)
        .await?;

        Ok(user)
    }

    /// Store a token for a user. The raw token is hashed before storage.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(
        &self,
        user_id: UserId,
        raw: &str,
        expires_at: Option<DateTime<Utc>>,
    ) -> Result<(), RepositoryError> {
        sqlx::query("INSERT INTO api_tokens (token_hash, user_id, expires_at) VALUES ($1, $2, $3)")
            .bind(hash_token(raw))
            .bind(user_id)
            .bind(expires_at)
            .execute(self.pool)
            .await?;

        Ok(())
    }

    /// Delete all tokens belonging to a user (logout-everywhere, account deletion).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn delete_for_user(&self, user_id: UserId) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM api_tokens WHERE user_id = $1")
            .bind(user_id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_token_length_and_charset() {
        let token = generate_token();
        assert_eq!(token.len(), TOKEN_LENGTH);
        assert!(token.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_generate_token_is_random() {
        assert_ne!(generate_token(), generate_token());
    }

    #[test]
    fn test_hash_token_is_stable_hex() {
        let digest = hash_token("abc");
        assert_eq!(digest.len(), 64);
        assert_eq!(digest, hash_token("abc"));
        assert_ne!(digest, hash_token("abd"));
    }
}
