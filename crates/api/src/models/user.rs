//! User domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use chirp_core::{Email, UserId, UserRole};

/// A learner account.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Subject identifier assigned by the external identity provider.
    pub external_id: Uuid,
    /// User's email address.
    pub email: Email,
    /// Display name shown on leaderboards and the profile page.
    pub display_name: String,
    /// ISO 639-1 code of the language the user speaks.
    pub native_language: String,
    /// ISO 639-1 code of the language the user is learning.
    pub learning_language: String,
    /// Daily practice goal in minutes.
    pub daily_goal_minutes: i32,
    /// Account role.
    pub role: UserRole,
    /// Soft currency balance.
    pub gems: i32,
    /// Remaining attempts, capped at the configured maximum.
    pub hearts: i32,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
    /// When the user was last updated.
    pub updated_at: DateTime<Utc>,
}

/// The authenticated caller, resolved from a bearer token.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct CurrentUser {
    pub id: UserId,
    pub email: Email,
    pub role: UserRole,
}

impl CurrentUser {
    /// Whether this caller may act on `target`'s resources.
    #[must_use]
    pub fn can_act_for(&self, target: UserId) -> bool {
        self.id == target || self.role == UserRole::Admin
    }
}

/// A user's currency balances, returned by every mutation endpoint.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::FromRow)]
pub struct Balances {
    pub gems: i32,
    pub hearts: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn current(id: i32, role: UserRole) -> CurrentUser {
        CurrentUser {
            id: UserId::new(id),
            email: Email::parse("u@example.com").expect("valid"),
            role,
        }
    }

    #[test]
    fn test_can_act_for_self() {
        assert!(current(1, UserRole::User).can_act_for(UserId::new(1)));
    }

    #[test]
    fn test_cannot_act_for_other_user() {
        assert!(!current(1, UserRole::User).can_act_for(UserId::new(2)));
    }

    #[test]
    fn test_admin_can_act_for_anyone() {
        assert!(current(1, UserRole::Admin).can_act_for(UserId::new(2)));
    }
}
