//! Purchase records — the audit trail of what was bought.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use chirp_core::{PurchaseId, UserId};

/// How a purchase was paid for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "payment_method", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Gems,
    Coins,
    Card,
    Paypal,
}

/// The client platform that issued the purchase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "platform", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    Web,
    Ios,
    Android,
}

/// The device class that issued the purchase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "device_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum DeviceType {
    Desktop,
    Mobile,
    Tablet,
}

/// One committed purchase.
///
/// A record corresponds 1:1 with a successful balance mutation: both are
/// written in the same transaction by the checkout path, and replays of the
/// same `(user, idempotency_key)` pair return this record instead of
/// creating a second one.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Purchase {
    pub id: PurchaseId,
    pub user_id: UserId,
    /// Catalog slug of the purchased item.
    pub item_id: String,
    pub quantity: i32,
    pub payment_method: PaymentMethod,
    pub platform: Platform,
    pub device_type: DeviceType,
    /// Client-generated key deduplicating retried attempts.
    pub idempotency_key: Uuid,
    /// Gems debited for this purchase (0 for externally settled purchases).
    pub gems_spent: i32,
    pub created_at: DateTime<Utc>,
}
