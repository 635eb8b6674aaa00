//! HTTP route handlers.
//!
//! Every endpoint responds with the same JSON envelope:
//!
//! ```json
//! { "success": true,  "data": ... }
//! { "success": true,  "message": "..." }
//! { "success": false, "error": "..." }
//! ```
//!
//! The error arm is produced by [`crate::error::ApiError`]'s `IntoResponse`.

pub mod lessons;
pub mod payment_settings;
pub mod plans;
pub mod reports;
pub mod shop;
pub mod users;

use axum::Router;
use serde::Serialize;

use crate::state::AppState;

/// Success envelope wrapping every 2xx response body.
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T: Serialize> Envelope<T> {
    /// Wrap a data payload.
    #[must_use]
    pub const fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
        }
    }
}

impl Envelope<()> {
    /// Wrap a human-readable message with no payload.
    #[must_use]
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: None,
            message: Some(message.into()),
        }
    }
}

/// Build the full application router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(users::router())
        .merge(shop::router())
        .merge(reports::router())
        .merge(plans::router())
        .merge(lessons::router())
        .merge(payment_settings::router())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_data_envelope_shape() {
        let json = serde_json::to_value(Envelope::ok(serde_json::json!({"gems": 500}))).unwrap();
        assert_eq!(json, serde_json::json!({"success": true, "data": {"gems": 500}}));
    }

    #[test]
    fn test_message_envelope_shape() {
        let json = serde_json::to_value(Envelope::message("account deleted")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"success": true, "message": "account deleted"})
        );
    }
}
