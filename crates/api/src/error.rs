//! Unified error handling for the API.
//!
//! Every handler returns `Result<_, ApiError>`; the `IntoResponse` impl maps
//! each variant onto the JSON error envelope `{ "success": false, "error": .. }`
//! with a conventional status code.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::email::EmailError;
use crate::services::shop::CheckoutError;

/// Application-level error type for the API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Checkout flow rejected or failed.
    #[error("Checkout error: {0}")]
    Checkout(#[from] CheckoutError),

    /// Email delivery failed.
    #[error("Email error: {0}")]
    Email(#[from] EmailError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Caller is not authenticated.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Caller lacks permission.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Conflict with existing state.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// JSON body of an error response.
#[derive(Debug, Serialize)]
struct ErrorBody {
    success: bool,
    error: String,
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Database(inner) => match inner {
                RepositoryError::NotFound => StatusCode::NOT_FOUND,
                RepositoryError::Conflict(_) => StatusCode::CONFLICT,
                RepositoryError::InsufficientBalance => StatusCode::BAD_REQUEST,
                RepositoryError::Database(_) | RepositoryError::DataCorruption(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            Self::Checkout(inner) => inner.status(),
            Self::Email(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Conflict(_) => StatusCode::CONFLICT,
        }
    }

    fn is_server_error(&self) -> bool {
        self.status().is_server_error()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        // Log server errors with Sentry
        if self.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "API request error"
            );
        }

        let status = self.status();

        // Don't expose internal error details to clients
        let error = if status == StatusCode::INTERNAL_SERVER_ERROR {
            match &self {
                Self::Email(_) => "mail service unavailable".to_owned(),
                Self::Internal(message) => message.clone(),
                _ => "internal server error".to_owned(),
            }
        } else {
            match &self {
                Self::Database(inner) => inner.to_string(),
                Self::Checkout(inner) => inner.to_string(),
                Self::NotFound(m)
                | Self::Unauthorized(m)
                | Self::Forbidden(m)
                | Self::BadRequest(m)
                | Self::Conflict(m) => m.clone(),
                Self::Email(_) | Self::Internal(_) => "internal server error".to_owned(),
            }
        };

        (
            status,
            Json(ErrorBody {
                success: false,
                error,
            }),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            ApiError::NotFound("plan".to_owned()).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::Unauthorized("no token".to_owned()).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::Forbidden("not yours".to_owned()).status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ApiError::Conflict("duplicate".to_owned()).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::Database(RepositoryError::InsufficientBalance).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Database(RepositoryError::NotFound).status(),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn test_internal_details_are_hidden() {
        let response =
            ApiError::Database(RepositoryError::DataCorruption("bad row".to_owned()))
                .into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
