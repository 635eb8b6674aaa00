//! Authentication extractors.
//!
//! Callers authenticate with an opaque bearer token; the extractors resolve
//! the `Authorization` header against the token repository and hand the
//! handler a [`CurrentUser`].
//!
//! # Example
//!
//! ```rust,ignore
//! async fn protected_handler(
//!     RequireAuth(user): RequireAuth,
//! ) -> impl IntoResponse {
//!     format!("Hello, {}!", user.email)
//! }
//! ```

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

use chirp_core::UserRole;

use crate::db::TokenRepository;
use crate::error::ApiError;
use crate::models::user::CurrentUser;
use crate::state::AppState;

/// Extractor that requires an authenticated caller.
pub struct RequireAuth(pub CurrentUser);

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)
            .ok_or_else(|| ApiError::Unauthorized("missing bearer token".to_owned()))?;

        let user = TokenRepository::new(state.pool())
            .authenticate(token)
            .await?
            .ok_or_else(|| ApiError::Unauthorized("invalid or expired token".to_owned()))?;

        Ok(Self(user))
    }
}

/// Extractor that optionally resolves the caller.
///
/// Unlike [`RequireAuth`], this does not reject unauthenticated requests;
/// a present-but-invalid token is treated as anonymous.
pub struct OptionalAuth(pub Option<CurrentUser>);

impl FromRequestParts<AppState> for OptionalAuth {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = match bearer_token(parts) {
            Some(token) => TokenRepository::new(state.pool()).authenticate(token).await?,
            None => None,
        };

        Ok(Self(user))
    }
}

/// Extractor that requires an admin caller.
///
/// Returns 401 for unauthenticated requests and 403 for authenticated
/// non-admins.
pub struct RequireAdmin(pub CurrentUser);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let RequireAuth(user) = RequireAuth::from_request_parts(parts, state).await?;

        if user.role != UserRole::Admin {
            return Err(ApiError::Forbidden(
                "admin access is required for this resource".to_owned(),
            ));
        }

        Ok(Self(user))
    }
}

/// Pull the bearer token out of the `Authorization` header.
fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts_with_auth(value: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/api/users/profile");
        if let Some(v) = value {
            builder = builder.header(AUTHORIZATION, v);
        }
        let (parts, ()) = builder.body(()).expect("valid request").into_parts();
        parts
    }

    #[test]
    fn test_bearer_token_extracted() {
        let parts = parts_with_auth(Some("Bearer abc123"));
        assert_eq!(bearer_token(&parts), Some("abc123"));
    }

    #[test]
    fn test_missing_header() {
        let parts = parts_with_auth(None);
        assert_eq!(bearer_token(&parts), None);
    }

    #[test]
    fn test_wrong_scheme() {
        let parts = parts_with_auth(Some("Basic abc123"));
        assert_eq!(bearer_token(&parts), None);
    }

    #[test]
    fn test_empty_token() {
        let parts = parts_with_auth(Some("Bearer "));
        assert_eq!(bearer_token(&parts), None);
    }
}
