//! Integration tests for Chirp.
//!
//! # Running Tests
//!
//! ```bash
//! # Start the database and run migrations + seed
//! cargo run -p chirp-cli -- migrate
//! cargo run -p chirp-cli -- seed
//!
//! # Start the API
//! cargo run -p chirp-api
//!
//! # Run integration tests
//! cargo test -p chirp-integration-tests -- --ignored
//! ```
//!
//! # Environment
//!
//! - `CHIRP_API_BASE_URL` - API base URL (default: `http://localhost:3000`)
//! - `CHIRP_TEST_TOKEN` - bearer token of a regular test user
//! - `CHIRP_TEST_ADMIN_TOKEN` - bearer token of an admin test user
//!
//! Tokens come from `chirp-cli user create`.

use reqwest::Client;

/// Base URL for the API (configurable via environment).
#[must_use]
pub fn base_url() -> String {
    std::env::var("CHIRP_API_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_owned())
}

/// Bearer token of the regular test user.
#[must_use]
pub fn user_token() -> String {
    std::env::var("CHIRP_TEST_TOKEN").unwrap_or_default()
}

/// Bearer token of the admin test user.
#[must_use]
pub fn admin_token() -> String {
    std::env::var("CHIRP_TEST_ADMIN_TOKEN").unwrap_or_default()
}

/// A plain HTTP client.
#[must_use]
pub fn client() -> Client {
    Client::builder()
        .build()
        .expect("Failed to create HTTP client")
}
