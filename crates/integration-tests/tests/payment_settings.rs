//! Integration tests for the admin payment settings endpoints.
//!
//! These tests require:
//! - A running `PostgreSQL` database with migrations applied
//! - The API server running (cargo run -p chirp-api)
//! - `CHIRP_TEST_ADMIN_TOKEN` set to an admin user
//!
//! Run with: cargo test -p chirp-integration-tests -- --ignored

use reqwest::StatusCode;
use serde_json::{Value, json};

use chirp_integration_tests::{admin_token, base_url, client, user_token};

fn settings_url() -> String {
    format!("{}/api/admin/payments/settings", base_url())
}

async fn get_settings() -> Value {
    let resp = client()
        .get(settings_url())
        .bearer_auth(admin_token())
        .send()
        .await
        .expect("settings request failed");
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.expect("invalid json");
    body["data"].clone()
}

#[tokio::test]
#[ignore = "Requires running API server and admin token"]
async fn test_get_auto_creates_defaults_once() {
    let first = get_settings().await;
    let second = get_settings().await;

    // Same document, not a fresh one per read
    assert_eq!(first["id"], second["id"]);
    assert_eq!(first["currencies"]["hearts"]["max_hearts"], 5);
}

#[tokio::test]
#[ignore = "Requires running API server and admin token"]
async fn test_secrets_are_masked_by_default() {
    // Store a provider key, then read with and without includeSecrets
    let current = get_settings().await;
    let version = current["version"].as_i64().expect("version");

    let resp = client()
        .patch(format!("{}?version={version}", settings_url()))
        .bearer_auth(admin_token())
        .json(&json!({
            "providers": {"stripe": {"enabled": true, "api_key": "pk_test_123", "secret_key": "sk_test_456"}}
        }))
        .send()
        .await
        .expect("patch failed");
    assert_eq!(resp.status(), StatusCode::OK);

    let masked = get_settings().await;
    assert_ne!(masked["providers"]["stripe"]["secret_key"], "sk_test_456");

    let resp = client()
        .get(format!("{}?includeSecrets=true", settings_url()))
        .bearer_auth(admin_token())
        .send()
        .await
        .expect("settings request failed");
    let body: Value = resp.json().await.expect("invalid json");
    assert_eq!(
        body["data"]["providers"]["stripe"]["secret_key"],
        "sk_test_456"
    );
}

#[tokio::test]
#[ignore = "Requires running API server and admin token"]
async fn test_patch_merges_currencies_one_level_deep() {
    let current = get_settings().await;
    let version = current["version"].as_i64().expect("version");
    let refill_cost = current["currencies"]["hearts"]["refill_cost_gems"].clone();

    let resp = client()
        .patch(format!("{}?version={version}", settings_url()))
        .bearer_auth(admin_token())
        .json(&json!({"currencies": {"hearts": {"max_hearts": 10}}}))
        .send()
        .await
        .expect("patch failed");
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.expect("invalid json");

    // The patched field changed; its siblings survived the merge
    assert_eq!(body["data"]["currencies"]["hearts"]["max_hearts"], 10);
    assert_eq!(
        body["data"]["currencies"]["hearts"]["refill_cost_gems"],
        refill_cost
    );
}

#[tokio::test]
#[ignore = "Requires running API server and admin token"]
async fn test_stale_version_write_is_409() {
    let current = get_settings().await;
    let version = current["version"].as_i64().expect("version");

    // First write bumps the version
    let resp = client()
        .patch(format!("{}?version={version}", settings_url()))
        .bearer_auth(admin_token())
        .json(&json!({"general": {"sandbox_mode": true}}))
        .send()
        .await
        .expect("patch failed");
    assert_eq!(resp.status(), StatusCode::OK);

    // Replaying against the stale version must be refused
    let resp = client()
        .patch(format!("{}?version={version}", settings_url()))
        .bearer_auth(admin_token())
        .json(&json!({"general": {"sandbox_mode": false}}))
        .send()
        .await
        .expect("patch failed");
    assert_eq!(resp.status(), StatusCode::CONFLICT);
}

#[tokio::test]
#[ignore = "Requires running API server and admin token"]
async fn test_post_with_active_document_is_409() {
    // GET guarantees an active document exists
    let _ = get_settings().await;

    let resp = client()
        .post(settings_url())
        .bearer_auth(admin_token())
        .json(&json!({"tab": "general", "data": {"sandbox_mode": true}}))
        .send()
        .await
        .expect("post failed");
    assert_eq!(resp.status(), StatusCode::CONFLICT);
}

#[tokio::test]
#[ignore = "Requires running API server and admin token"]
async fn test_unknown_section_is_400() {
    let current = get_settings().await;
    let version = current["version"].as_i64().expect("version");

    let resp = client()
        .patch(format!("{}?version={version}", settings_url()))
        .bearer_auth(admin_token())
        .json(&json!({"payments": {"enabled": true}}))
        .send()
        .await
        .expect("patch failed");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore = "Requires running API server and admin token"]
async fn test_settings_require_admin_role() {
    let resp = client()
        .get(settings_url())
        .bearer_auth(user_token())
        .send()
        .await
        .expect("settings request failed");
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}
