//! Integration tests for the raw currency mutation endpoints.
//!
//! These tests require:
//! - A running `PostgreSQL` database with migrations applied
//! - The API server running (cargo run -p chirp-api)
//! - `CHIRP_TEST_TOKEN` set
//!
//! Run with: cargo test -p chirp-integration-tests -- --ignored

use reqwest::StatusCode;
use serde_json::{Value, json};

use chirp_integration_tests::{base_url, client, user_token};

async fn my_user_id() -> i64 {
    let resp = client()
        .get(format!("{}/api/users/profile", base_url()))
        .bearer_auth(user_token())
        .send()
        .await
        .expect("profile request failed");
    let body: Value = resp.json().await.expect("invalid json");
    body["data"]["id"].as_i64().expect("id")
}

async fn put_balance(field: &str, action: &str, amount: i64) -> reqwest::Response {
    let user_id = my_user_id().await;
    client()
        .put(format!(
            "{}/api/users/{user_id}/{field}?action={action}",
            base_url()
        ))
        .bearer_auth(user_token())
        .json(&json!({"amount": amount}))
        .send()
        .await
        .expect("balance request failed")
}

#[tokio::test]
#[ignore = "Requires running API server"]
async fn test_gems_inc_then_dec_round_trips() {
    let resp = put_balance("gems", "inc", 100).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.expect("invalid json");
    let after_inc = body["data"]["gems"].as_i64().expect("gems");

    let resp = put_balance("gems", "dec", 100).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.expect("invalid json");
    assert_eq!(body["data"]["gems"].as_i64().expect("gems"), after_inc - 100);
}

#[tokio::test]
#[ignore = "Requires running API server"]
async fn test_gems_dec_below_zero_is_rejected() {
    let resp = put_balance("gems", "dec", 1_000_000_000).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.expect("invalid json");
    assert_eq!(body["success"], false);
}

#[tokio::test]
#[ignore = "Requires running API server"]
async fn test_hearts_inc_clamps_at_max() {
    let resp = put_balance("hearts", "inc", 100).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.expect("invalid json");
    let hearts = body["data"]["hearts"].as_i64().expect("hearts");

    // A second oversized increment leaves the balance at the cap
    let resp = put_balance("hearts", "inc", 100).await;
    let body: Value = resp.json().await.expect("invalid json");
    assert_eq!(body["data"]["hearts"].as_i64().expect("hearts"), hearts);
}

#[tokio::test]
#[ignore = "Requires running API server"]
async fn test_invalid_action_is_rejected() {
    let resp = put_balance("gems", "double", 10).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore = "Requires running API server"]
async fn test_non_positive_amount_is_rejected() {
    let resp = put_balance("gems", "inc", 0).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = put_balance("gems", "inc", -5).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore = "Requires running API server"]
async fn test_cannot_mutate_another_users_balance() {
    let resp = client()
        .put(format!("{}/api/users/999999/gems?action=inc", base_url()))
        .bearer_auth(user_token())
        .json(&json!({"amount": 10}))
        .send()
        .await
        .expect("balance request failed");
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}
