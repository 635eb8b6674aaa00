//! Integration tests for the shop checkout flow.
//!
//! These tests require:
//! - A running `PostgreSQL` database with migrations + seed applied
//! - The API server running (cargo run -p chirp-api)
//! - `CHIRP_TEST_TOKEN` set to a user with a fresh default balance
//!
//! Run with: cargo test -p chirp-integration-tests -- --ignored

use reqwest::StatusCode;
use serde_json::{Value, json};
use uuid::Uuid;

use chirp_integration_tests::{base_url, client, user_token};

fn checkout_body(item_id: &str, quantity: i32, key: Uuid) -> Value {
    json!({
        "item_id": item_id,
        "quantity": quantity,
        "platform": "web",
        "device_type": "desktop",
        "idempotency_key": key,
    })
}

/// Fetch the test user's profile data.
async fn profile() -> Value {
    let resp = client()
        .get(format!("{}/api/users/profile", base_url()))
        .bearer_auth(user_token())
        .send()
        .await
        .expect("profile request failed");
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.expect("invalid json");
    body["data"].clone()
}

async fn balances() -> (i64, i64) {
    let data = profile().await;
    (
        data["gems"].as_i64().expect("gems"),
        data["hearts"].as_i64().expect("hearts"),
    )
}

/// Adjust the test user's hearts, ignoring failures (e.g. already at a bound).
async fn nudge_hearts(action: &str, amount: i64) {
    let user_id = profile().await["id"].as_i64().expect("id");
    let _ = client()
        .put(format!(
            "{}/api/users/{user_id}/hearts?action={action}",
            base_url()
        ))
        .bearer_auth(user_token())
        .json(&json!({"amount": amount}))
        .send()
        .await;
}

#[tokio::test]
#[ignore = "Requires running API server and seeded database"]
async fn test_heart_refill_debits_gems_and_credits_hearts() {
    // Make room for one heart first
    nudge_hearts("dec", 1).await;
    let (gems_before, hearts_before) = balances().await;

    let resp = client()
        .post(format!("{}/api/shop/checkout", base_url()))
        .bearer_auth(user_token())
        .json(&checkout_body("heart-refill", 1, Uuid::new_v4()))
        .send()
        .await
        .expect("checkout request failed");

    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = resp.json().await.expect("invalid json");
    assert_eq!(body["success"], true);
    assert_eq!(
        body["data"]["gems"].as_i64().expect("gems"),
        gems_before - 500
    );
    assert_eq!(
        body["data"]["hearts"].as_i64().expect("hearts"),
        hearts_before + 1
    );
    assert_eq!(body["data"]["purchase"]["item_id"], "heart-refill");
}

#[tokio::test]
#[ignore = "Requires running API server and seeded database"]
async fn test_checkout_replay_applies_once() {
    let key = Uuid::new_v4();

    let first = client()
        .post(format!("{}/api/shop/checkout", base_url()))
        .bearer_auth(user_token())
        .json(&checkout_body("streak-freeze", 1, key))
        .send()
        .await
        .expect("first checkout failed");
    assert_eq!(first.status(), StatusCode::CREATED);
    let first_body: Value = first.json().await.expect("invalid json");

    let (gems_after_first, _) = balances().await;

    let replay = client()
        .post(format!("{}/api/shop/checkout", base_url()))
        .bearer_auth(user_token())
        .json(&checkout_body("streak-freeze", 1, key))
        .send()
        .await
        .expect("replay checkout failed");
    assert_eq!(replay.status(), StatusCode::OK);
    let replay_body: Value = replay.json().await.expect("invalid json");

    // Same purchase, no second debit
    assert_eq!(
        replay_body["data"]["purchase"]["id"],
        first_body["data"]["purchase"]["id"]
    );
    let (gems_after_replay, _) = balances().await;
    assert_eq!(gems_after_first, gems_after_replay);
}

#[tokio::test]
#[ignore = "Requires running API server and seeded database"]
async fn test_checkout_with_full_hearts_is_rejected() {
    // Refill to the cap first
    nudge_hearts("inc", 10).await;
    let (gems_before, _) = balances().await;

    let resp = client()
        .post(format!("{}/api/shop/checkout", base_url()))
        .bearer_auth(user_token())
        .json(&checkout_body("heart-refill", 1, Uuid::new_v4()))
        .send()
        .await
        .expect("checkout request failed");

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.expect("invalid json");
    assert_eq!(body["success"], false);

    // No balance mutation happened
    let (gems_after, _) = balances().await;
    assert_eq!(gems_before, gems_after);
}

#[tokio::test]
#[ignore = "Requires running API server and seeded database"]
async fn test_checkout_unknown_item_is_404() {
    let resp = client()
        .post(format!("{}/api/shop/checkout", base_url()))
        .bearer_auth(user_token())
        .json(&checkout_body("no-such-item", 1, Uuid::new_v4()))
        .send()
        .await
        .expect("checkout request failed");

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "Requires running API server and seeded database"]
async fn test_checkout_requires_auth() {
    let resp = client()
        .post(format!("{}/api/shop/checkout", base_url()))
        .json(&checkout_body("heart-refill", 1, Uuid::new_v4()))
        .send()
        .await
        .expect("checkout request failed");

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}
