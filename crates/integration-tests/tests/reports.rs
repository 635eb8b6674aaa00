//! Integration tests for report submission and triage.
//!
//! These tests require:
//! - A running `PostgreSQL` database with migrations applied
//! - The API server running with SMTP configured (reports need mail)
//! - `CHIRP_TEST_TOKEN` and `CHIRP_TEST_ADMIN_TOKEN` set
//!
//! Run with: cargo test -p chirp-integration-tests -- --ignored

use reqwest::StatusCode;
use serde_json::{Value, json};
use uuid::Uuid;

use chirp_integration_tests::{admin_token, base_url, client, user_token};

fn reports_url() -> String {
    format!("{}/api/reports", base_url())
}

async fn submit(body: &Value) -> reqwest::Response {
    client()
        .post(reports_url())
        .bearer_auth(user_token())
        .json(body)
        .send()
        .await
        .expect("report request failed")
}

#[tokio::test]
#[ignore = "Requires running API server with SMTP configured"]
async fn test_audio_report_is_triaged_medium() {
    let resp = submit(&json!({
        "exercise_id": Uuid::new_v4().to_string(),
        "reasons": ["Audio quality poor"],
        "title": "Recording is garbled",
        "description": "The playback cuts off halfway through.",
    }))
    .await;

    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = resp.json().await.expect("invalid json");
    assert_eq!(body["data"]["report_type"], "audio_issue");
    assert_eq!(body["data"]["priority"], "medium");
    assert_eq!(body["data"]["status"], "open");
}

#[tokio::test]
#[ignore = "Requires running API server with SMTP configured"]
async fn test_duplicate_report_is_409_with_existing_id() {
    let exercise_id = Uuid::new_v4().to_string();
    let body = json!({
        "exercise_id": exercise_id,
        "reasons": ["Translation is wrong"],
        "title": "Wrong answer marked correct",
        "description": "",
    });

    let first = submit(&body).await;
    assert_eq!(first.status(), StatusCode::CREATED);
    let first_body: Value = first.json().await.expect("invalid json");
    let first_id = first_body["data"]["id"].as_i64().expect("id");

    let second = submit(&body).await;
    assert_eq!(second.status(), StatusCode::CONFLICT);
    let second_body: Value = second.json().await.expect("invalid json");
    assert_eq!(second_body["success"], false);
    assert!(
        second_body["error"]
            .as_str()
            .expect("error")
            .contains(&first_id.to_string()),
        "conflict message should reference the existing report id"
    );
}

#[tokio::test]
#[ignore = "Requires running API server with SMTP configured"]
async fn test_empty_reasons_are_rejected() {
    let resp = submit(&json!({
        "reasons": [],
        "title": "No reasons",
        "description": "",
    }))
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore = "Requires running API server"]
async fn test_users_see_only_their_own_reports() {
    let resp = client()
        .get(reports_url())
        .bearer_auth(user_token())
        .send()
        .await
        .expect("list request failed");
    assert_eq!(resp.status(), StatusCode::OK);
    // Shape check only; ownership is enforced server-side
    let body: Value = resp.json().await.expect("invalid json");
    assert!(body["data"].is_array());
}

#[tokio::test]
#[ignore = "Requires running API server and admin token"]
async fn test_stats_require_admin() {
    let resp = client()
        .get(format!("{}/stats", reports_url()))
        .bearer_auth(user_token())
        .send()
        .await
        .expect("stats request failed");
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let resp = client()
        .get(format!("{}/stats", reports_url()))
        .bearer_auth(admin_token())
        .send()
        .await
        .expect("stats request failed");
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.expect("invalid json");
    assert!(body["data"]["total"].is_i64());
}
