//! End-to-end tests over the real route table, backed by an in-memory
//! database. No network: the provider proxy paths are only exercised up to
//! their fail-fast configuration checks.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use dialdesk_api::auth::{AppState, AppStateInner};

const WEBHOOK_KEY: &str = "test-webhook-key";

fn test_app() -> Router {
    let state: AppState = Arc::new(AppStateInner {
        db: dialdesk_db::Database::open_in_memory().expect("in-memory db"),
        vapi_private_key: None,
        webhook_key: Some(WEBHOOK_KEY.into()),
        identity: None,
    });

    dialdesk_api::router(state)
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }

    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };

    (status, value)
}

async fn signup(app: &Router, username: &str) -> String {
    let (status, body) = send(
        app,
        "POST",
        "/api/auth/signup",
        None,
        Some(json!({ "username": username, "password": "hunter2hunter2" })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    body["token"].as_str().expect("token in signup response").to_string()
}

async fn log_call(app: &Router, key: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri("/api/logCall")
        .header(header::CONTENT_TYPE, "application/json")
        .header("x-api-key", key)
        .body(Body::from(body.to_string()))
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn signup_succeeds_once_then_conflicts() {
    let app = test_app();

    let (status, body) = send(
        &app,
        "POST",
        "/api/auth/signup",
        None,
        Some(json!({ "username": "alice", "password": "hunter2hunter2" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["user"]["username"], "alice");
    assert_eq!(body["token"].as_str().unwrap().len(), 96);

    let (status, body) = send(
        &app,
        "POST",
        "/api/auth/signup",
        None,
        Some(json!({ "username": "alice", "password": "hunter2hunter2" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Username already exists");
}

#[tokio::test]
async fn signup_validates_input() {
    let app = test_app();

    let (status, _) = send(
        &app,
        "POST",
        "/api/auth/signup",
        None,
        Some(json!({ "username": "al", "password": "hunter2hunter2" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        "POST",
        "/api/auth/signup",
        None,
        Some(json!({ "username": "alice", "password": "short" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn login_rejects_bad_credentials() {
    let app = test_app();
    signup(&app, "alice").await;

    let (status, _) = send(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "username": "alice", "password": "wrong-password" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "username": "nobody", "password": "hunter2hunter2" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "username": "alice", "password": "hunter2hunter2" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["token"].as_str().is_some());
}

#[tokio::test]
async fn protected_routes_require_a_valid_session() {
    let app = test_app();

    let (status, _) = send(&app, "GET", "/api/stats", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, "GET", "/api/stats", Some("not-a-real-token"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let token = signup(&app, "alice").await;
    let (status, _) = send(&app, "GET", "/api/stats", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn bearer_prefix_is_optional() {
    let app = test_app();
    let token = signup(&app, "alice").await;

    let request = Request::builder()
        .method("GET")
        .uri("/api/calls")
        .header(header::AUTHORIZATION, token)
        .body(Body::empty())
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn logout_invalidates_the_token() {
    let app = test_app();
    let token = signup(&app, "alice").await;

    let (status, _) = send(&app, "GET", "/api/calls", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, "POST", "/api/auth/logout", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], true);

    let (status, _) = send(&app, "GET", "/api/calls", Some(&token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn settings_start_empty_and_merge_per_field() {
    let app = test_app();
    let token = signup(&app, "alice").await;

    let (status, body) = send(&app, "GET", "/api/settings", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({}));

    let (status, body) = send(
        &app,
        "PUT",
        "/api/settings",
        Some(&token),
        Some(json!({ "assistantId": "asst-1" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["assistantId"], "asst-1");

    // Updating another field leaves assistantId untouched.
    let (status, body) = send(
        &app,
        "PUT",
        "/api/settings",
        Some(&token),
        Some(json!({ "phoneNumberId": "pn-1" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["assistantId"], "asst-1");
    assert_eq!(body["phoneNumberId"], "pn-1");

    let (_, body) = send(&app, "GET", "/api/settings", Some(&token), None).await;
    assert_eq!(body["assistantId"], "asst-1");
    assert_eq!(body["phoneNumberId"], "pn-1");
}

#[tokio::test]
async fn webhook_rejects_bad_keys_and_bad_payloads() {
    let app = test_app();

    let (status, body) = log_call(
        &app,
        WEBHOOK_KEY,
        json!({ "name": "Jane", "status": "completed" }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(body["callId"].as_str().is_some());

    let (status, _) = log_call(
        &app,
        "wrong-key",
        json!({ "name": "Jane", "status": "completed" }),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = log_call(&app, WEBHOOK_KEY, json!({ "name": "", "status": "completed" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn stats_aggregate_the_logged_calls() {
    let app = test_app();
    let token = signup(&app, "alice").await;

    for (name, status) in [
        ("a", "completed"),
        ("b", "completed"),
        ("c", "pending"),
        ("d", "failed"),
        ("e", "voicemail"),
    ] {
        let (code, _) = log_call(&app, WEBHOOK_KEY, json!({ "name": name, "status": status })).await;
        assert_eq!(code, StatusCode::CREATED);
    }

    let (status, body) = send(&app, "GET", "/api/stats", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["totalCalls"], 5);
    assert_eq!(body["completedCalls"], 2);
    assert_eq!(body["pendingCalls"], 1);
    assert_eq!(body["failedCalls"], 1);
    assert_eq!(body["successRate"], 40);

    let (status, body) = send(&app, "GET", "/api/calls", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 5);
    // Newest first.
    assert_eq!(body[0]["name"], "e");

    let (status, body) = send(&app, "GET", "/api/calls/search?q=a", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|call| call["name"].as_str().unwrap())
        .collect();
    assert!(names.contains(&"a"));
    assert!(!names.contains(&"b"));
}

#[tokio::test]
async fn empty_stats_have_zero_success_rate() {
    let app = test_app();
    let token = signup(&app, "alice").await;

    let (status, body) = send(&app, "GET", "/api/stats", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["totalCalls"], 0);
    assert_eq!(body["successRate"], 0);
}

#[tokio::test]
async fn provider_proxy_fails_fast_without_a_key() {
    let app = test_app();
    let token = signup(&app, "alice").await;

    let (status, body) = send(&app, "GET", "/api/vapi/calls", Some(&token), None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["message"].as_str().unwrap().contains("private key"));
}

#[tokio::test]
async fn assistant_lookup_without_any_id_is_a_config_error() {
    let app = test_app();
    let token = signup(&app, "alice").await;

    let (status, body) = send(&app, "GET", "/api/vapi/assistant", Some(&token), None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["message"].as_str().unwrap().contains("assistant id"));
}

#[tokio::test]
async fn google_login_without_configuration_is_rejected() {
    let app = test_app();

    let (status, body) = send(
        &app,
        "POST",
        "/api/auth/google",
        None,
        Some(json!({ "idToken": "irrelevant" })),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["message"].as_str().unwrap().contains("not configured"));
}
