#![allow(dead_code)]

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use serde_json::{json, Value};
use sqlx::SqlitePool;
use tempfile::TempDir;
use tower::util::ServiceExt;

use ticket_gate::config::Config;
use ticket_gate::db;
use ticket_gate::notify::ExecLogNotifier;
use ticket_gate::routes::create_routes;
use ticket_gate::state::AppState;

pub const ADMIN_USER: &str = "admin";
pub const ADMIN_PASSWORD: &str = "changeme";

pub struct TestContext {
    pub temp_dir: TempDir,
    pub pool: SqlitePool,
    pub app: axum::Router,
}

pub async fn build_test_context() -> TestContext {
    let temp_dir = tempfile::tempdir().expect("temp dir");
    let pool = db::connect_memory().await.expect("in-memory pool");
    build_with_pool(temp_dir, pool).await
}

pub async fn build_with_pool(temp_dir: TempDir, pool: SqlitePool) -> TestContext {
    // low bcrypt cost keeps the suite fast; verification is cost-agnostic
    let hash = bcrypt::hash(ADMIN_PASSWORD, 4).expect("hash");
    db::admins::insert(&pool, ADMIN_USER, &hash)
        .await
        .expect("seed admin");

    let config = Config {
        secret_key: "test-secret".to_string(),
        notify_log_dir: temp_dir.path().join("log"),
        ..Config::default()
    };
    let notifier = Arc::new(ExecLogNotifier::new(&config.notify_log_dir));
    let app = create_routes(AppState::new(pool.clone(), config, notifier));

    TestContext {
        temp_dir,
        pool,
        app,
    }
}

pub async fn request(
    app: &axum::Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {token}"));
    }
    let req_body = match body {
        Some(body) => {
            builder = builder.header("Content-Type", "application/json");
            Body::from(body.to_string())
        }
        None => Body::empty(),
    };
    let req = builder.body(req_body).expect("request should build");

    let resp = app
        .clone()
        .oneshot(req)
        .await
        .expect("request should be handled");
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("body should read");
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice::<Value>(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).to_string()))
    };
    (status, json)
}

pub async fn login(app: &axum::Router) -> String {
    let (status, body) = request(
        app,
        "POST",
        "/auth/login",
        None,
        Some(json!({"username": ADMIN_USER, "password": ADMIN_PASSWORD})),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login failed: {body}");
    body["data"]["token"]
        .as_str()
        .expect("token in login response")
        .to_string()
}

pub async fn create_profile(app: &axum::Router, token: &str, name: &str) -> i64 {
    let (status, body) = request(
        app,
        "POST",
        "/profiles",
        Some(token),
        Some(json!({"name": name})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "create profile failed: {body}");
    body["data"]["id"].as_i64().expect("profile id")
}

/// Issues a ticket and returns its lock code.
pub async fn issue_ticket(app: &axum::Router, token: &str, profile_id: i64, length: i64) -> String {
    let (status, body) = request(
        app,
        "POST",
        &format!("/profiles/{profile_id}/tickets"),
        Some(token),
        Some(json!({"length": length})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "issue ticket failed: {body}");
    body["data"]["lock_code"]
        .as_str()
        .expect("lock code")
        .to_string()
}

pub fn assert_err(body: &Value, code: &str) {
    assert_eq!(body["success"], json!(false), "expected error envelope: {body}");
    assert_eq!(body["error"]["code"], json!(code), "unexpected error: {body}");
}
