//! End-to-end tests for the HTTP API.
//!
//! Each test drives the real router over an in-memory SQLite store; only
//! the network listener is absent. A single-connection pool keeps every
//! request on the same in-memory database.

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use chrono::{Datelike, Duration, NaiveDate, Utc};
use serde_json::{json, Value};
use tower::ServiceExt;

use expense_tracker::backend::{app, AppState};
use expense_tracker::config::DatabaseConfig;
use expense_tracker::database::db::{connection, migrate};

async fn test_app() -> Router {
    let config = DatabaseConfig {
        url: "sqlite::memory:".to_string(),
        max_connections: 1,
    };
    let pool = connection::get_db_pool(&config)
        .await
        .expect("Failed to create pool");
    migrate::run_migrations(&pool)
        .await
        .expect("Failed to run migrations");
    app(AppState { db: pool })
}

async fn request(
    app: &Router,
    method: &str,
    path: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(path);
    let body = match body {
        Some(v) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(v.to_string())
        }
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

async fn signup(app: &Router, username: &str, password: &str) -> (StatusCode, Value) {
    request(
        app,
        "POST",
        "/api/signup",
        Some(json!({ "username": username, "password": password })),
    )
    .await
}

async fn add_expense(
    app: &Router,
    username: &str,
    category: &str,
    amount: f64,
    week_date: NaiveDate,
) -> (StatusCode, Value) {
    request(
        app,
        "POST",
        "/api/add_expense",
        Some(json!({
            "username": username,
            "category": category,
            "amount": amount,
            "week_date": week_date.format("%Y-%m-%d").to_string(),
        })),
    )
    .await
}

fn this_monday() -> NaiveDate {
    let today = Utc::now().date_naive();
    today - Duration::days(today.weekday().num_days_from_monday() as i64)
}

#[tokio::test]
async fn health_endpoint_responds() {
    let app = test_app().await;
    let (status, _) = request(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn signup_rejects_duplicates() {
    let app = test_app().await;

    let (status, body) = signup(&app, "alice", "secret").await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "User created successfully");

    let (status, body) = signup(&app, "alice", "other-password").await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "Username already exists");
}

#[tokio::test]
async fn signup_requires_both_fields() {
    let app = test_app().await;

    let (status, body) = request(
        &app,
        "POST",
        "/api/signup",
        Some(json!({ "username": "alice" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Username and password are required");

    // An empty string counts as missing
    let (status, _) = request(
        &app,
        "POST",
        "/api/signup",
        Some(json!({ "username": "alice", "password": "" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn login_checks_credentials() {
    let app = test_app().await;
    signup(&app, "alice", "secret").await;

    let (status, body) = request(
        &app,
        "POST",
        "/api/login",
        Some(json!({ "username": "alice", "password": "secret" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Login successful");
    assert_eq!(body["user"]["username"], "alice");
    assert!(body["user"]["id"].is_i64());
    assert!(body["user"]["created_at"].is_string());
    // The digest must never appear on the wire
    assert!(body["user"].get("password").is_none());
    assert!(body["user"].get("password_hash").is_none());

    let (status, body) = request(
        &app,
        "POST",
        "/api/login",
        Some(json!({ "username": "alice", "password": "wrong" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid username or password");

    // Unknown usernames get the same answer as wrong passwords
    let (status, _) = request(
        &app,
        "POST",
        "/api/login",
        Some(json!({ "username": "nobody", "password": "secret" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn add_expense_requires_known_user() {
    let app = test_app().await;

    let (status, body) = add_expense(&app, "ghost", "food", 5.00, this_monday()).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "User not found");
}

#[tokio::test]
async fn add_expense_requires_all_fields() {
    let app = test_app().await;
    signup(&app, "alice", "secret").await;

    let (status, body) = request(
        &app,
        "POST",
        "/api/add_expense",
        Some(json!({ "username": "alice", "category": "food" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Missing required fields");
}

#[tokio::test]
async fn add_expense_returns_created_row() {
    let app = test_app().await;
    signup(&app, "alice", "secret").await;

    let monday = this_monday();
    let (status, body) = add_expense(&app, "alice", "food", 12.50, monday).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Expense added successfully");

    let expense = &body["expense"];
    assert!(expense["id"].as_i64().unwrap() > 0);
    assert_eq!(expense["username"], "alice");
    assert_eq!(expense["category"], "food");
    assert_eq!(expense["amount"].as_f64().unwrap(), 12.50);
    assert_eq!(expense["week_date"], monday.format("%Y-%m-%d").to_string());
    assert!(expense["created_at"].is_string());
}

#[tokio::test]
async fn get_expenses_is_sorted_newest_week_first() {
    let app = test_app().await;
    signup(&app, "alice", "secret").await;

    let d = |s: &str| NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap();
    add_expense(&app, "alice", "food", 10.00, d("2024-01-08")).await;
    add_expense(&app, "alice", "rent", 500.00, d("2024-01-22")).await;
    add_expense(&app, "alice", "transport", 3.00, d("2024-01-15")).await;

    let (status, body) = request(&app, "GET", "/api/get_expenses/alice", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["username"], "alice");
    assert_eq!(body["total_expenses"], 3);

    let weeks: Vec<&str> = body["expenses"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["week_date"].as_str().unwrap())
        .collect();
    assert_eq!(weeks, vec!["2024-01-22", "2024-01-15", "2024-01-08"]);
}

#[tokio::test]
async fn get_expenses_unknown_user_is_404() {
    let app = test_app().await;
    let (status, body) = request(&app, "GET", "/api/get_expenses/ghost", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "User not found");
}

#[tokio::test]
async fn weekly_summary_aggregates_current_week() {
    let app = test_app().await;
    signup(&app, "alice", "secret").await;

    let monday = this_monday();
    add_expense(&app, "alice", "food", 12.50, monday).await;
    add_expense(&app, "alice", "food", 7.50, monday).await;
    // Outside the current week, must not count
    add_expense(&app, "alice", "food", 99.00, monday - Duration::days(7)).await;

    let (status, body) = request(&app, "GET", "/api/weekly_summary/alice", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["username"], "alice");
    assert_eq!(body["expense_count"], 2);
    assert_eq!(body["category_summary"]["food"].as_f64().unwrap(), 20.0);
    assert_eq!(body["total_amount"].as_f64().unwrap(), 20.0);
    assert_eq!(body["highest_category"]["category"], "food");
    assert_eq!(body["highest_category"]["amount"].as_f64().unwrap(), 20.0);

    let sunday = monday + Duration::days(6);
    assert_eq!(body["period"], format!("{} to {}", monday, sunday));
}

#[tokio::test]
async fn weekly_summary_reports_empty_week() {
    let app = test_app().await;
    signup(&app, "alice", "secret").await;
    add_expense(&app, "alice", "food", 10.00, this_monday() - Duration::days(30)).await;

    let (status, body) = request(&app, "GET", "/api/weekly_summary/alice", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "No expenses found for the current week.");
    assert!(body.get("category_summary").is_none());
}

#[tokio::test]
async fn weekly_summary_unknown_user_is_404() {
    let app = test_app().await;
    let (status, _) = request(&app, "GET", "/api/weekly_summary/ghost", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn update_expense_keeps_omitted_fields() {
    let app = test_app().await;
    signup(&app, "alice", "secret").await;

    let monday = this_monday();
    let (_, body) = add_expense(&app, "alice", "food", 12.50, monday).await;
    let id = body["expense"]["id"].as_i64().unwrap();

    let (status, body) = request(
        &app,
        "PUT",
        &format!("/api/expenses/{}", id),
        Some(json!({ "amount": 99.25 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Expense updated successfully");
    assert_eq!(body["expense"]["amount"].as_f64().unwrap(), 99.25);
    assert_eq!(body["expense"]["category"], "food");
    assert_eq!(
        body["expense"]["week_date"],
        monday.format("%Y-%m-%d").to_string()
    );

    // An empty patch changes nothing
    let (status, body) = request(
        &app,
        "PUT",
        &format!("/api/expenses/{}", id),
        Some(json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["expense"]["amount"].as_f64().unwrap(), 99.25);
    assert_eq!(body["expense"]["category"], "food");
}

#[tokio::test]
async fn update_unknown_expense_is_404() {
    let app = test_app().await;
    let (status, body) = request(
        &app,
        "PUT",
        "/api/expenses/12345",
        Some(json!({ "amount": 1.00 })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Expense not found");
}

#[tokio::test]
async fn delete_expense_then_gone() {
    let app = test_app().await;
    signup(&app, "alice", "secret").await;

    let (_, body) = add_expense(&app, "alice", "food", 12.50, this_monday()).await;
    let id = body["expense"]["id"].as_i64().unwrap();
    let path = format!("/api/expenses/{}", id);

    let (status, body) = request(&app, "DELETE", &path, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Expense deleted successfully");

    let (status, _) = request(&app, "DELETE", &path, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = request(&app, "PUT", &path, Some(json!({ "amount": 1.00 }))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, body) = request(&app, "GET", "/api/get_expenses/alice", None).await;
    assert_eq!(body["total_expenses"], 0);
}
