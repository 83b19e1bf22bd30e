// src/backend/handlers.rs
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth;
use crate::backend::AppState;
use crate::database::db::queries;
use crate::database::models::UserDto;
use crate::error::ApiError;
use crate::summary;

// Each handler validates field presence first, does at most one existence
// check, then performs its single store operation. Store failures carry
// their cause string into the 500 body.

#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AddExpenseRequest {
    pub username: Option<String>,
    pub category: Option<String>,
    pub amount: Option<Decimal>,
    pub week_date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateExpenseRequest {
    pub category: Option<String>,
    pub amount: Option<Decimal>,
    pub week_date: Option<NaiveDate>,
}

// Empty strings count as missing, like any other absent credential.
fn require_credentials(req: CredentialsRequest) -> Result<(String, String), ApiError> {
    match (req.username, req.password) {
        (Some(u), Some(p)) if !u.is_empty() && !p.is_empty() => Ok((u, p)),
        _ => Err(ApiError::BadRequest(
            "Username and password are required".to_string(),
        )),
    }
}

async fn require_user(state: &AppState, username: &str) -> Result<(), ApiError> {
    queries::get_user_by_username(&state.db, username)
        .await
        .map_err(|e| ApiError::store("Database error", e))?
        .map(|_| ())
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))
}

pub async fn signup(
    State(state): State<AppState>,
    Json(payload): Json<CredentialsRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let (username, password) = require_credentials(payload)?;

    let existing = queries::get_user_by_username(&state.db, &username)
        .await
        .map_err(|e| ApiError::store("Database error", e))?;
    if existing.is_some() {
        return Err(ApiError::Conflict);
    }

    let digest = auth::hash_password(&password).map_err(ApiError::Hash)?;

    // A concurrent signup that slips past the lookup above loses on the
    // UNIQUE constraint and still comes back as a 409.
    queries::create_user(&state.db, &username, &digest)
        .await
        .map_err(|e| ApiError::store("Database error", e))?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "User created successfully" })),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<CredentialsRequest>,
) -> Result<Json<Value>, ApiError> {
    let (username, password) = require_credentials(payload)?;

    // Unknown username and wrong password both map to the same 401.
    let user = queries::get_user_by_username(&state.db, &username)
        .await
        .map_err(|e| ApiError::store("Database error", e))?
        .ok_or(ApiError::Unauthorized)?;

    if !auth::verify_password(&user.password_hash, &password) {
        return Err(ApiError::Unauthorized);
    }

    Ok(Json(json!({
        "message": "Login successful",
        "user": UserDto::from(user),
    })))
}

pub async fn add_expense(
    State(state): State<AppState>,
    Json(payload): Json<AddExpenseRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let (Some(username), Some(category), Some(amount), Some(week_date)) = (
        payload.username,
        payload.category,
        payload.amount,
        payload.week_date,
    ) else {
        return Err(ApiError::BadRequest("Missing required fields".to_string()));
    };

    require_user(&state, &username).await?;

    let expense = queries::create_expense(&state.db, &username, &category, amount, week_date)
        .await
        .map_err(|e| ApiError::store("Failed to add expense", e))?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Expense added successfully",
            "expense": expense,
        })),
    ))
}

pub async fn get_expenses(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<Value>, ApiError> {
    require_user(&state, &username).await?;

    let expenses = queries::get_expenses_by_username(&state.db, &username)
        .await
        .map_err(|e| ApiError::store("Database error", e))?;
    let total_expenses = expenses.len();

    Ok(Json(json!({
        "username": username,
        "expenses": expenses,
        "total_expenses": total_expenses,
    })))
}

pub async fn weekly_summary(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<Value>, ApiError> {
    require_user(&state, &username).await?;

    let expenses = queries::get_expenses_by_username(&state.db, &username)
        .await
        .map_err(|e| ApiError::store("Database error", e))?;

    // The clock is read here at the edge; the aggregator itself only sees
    // the reference date.
    let today = Utc::now().date_naive();
    let (start, end) = summary::week_bounds(today);
    let period = format!("{} to {}", start, end);

    match summary::summarize(&expenses, today) {
        None => Ok(Json(json!({
            "username": username,
            "period": period,
            "message": "No expenses found for the current week.",
        }))),
        Some(week) => Ok(Json(json!({
            "username": username,
            "period": period,
            "category_summary": week.categories,
            "total_amount": week.total,
            "highest_category": {
                "category": week.top.category,
                "amount": week.top.amount,
            },
            "expense_count": week.expense_count,
        }))),
    }
}

pub async fn update_expense(
    State(state): State<AppState>,
    Path(expense_id): Path<i64>,
    Json(payload): Json<UpdateExpenseRequest>,
) -> Result<Json<Value>, ApiError> {
    let existing = queries::get_expense_by_id(&state.db, expense_id)
        .await
        .map_err(|e| ApiError::store("Database error", e))?
        .ok_or_else(|| ApiError::NotFound("Expense not found".to_string()))?;

    // Omitted fields keep their stored values.
    let category = payload.category.unwrap_or(existing.category);
    let amount = payload.amount.unwrap_or(existing.amount);
    let week_date = payload.week_date.unwrap_or(existing.week_date);

    queries::update_expense(&state.db, expense_id, &category, amount, week_date)
        .await
        .map_err(|e| ApiError::store("Failed to update expense", e))?;

    let expense = queries::get_expense_by_id(&state.db, expense_id)
        .await
        .map_err(|e| ApiError::store("Database error", e))?
        .ok_or_else(|| ApiError::NotFound("Expense not found".to_string()))?;

    Ok(Json(json!({
        "message": "Expense updated successfully",
        "expense": expense,
    })))
}

pub async fn delete_expense(
    State(state): State<AppState>,
    Path(expense_id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    let deleted = queries::delete_expense(&state.db, expense_id)
        .await
        .map_err(|e| ApiError::store("Failed to delete expense", e))?;

    if !deleted {
        return Err(ApiError::NotFound("Expense not found".to_string()));
    }

    Ok(Json(json!({ "message": "Expense deleted successfully" })))
}
