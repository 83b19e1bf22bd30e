use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use sqlx::{Pool, Sqlite};
use std::str::FromStr;

use crate::database::models::{Expense, User};

/*
This file contains the specific SQL query,
CRUD (Create, Read, Update, Delete) logic
and is responsible for interacting with the database.
 */

// Amounts are stored as TEXT and parsed back into Decimal; timestamps are
// written by SQLite itself so every row carries a UTC instant.

fn expense_from_row(row: &SqliteRow) -> Result<Expense, sqlx::Error> {
    let amount_text: String = row.try_get("amount")?;
    let amount = Decimal::from_str(&amount_text)
        .map_err(|e| sqlx::Error::Decode(format!("Invalid Decimal format for amount: {}", e).into()))?;

    Ok(Expense {
        id: row.try_get("id")?,
        username: row.try_get("username")?,
        category: row.try_get("category")?,
        amount,
        week_date: row.try_get("week_date")?,
        created_at: row.try_get("created_at")?,
    })
}

/*==========User Queries=========== */

// Create user. The UNIQUE constraint on username is what rejects the loser
// of a concurrent signup race.
pub async fn create_user(
    pool: &Pool<Sqlite>,
    username: &str,
    password_hash: &str,
) -> Result<i64, sqlx::Error> {
    let row = sqlx::query(
        r#"
        INSERT INTO users (username, password_hash, created_at)
        VALUES (?, ?, strftime('%Y-%m-%dT%H:%M:%SZ','now'))
        RETURNING id
        "#,
    )
    .bind(username)
    .bind(password_hash)
    .fetch_one(pool)
    .await?;

    row.try_get("id")
}

// Get user by username
pub async fn get_user_by_username(
    pool: &Pool<Sqlite>,
    username: &str,
) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(
        r#"
        SELECT id, username, password_hash, created_at
        FROM users
        WHERE username = ?
        "#,
    )
    .bind(username)
    .fetch_optional(pool)
    .await
}

/*==========Expense Queries=========== */

// Create expense
pub async fn create_expense(
    pool: &Pool<Sqlite>,
    username: &str,
    category: &str,
    amount: Decimal,
    week_date: NaiveDate,
) -> Result<Expense, sqlx::Error> {
    let amount_str = amount.round_dp(2).to_string();

    let row = sqlx::query(
        r#"
        INSERT INTO expenses (username, category, amount, week_date, created_at)
        VALUES (?, ?, ?, ?, strftime('%Y-%m-%dT%H:%M:%SZ','now'))
        RETURNING id, username, category, amount, week_date, created_at
        "#,
    )
    .bind(username)
    .bind(category)
    .bind(amount_str)
    .bind(week_date)
    .fetch_one(pool)
    .await?;

    expense_from_row(&row)
}

// Get expense by id
pub async fn get_expense_by_id(
    pool: &Pool<Sqlite>,
    expense_id: i64,
) -> Result<Option<Expense>, sqlx::Error> {
    let row = sqlx::query(
        r#"
        SELECT id, username, category, amount, week_date, created_at
        FROM expenses
        WHERE id = ?
        "#,
    )
    .bind(expense_id)
    .fetch_optional(pool)
    .await?;

    row.as_ref().map(expense_from_row).transpose()
}

// Get all expenses of a user, newest week first
pub async fn get_expenses_by_username(
    pool: &Pool<Sqlite>,
    username: &str,
) -> Result<Vec<Expense>, sqlx::Error> {
    sqlx::query(
        r#"
        SELECT id, username, category, amount, week_date, created_at
        FROM expenses
        WHERE username = ?
        ORDER BY week_date DESC
        "#,
    )
    .bind(username)
    .fetch_all(pool)
    .await?
    .iter()
    .map(expense_from_row)
    .collect::<Result<Vec<Expense>, sqlx::Error>>()
}

// Update expense. The handler merges partial input into a full row first,
// so this writes all three mutable columns in one statement.
pub async fn update_expense(
    pool: &Pool<Sqlite>,
    expense_id: i64,
    category: &str,
    amount: Decimal,
    week_date: NaiveDate,
) -> Result<bool, sqlx::Error> {
    let amount_str = amount.round_dp(2).to_string();

    let result = sqlx::query(
        r#"
        UPDATE expenses
        SET category = ?, amount = ?, week_date = ?
        WHERE id = ?
        "#,
    )
    .bind(category)
    .bind(amount_str)
    .bind(week_date)
    .bind(expense_id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

// Delete expense
pub async fn delete_expense(pool: &Pool<Sqlite>, expense_id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        DELETE FROM expenses
        WHERE id = ?
        "#,
    )
    .bind(expense_id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}
