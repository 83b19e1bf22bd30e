use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

// Not FromRow: amount lives in SQLite as TEXT and is mapped by hand in
// the queries module.
#[derive(Debug, Clone, Serialize)]
pub struct Expense {
    pub id: i64,
    pub username: String,
    pub category: String,
    pub amount: Decimal,
    pub week_date: NaiveDate,
    pub created_at: String,
}
