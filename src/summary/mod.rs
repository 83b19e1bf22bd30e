//! Weekly expense aggregation.
//!
//! Buckets a user's expenses into the Monday..Sunday week containing a
//! reference date and folds them into per-category totals. The reference
//! date is always passed in; nothing here reads the clock.

use std::collections::BTreeMap;

use chrono::{Datelike, Duration, NaiveDate};
use rust_decimal::Decimal;

use crate::database::models::Expense;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryTotal {
    pub category: String,
    pub amount: Decimal,
}

#[derive(Debug, Clone)]
pub struct WeekSummary {
    /// Cumulative amount per category, keys in lexicographic order.
    pub categories: BTreeMap<String, Decimal>,
    pub total: Decimal,
    pub top: CategoryTotal,
    pub expense_count: usize,
}

/// Monday through Sunday (inclusive) of the week containing `reference`.
pub fn week_bounds(reference: NaiveDate) -> (NaiveDate, NaiveDate) {
    let monday = reference - Duration::days(reference.weekday().num_days_from_monday() as i64);
    (monday, monday + Duration::days(6))
}

/// Fold the expenses whose week_date falls inside the reference week.
///
/// Returns `None` when no expense lands in the week, which callers report
/// differently from a summary with zero-amount categories. The highest
/// category breaks ties by lexicographically smallest name: the map
/// iterates keys in ascending order and the running maximum is only
/// replaced on a strictly greater amount.
pub fn summarize(expenses: &[Expense], reference: NaiveDate) -> Option<WeekSummary> {
    let (start, end) = week_bounds(reference);

    let mut categories: BTreeMap<String, Decimal> = BTreeMap::new();
    let mut expense_count = 0;
    for expense in expenses
        .iter()
        .filter(|e| e.week_date >= start && e.week_date <= end)
    {
        *categories.entry(expense.category.clone()).or_insert(Decimal::ZERO) += expense.amount;
        expense_count += 1;
    }

    if expense_count == 0 {
        return None;
    }

    let total: Decimal = categories.values().copied().sum();

    let mut top: Option<CategoryTotal> = None;
    for (category, &amount) in &categories {
        if top.as_ref().is_none_or(|t| amount > t.amount) {
            top = Some(CategoryTotal {
                category: category.clone(),
                amount,
            });
        }
    }

    Some(WeekSummary {
        categories,
        total,
        top: top?,
        expense_count,
    })
}
