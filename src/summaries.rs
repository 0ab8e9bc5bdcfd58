//! Derived spending aggregates.
//!
//! Recomputed from budget and expense state on demand, never stored. All
//! inputs pass through tolerant coercion at the boundaries, so every
//! aggregate here is a finite number.

use serde::Serialize;

use crate::models::{Budget, Expense};

/// Spending totals derived from the current state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Totals {
    pub total_spent: f64,
    pub remaining: f64,
    pub percent_used: f64,
}

/// Compute spending totals for a budget and expense collection.
///
/// `percent_used` is defined as 0 when there is no budget or the budget
/// amount is 0, so it never divides by zero.
pub fn summarize(budget: Option<&Budget>, expenses: &[Expense]) -> Totals {
    let total_spent: f64 = expenses.iter().map(|e| e.amount).sum();
    let budget_amount = budget.map(|b| b.amount).unwrap_or(0.0);
    let remaining = if budget.is_some() {
        budget_amount - total_spent
    } else {
        0.0
    };
    let percent_used = if budget_amount > 0.0 {
        total_spent / budget_amount * 100.0
    } else {
        0.0
    };
    Totals {
        total_spent,
        remaining,
        percent_used,
    }
}
