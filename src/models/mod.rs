//! Data models for budget and expense records.
//!
//! These types represent the tracker's domain data in a clean form,
//! shared between the local cache, the sync engine, and the Store client:
//!
//! - `Budget`, `BudgetDraft`: the single active spending envelope
//! - `Expense`, `NewExpense`: individual spending records
//! - `Category`: the fixed expense category set

pub mod budget;
pub mod expense;

pub use budget::{Budget, BudgetDraft};
pub use expense::{Category, Expense, NewExpense, MAX_EXPENSE_AMOUNT};
