//! Store client module: the JSON-over-HTTP persistence service.
//!
//! The Store is treated as a black box behind the `Store` trait. The sync
//! engine is generic over that trait, so production code talks to the real
//! serverless handlers through `StoreClient` while tests inject an
//! in-memory fake with failure injection.
//!
//! Every Store-facing operation returns an explicit `Result` and the caller
//! decides policy (degrade silently, reconcile, or surface).

pub mod client;
pub mod error;

pub use client::StoreClient;
pub use error::StoreError;

use serde_json::Value;

use crate::models::{Budget, Expense, NewExpense};

/// The remote persistence service.
///
/// Creation endpoints return the raw JSON row the Store echoed back, so the
/// engine can fold authoritative fields into its optimistic local copy
/// without losing locally-known fields the Store omitted.
#[allow(async_fn_in_trait)]
pub trait Store {
    /// `GET /budget`: the most recently created budget, or `None`.
    async fn fetch_budget(&self) -> Result<Option<Budget>, StoreError>;

    /// `POST /budget`: persist a budget; returns the created row.
    async fn save_budget(&self, budget: &Budget) -> Result<Value, StoreError>;

    /// `DELETE /budget[?id=]`: delete one budget, or all for the account.
    async fn delete_budget(&self, id: Option<i64>) -> Result<(), StoreError>;

    /// `GET /expenses`: the full collection, ordered date-descending.
    async fn fetch_expenses(&self) -> Result<Vec<Expense>, StoreError>;

    /// `POST /expenses`: persist an expense; returns the created row.
    async fn create_expense(&self, expense: &NewExpense) -> Result<Value, StoreError>;

    /// `DELETE /expenses?id=`: delete one expense.
    async fn delete_expense(&self, id: i64) -> Result<(), StoreError>;

    /// `POST /verify-pin`: check the access PIN.
    async fn verify_pin(&self, pin: &str) -> Result<bool, StoreError>;
}
