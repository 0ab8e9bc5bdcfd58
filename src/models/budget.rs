use anyhow::{bail, Result};
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::utils::deserialize_amount;

/// The active spending envelope: an amount covering a fixed window of days.
///
/// The Store may hold a history of budgets; only the most recently created
/// row is authoritative, and at most one budget lives in the local cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Budget {
    /// Store row id. `None` until the budget has been confirmed by the Store.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(deserialize_with = "deserialize_amount")]
    pub amount: f64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub days: i64,
}

/// User input for a new budget, before validation and end-date computation.
#[derive(Debug, Clone)]
pub struct BudgetDraft {
    pub amount: f64,
    pub days: i64,
    pub start_date: NaiveDate,
}

impl BudgetDraft {
    /// Validate the draft and compute the end date.
    ///
    /// Calendar-day arithmetic handles month and year rollover, so
    /// 2024-01-01 + 30 days lands on 2024-01-31.
    pub fn build(self) -> Result<Budget> {
        // `!(x >= 0.0)` also rejects NaN
        if !(self.amount >= 0.0) {
            bail!("budget amount must be a non-negative number");
        }
        if self.days < 1 {
            bail!("budget must cover at least one day");
        }
        let end_date = self.start_date + Duration::days(self.days);
        Ok(Budget {
            id: None,
            amount: self.amount,
            start_date: self.start_date,
            end_date,
            days: self.days,
        })
    }
}
