use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::utils::deserialize_amount;

/// Upper bound for a single expense amount.
/// Rejects fat-finger entries before they reach the cache or the Store.
pub const MAX_EXPENSE_AMOUNT: f64 = 10_000_000.0;

/// Fixed category set for expenses.
///
/// Unknown categories coming back from the Store fall into `Other` rather
/// than failing the whole sync.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Groceries,
    Kitchen,
    Utilities,
    Transportation,
    Healthcare,
    Entertainment,
    #[serde(other)]
    Other,
}

impl Category {
    pub const ALL: [Category; 7] = [
        Category::Groceries,
        Category::Kitchen,
        Category::Utilities,
        Category::Transportation,
        Category::Healthcare,
        Category::Entertainment,
        Category::Other,
    ];

    /// Display label for this category.
    pub fn label(&self) -> &'static str {
        match self {
            Category::Groceries => "Groceries",
            Category::Kitchen => "Kitchen",
            Category::Utilities => "Utilities",
            Category::Transportation => "Transport",
            Category::Healthcare => "Healthcare",
            Category::Entertainment => "Entertainment",
            Category::Other => "Other",
        }
    }

    /// Wire name for this category (matches the Store's column values).
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Groceries => "groceries",
            Category::Kitchen => "kitchen",
            Category::Utilities => "utilities",
            Category::Transportation => "transportation",
            Category::Healthcare => "healthcare",
            Category::Entertainment => "entertainment",
            Category::Other => "other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Category {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_lowercase();
        Category::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == lower)
            .ok_or_else(|| anyhow::anyhow!("unknown category: {}", s))
    }
}

/// A single spending record.
///
/// `id` starts as a client-generated provisional value (current epoch
/// milliseconds) and is swapped in place for the Store-assigned id once the
/// record is confirmed. The two never coexist for one logical expense.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    pub id: i64,
    pub name: String,
    #[serde(deserialize_with = "deserialize_amount")]
    pub amount: f64,
    pub category: Category,
    pub date: NaiveDate,
}

/// User input for a new expense; the body sent to `POST /expenses`.
#[derive(Debug, Clone, Serialize)]
pub struct NewExpense {
    pub name: String,
    pub amount: f64,
    pub category: Category,
    pub date: NaiveDate,
}
