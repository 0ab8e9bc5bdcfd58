use std::path::PathBuf;

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::debug;

use crate::models::{Budget, Expense};

/// Cache entry holding the budget, or absent when no budget is set.
const BUDGET_ENTRY: &str = "budget";

/// Cache entry holding the full expense collection.
const EXPENSES_ENTRY: &str = "expenses";

/// A cached value with the time it was written, for the status display.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedData<T> {
    pub data: T,
    pub cached_at: DateTime<Utc>,
}

impl<T> CachedData<T> {
    pub fn new(data: T) -> Self {
        Self {
            data,
            cached_at: Utc::now(),
        }
    }

    pub fn age_minutes(&self) -> i64 {
        (Utc::now() - self.cached_at).num_minutes()
    }

    pub fn age_display(&self) -> String {
        let minutes = self.age_minutes();
        if minutes < 1 {
            // Covers clock skew (negative ages) as well
            "just now".to_string()
        } else if minutes < 60 {
            format!("{}m ago", minutes)
        } else if minutes < 1440 {
            format!("{}h ago", minutes / 60)
        } else {
            format!("{}d ago", minutes / 1440)
        }
    }
}

/// Durable key-value mirror of budget and expense state, scoped to the
/// client device. Exactly two named entries, each a JSON file.
///
/// Read failures of any kind surface as "entry absent" rather than as
/// errors; write failures are returned so the caller can decide whether to
/// log and continue.
pub struct LocalCache {
    cache_dir: PathBuf,
}

impl LocalCache {
    pub fn new(cache_dir: PathBuf) -> Result<Self> {
        std::fs::create_dir_all(&cache_dir)?;
        Ok(Self { cache_dir })
    }

    fn entry_path(&self, name: &str) -> PathBuf {
        self.cache_dir.join(format!("{}.json", name))
    }

    fn load<T: DeserializeOwned>(&self, name: &str) -> Option<CachedData<T>> {
        let path = self.entry_path(name);
        if !path.exists() {
            return None;
        }

        let contents = match std::fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) => {
                debug!(entry = name, error = %e, "Unreadable cache entry, treating as absent");
                return None;
            }
        };

        match serde_json::from_str(&contents) {
            Ok(cached) => Some(cached),
            Err(e) => {
                debug!(entry = name, error = %e, "Corrupt cache entry, treating as absent");
                None
            }
        }
    }

    fn save<T: Serialize>(&self, name: &str, data: &T) -> Result<()> {
        let cached = CachedData::new(data);
        let contents = serde_json::to_string_pretty(&cached)?;
        std::fs::write(self.entry_path(name), contents)?;
        Ok(())
    }

    fn clear(&self, name: &str) -> Result<()> {
        let path = self.entry_path(name);
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        Ok(())
    }

    // ===== Budget =====

    pub fn load_budget(&self) -> Option<CachedData<Budget>> {
        self.load(BUDGET_ENTRY)
    }

    pub fn save_budget(&self, budget: &Budget) -> Result<()> {
        self.save(BUDGET_ENTRY, budget)
    }

    pub fn clear_budget(&self) -> Result<()> {
        self.clear(BUDGET_ENTRY)
    }

    // ===== Expenses =====

    pub fn load_expenses(&self) -> Option<CachedData<Vec<Expense>>> {
        self.load(EXPENSES_ENTRY)
    }

    pub fn save_expenses(&self, expenses: &[Expense]) -> Result<()> {
        self.save(EXPENSES_ENTRY, &expenses)
    }

    #[allow(dead_code)] // Keeps the entry API symmetric with the budget methods
    pub fn clear_expenses(&self) -> Result<()> {
        self.clear(EXPENSES_ENTRY)
    }

    // ===== Cache Age Information =====

    pub fn ages(&self) -> CacheAges {
        CacheAges {
            budget: self.load_budget().map(|c| c.age_display()),
            expenses: self.load_expenses().map(|c| c.age_display()),
        }
    }
}

/// Ages of the cached entries, for the status line.
#[derive(Debug, Default)]
pub struct CacheAges {
    pub budget: Option<String>,
    pub expenses: Option<String>,
}

impl CacheAges {
    pub fn budget_age(&self) -> String {
        self.budget.clone().unwrap_or_else(|| "never".to_string())
    }

    pub fn expenses_age(&self) -> String {
        self.expenses.clone().unwrap_or_else(|| "never".to_string())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BudgetDraft, Category};
    use chrono::{Duration, NaiveDate};
    use tempfile::TempDir;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn cache() -> (TempDir, LocalCache) {
        let dir = TempDir::new().unwrap();
        let cache = LocalCache::new(dir.path().to_path_buf()).unwrap();
        (dir, cache)
    }

    fn sample_budget() -> Budget {
        BudgetDraft {
            amount: 150000.0,
            days: 30,
            start_date: date("2024-01-01"),
        }
        .build()
        .unwrap()
    }

    fn sample_expenses() -> Vec<Expense> {
        vec![
            Expense {
                id: 2,
                name: "Rice".to_string(),
                amount: 5000.0,
                category: Category::Groceries,
                date: date("2024-01-05"),
            },
            Expense {
                id: 1,
                name: "Bus pass".to_string(),
                amount: 1200.0,
                category: Category::Transportation,
                date: date("2024-01-03"),
            },
        ]
    }

    #[test]
    fn test_budget_round_trip() {
        let (_dir, cache) = cache();
        let budget = sample_budget();
        cache.save_budget(&budget).unwrap();
        let loaded = cache.load_budget().unwrap();
        assert_eq!(loaded.data, budget);
    }

    #[test]
    fn test_expenses_round_trip_preserves_order() {
        let (_dir, cache) = cache();
        let expenses = sample_expenses();
        cache.save_expenses(&expenses).unwrap();
        let loaded = cache.load_expenses().unwrap();
        assert_eq!(loaded.data, expenses);
    }

    #[test]
    fn test_empty_expense_collection_round_trip() {
        let (_dir, cache) = cache();
        cache.save_expenses(&[]).unwrap();
        let loaded = cache.load_expenses().unwrap();
        assert!(loaded.data.is_empty());
    }

    #[test]
    fn test_missing_entries_read_as_absent() {
        let (_dir, cache) = cache();
        assert!(cache.load_budget().is_none());
        assert!(cache.load_expenses().is_none());
    }

    #[test]
    fn test_corrupt_entry_reads_as_absent() {
        let (dir, cache) = cache();
        std::fs::write(dir.path().join("budget.json"), "{not json").unwrap();
        std::fs::write(dir.path().join("expenses.json"), "42").unwrap();
        assert!(cache.load_budget().is_none());
        assert!(cache.load_expenses().is_none());
    }

    #[test]
    fn test_clear_removes_entry() {
        let (_dir, cache) = cache();
        cache.save_budget(&sample_budget()).unwrap();
        cache.clear_budget().unwrap();
        assert!(cache.load_budget().is_none());
        // Clearing an absent entry is fine
        cache.clear_budget().unwrap();
    }

    #[test]
    fn test_save_overwrites_entirely() {
        let (_dir, cache) = cache();
        cache.save_expenses(&sample_expenses()).unwrap();
        cache.save_expenses(&[]).unwrap();
        assert!(cache.load_expenses().unwrap().data.is_empty());
    }

    #[test]
    fn test_stored_string_amounts_coerce_on_load() {
        let (dir, cache) = cache();
        // An older revision stored amounts as formatted strings
        let raw = r#"{
            "data": [{"id": 1, "name": "Rice", "amount": "5,000", "category": "groceries", "date": "2024-01-05"}],
            "cached_at": "2024-01-05T10:00:00Z"
        }"#;
        std::fs::write(dir.path().join("expenses.json"), raw).unwrap();
        let loaded = cache.load_expenses().unwrap();
        assert_eq!(loaded.data[0].amount, 5000.0);
    }

    #[test]
    fn test_age_display() {
        let mut cached = CachedData::new(());
        assert_eq!(cached.age_display(), "just now");
        cached.cached_at = Utc::now() - Duration::minutes(5);
        assert_eq!(cached.age_display(), "5m ago");
        cached.cached_at = Utc::now() - Duration::hours(3);
        assert_eq!(cached.age_display(), "3h ago");
        cached.cached_at = Utc::now() - Duration::days(2);
        assert_eq!(cached.age_display(), "2d ago");
    }
}
