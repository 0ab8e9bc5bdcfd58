//! The sync engine: optimistic local-first mutations with write-through to
//! the Store and read-through reconciliation on demand.

use anyhow::{bail, Result};
use chrono::Utc;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::api::Store;
use crate::cache::LocalCache;
use crate::models::{Budget, BudgetDraft, Expense, NewExpense, MAX_EXPENSE_AMOUNT};
use crate::summaries::{summarize, Totals};

/// Smallest id treated as client-generated.
///
/// Provisional ids are epoch milliseconds (~1.7e12 today); Store row ids are
/// small serials. The floor lets a pull distinguish unconfirmed local
/// entries from authoritative rows without extra bookkeeping, and keeps
/// working across process restarts.
const PROVISIONAL_ID_FLOOR: i64 = 1_000_000_000_000;

/// Sync state of a logical record kind.
///
/// `Stale` means a sync attempt failed; the local copy remains usable and
/// no retry is scheduled. The next successful `pull_authoritative` resolves
/// the divergence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyncState {
    #[default]
    Local,
    Syncing,
    Synced,
    Stale,
}

impl SyncState {
    pub fn label(&self) -> &'static str {
        match self {
            SyncState::Local => "local only",
            SyncState::Syncing => "syncing",
            SyncState::Synced => "synced",
            SyncState::Stale => "not synced",
        }
    }
}

/// Engine construction options.
#[derive(Debug, Clone, Copy)]
pub struct EngineOptions {
    /// Whether connectivity is currently reported available. Mutations skip
    /// the Store round trip entirely when offline.
    pub online: bool,
    /// When set, a failed Store expense-delete triggers a reconciling pull
    /// (strict consistency) instead of staying deleted locally.
    pub strict_expense_delete: bool,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            online: true,
            strict_expense_delete: false,
        }
    }
}

/// Fold an authoritative Store row into an optimistic local value.
///
/// Field-wise overlay: every non-null field the Store returned wins, and
/// fields the Store omitted keep their local value. Extra Store columns
/// (user_id, created_at) are dropped by deserialization. If the merged
/// object fails to deserialize, the local value is kept unchanged.
pub fn reconcile<T>(local: &T, remote: &Value) -> T
where
    T: Serialize + DeserializeOwned + Clone,
{
    let mut merged = match serde_json::to_value(local) {
        Ok(value) => value,
        Err(_) => return local.clone(),
    };
    if let (Some(local_obj), Some(remote_obj)) = (merged.as_object_mut(), remote.as_object()) {
        for (key, value) in remote_obj {
            if !value.is_null() {
                local_obj.insert(key.clone(), value.clone());
            }
        }
    }
    serde_json::from_value(merged).unwrap_or_else(|_| local.clone())
}

/// Reconciliation engine between the `LocalCache` and the Store.
///
/// Single-session, single-threaded by construction: mutations are applied
/// to local state before the only suspension point (the Store round trip),
/// so user-visible state updates synchronously regardless of latency.
pub struct SyncEngine<S: Store> {
    cache: LocalCache,
    store: S,
    online: bool,
    degraded: bool,
    strict_expense_delete: bool,
    budget_state: SyncState,
    expenses_state: SyncState,
    budget: Option<Budget>,
    expenses: Vec<Expense>,
}

impl<S: Store> SyncEngine<S> {
    /// Create an engine, loading cached state synchronously for instant
    /// startup. Callers follow up with `pull_authoritative` when online.
    pub fn new(cache: LocalCache, store: S, options: EngineOptions) -> Self {
        let budget = cache.load_budget().map(|c| c.data);
        let expenses = cache.load_expenses().map(|c| c.data).unwrap_or_default();
        debug!(
            has_budget = budget.is_some(),
            expenses = expenses.len(),
            "Loaded state from local cache"
        );
        Self {
            cache,
            store,
            online: options.online,
            degraded: false,
            strict_expense_delete: options.strict_expense_delete,
            budget_state: SyncState::Local,
            expenses_state: SyncState::Local,
            budget,
            expenses,
        }
    }

    // ===== Accessors =====

    pub fn budget(&self) -> Option<&Budget> {
        self.budget.as_ref()
    }

    pub fn expenses(&self) -> &[Expense] {
        &self.expenses
    }

    pub fn totals(&self) -> Totals {
        summarize(self.budget.as_ref(), &self.expenses)
    }

    pub fn is_online(&self) -> bool {
        self.online
    }

    /// True after a failed pull: local state may lag the Store. Display
    /// only; the engine keeps operating on the cache.
    pub fn is_degraded(&self) -> bool {
        self.degraded
    }

    pub fn budget_state(&self) -> SyncState {
        self.budget_state
    }

    pub fn expenses_state(&self) -> SyncState {
        self.expenses_state
    }

    pub fn cache(&self) -> &LocalCache {
        &self.cache
    }

    /// Record a connectivity transition. Going offline does not queue
    /// anything; mutations made while offline stay local-only.
    pub fn set_online(&mut self, online: bool) {
        if self.online != online {
            info!(online, "Connectivity changed");
        }
        self.online = online;
    }

    // ===== Read-through sync =====

    /// Pull authoritative state from the Store and overwrite local state.
    ///
    /// Budget and expenses are fetched concurrently and applied
    /// independently, matching the Store's separate endpoints. A `None`
    /// budget clears the local entry. The expense list wholly replaces the
    /// local list, except that provisional entries the Store has never
    /// confirmed are kept (their divergence persists until confirmed or
    /// deleted by the user).
    ///
    /// Returns whether both fetches succeeded. Never returns an error; a
    /// failed fetch sets the degraded flag and leaves that record's local
    /// state untouched while the other endpoint's result still applies.
    pub async fn pull_authoritative(&mut self) -> bool {
        if !self.online {
            debug!("Skipping pull while offline");
            return false;
        }

        let (budget_result, expenses_result) =
            futures::future::join(self.store.fetch_budget(), self.store.fetch_expenses()).await;

        let mut synced = true;

        match budget_result {
            Ok(Some(budget)) => {
                self.budget = Some(budget);
                self.persist_budget();
                self.budget_state = SyncState::Synced;
            }
            Ok(None) => {
                // The Store authoritatively reports no budget
                self.budget = None;
                if let Err(e) = self.cache.clear_budget() {
                    warn!(error = %e, "Failed to clear budget cache entry");
                }
                self.budget_state = SyncState::Synced;
            }
            Err(e) => {
                warn!(error = %e, "Budget pull failed, keeping local state");
                synced = false;
            }
        }

        match expenses_result {
            Ok(authoritative) => {
                self.expenses = Self::merge_authoritative_expenses(&self.expenses, authoritative);
                self.persist_expenses();
                self.expenses_state = SyncState::Synced;
            }
            Err(e) => {
                warn!(error = %e, "Expense pull failed, keeping local state");
                synced = false;
            }
        }

        self.degraded = !synced;
        synced
    }

    /// Replace the local list with the Store's, retaining provisional
    /// entries the Store does not know about. Ordering: date descending,
    /// newest insertion first within a date (stable sort keeps the
    /// provisional entries ahead of same-date Store rows).
    fn merge_authoritative_expenses(local: &[Expense], authoritative: Vec<Expense>) -> Vec<Expense> {
        let mut merged: Vec<Expense> = local
            .iter()
            .filter(|e| e.id >= PROVISIONAL_ID_FLOOR && !authoritative.iter().any(|a| a.id == e.id))
            .cloned()
            .collect();
        merged.extend(authoritative);
        merged.sort_by(|a, b| b.date.cmp(&a.date));
        merged
    }

    // ===== Budget mutations =====

    /// Validate and set the budget: optimistic cache write, then
    /// write-through to the Store when online. The Store's row (id,
    /// normalized fields) is reconciled back on success; on failure the
    /// optimistic value stays and no retry is scheduled.
    pub async fn set_budget(&mut self, draft: BudgetDraft) -> Result<()> {
        let budget = draft.build()?;

        self.budget = Some(budget.clone());
        self.persist_budget();

        if !self.online {
            self.budget_state = SyncState::Local;
            return Ok(());
        }

        self.budget_state = SyncState::Syncing;
        match self.store.save_budget(&budget).await {
            Ok(row) => {
                let merged = reconcile(&budget, &row);
                self.budget = Some(merged);
                self.persist_budget();
                self.budget_state = SyncState::Synced;
                info!("Budget synced to store");
            }
            Err(e) => {
                warn!(error = %e, "Budget save failed, keeping optimistic value");
                self.budget_state = SyncState::Stale;
            }
        }
        Ok(())
    }

    /// Delete the budget. The confirmation gate lives here so an undecided
    /// caller cannot mutate anything: `confirmed == false` is a complete
    /// no-op. A failed Store delete triggers a reconciling pull rather than
    /// trusting the optimistic clear.
    pub async fn delete_budget(&mut self, confirmed: bool) -> Result<bool> {
        if !confirmed {
            return Ok(false);
        }

        let id = self.budget.as_ref().and_then(|b| b.id);
        self.budget = None;
        if let Err(e) = self.cache.clear_budget() {
            warn!(error = %e, "Failed to clear budget cache entry");
        }
        self.budget_state = SyncState::Local;

        if self.online {
            match self.store.delete_budget(id).await {
                Ok(()) => {
                    self.budget_state = SyncState::Synced;
                    info!("Budget deleted from store");
                }
                Err(e) => {
                    warn!(error = %e, "Budget delete failed, pulling authoritative state");
                    self.pull_authoritative().await;
                }
            }
        }
        Ok(true)
    }

    // ===== Expense mutations =====

    /// Add an expense: validation, provisional id, optimistic prepend, then
    /// write-through. On success the Store id replaces the provisional id
    /// in place; the entry never appears twice. Returns the expense's
    /// current id.
    pub async fn add_expense(&mut self, new: NewExpense) -> Result<i64> {
        let name = new.name.trim().to_string();
        if name.is_empty() {
            bail!("expense name must not be empty");
        }
        // `!(x > 0.0)` also rejects NaN
        if !(new.amount > 0.0) {
            bail!("expense amount must be a positive number");
        }
        if new.amount > MAX_EXPENSE_AMOUNT {
            bail!("expense amount exceeds the accepted maximum");
        }

        let provisional_id = self.next_provisional_id();
        let expense = Expense {
            id: provisional_id,
            name: name.clone(),
            amount: new.amount,
            category: new.category,
            date: new.date,
        };
        // Most-recent-first: new entries go to the head
        self.expenses.insert(0, expense);
        self.persist_expenses();

        if !self.online {
            self.expenses_state = SyncState::Local;
            return Ok(provisional_id);
        }

        self.expenses_state = SyncState::Syncing;
        let body = NewExpense {
            name,
            amount: new.amount,
            category: new.category,
            date: new.date,
        };
        match self.store.create_expense(&body).await {
            Ok(row) => {
                let mut id = provisional_id;
                if let Some(pos) = self.expenses.iter().position(|e| e.id == provisional_id) {
                    let merged = reconcile(&self.expenses[pos], &row);
                    id = merged.id;
                    self.expenses[pos] = merged;
                }
                self.persist_expenses();
                self.expenses_state = SyncState::Synced;
                debug!(id, "Expense confirmed by store");
                Ok(id)
            }
            Err(e) => {
                warn!(error = %e, "Expense save failed, keeping provisional entry");
                self.expenses_state = SyncState::Stale;
                Ok(provisional_id)
            }
        }
    }

    /// Delete an expense by id. The local removal is immediate and, by
    /// default, final from the user's perspective; a failed Store delete is
    /// only logged. With `strict_expense_delete` the failure triggers a
    /// reconciling pull instead. Returns whether the id was found.
    pub async fn delete_expense(&mut self, id: i64) -> Result<bool> {
        let before = self.expenses.len();
        self.expenses.retain(|e| e.id != id);
        if self.expenses.len() == before {
            return Ok(false);
        }
        self.persist_expenses();

        if self.online {
            match self.store.delete_expense(id).await {
                Ok(()) => debug!(id, "Expense deleted from store"),
                Err(e) => {
                    warn!(error = %e, id, "Expense delete failed against store");
                    if self.strict_expense_delete {
                        self.pull_authoritative().await;
                    }
                }
            }
        }
        Ok(true)
    }

    // ===== Internals =====

    /// Epoch-millisecond provisional id, bumped past any id already in the
    /// collection so two adds in the same millisecond stay distinct.
    fn next_provisional_id(&self) -> i64 {
        let mut id = Utc::now().timestamp_millis();
        while self.expenses.iter().any(|e| e.id == id) {
            id += 1;
        }
        id
    }

    fn persist_budget(&self) {
        if let Some(ref budget) = self.budget {
            if let Err(e) = self.cache.save_budget(budget) {
                warn!(error = %e, "Failed to persist budget cache entry");
            }
        }
    }

    fn persist_expenses(&self) {
        if let Err(e) = self.cache.save_expenses(&self.expenses) {
            warn!(error = %e, "Failed to persist expenses cache entry");
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
