//! Synchronization module: reconciliation between the local cache and the
//! Store.
//!
//! The `SyncEngine` owns the offline-first policy:
//!
//! - every mutation applies to the local cache first (optimistic), then
//!   forwards to the Store when online
//! - Store confirmations fold authoritative fields (notably row ids) back
//!   into the optimistic copy via one generic `reconcile` merge
//! - failures leave the optimistic state in place; nothing is retried or
//!   queued for replay
//! - `pull_authoritative` overwrites local state wholesale, keeping only
//!   provisional entries the Store has never confirmed

pub mod engine;

pub use engine::{EngineOptions, SyncEngine, SyncState};
