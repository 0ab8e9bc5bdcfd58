//! Local caching module for offline data access.
//!
//! This module provides the `LocalCache` for the on-device durable mirror
//! of budget and expense state. Each entry is a JSON file in the cache
//! directory; the mirror is the source of truth when offline.
//!
//! Corrupt or unreadable entries read as absent rather than erroring, so a
//! damaged cache file can never take the session down.

pub mod manager;

pub use manager::LocalCache;
