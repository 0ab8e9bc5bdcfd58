use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::api::Store;

/// Unlock flag file name in the cache directory
const AUTH_FILE: &str = "auth.json";

/// Opaque persisted unlock flag. Holds when the gate was opened, nothing
/// secret.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct UnlockFlag {
    unlocked: bool,
    unlocked_at: DateTime<Utc>,
}

/// PIN gate backed by the Store's verify endpoint.
pub struct PinGate {
    cache_dir: PathBuf,
}

impl PinGate {
    pub fn new(cache_dir: PathBuf) -> Self {
        Self { cache_dir }
    }

    /// Verify the PIN against the Store and persist the unlock flag on
    /// success. Returns whether the PIN was accepted.
    pub async fn unlock<S: Store>(&self, store: &S, pin: &str) -> Result<bool> {
        let valid = store
            .verify_pin(pin)
            .await
            .context("Failed to verify PIN against the store")?;
        if valid {
            let flag = UnlockFlag {
                unlocked: true,
                unlocked_at: Utc::now(),
            };
            std::fs::create_dir_all(&self.cache_dir)?;
            let contents = serde_json::to_string_pretty(&flag)?;
            std::fs::write(self.flag_path(), contents)?;
        }
        Ok(valid)
    }

    /// Whether a previously persisted unlock flag is present. Works
    /// offline; a corrupt flag reads as locked.
    pub fn is_unlocked(&self) -> bool {
        let path = self.flag_path();
        if !path.exists() {
            return false;
        }
        match std::fs::read_to_string(&path) {
            Ok(contents) => serde_json::from_str::<UnlockFlag>(&contents)
                .map(|flag| flag.unlocked)
                .unwrap_or(false),
            Err(e) => {
                debug!(error = %e, "Unreadable unlock flag, treating as locked");
                false
            }
        }
    }

    /// Remove the unlock flag.
    pub fn lock(&self) -> Result<()> {
        let path = self.flag_path();
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        Ok(())
    }

    fn flag_path(&self) -> PathBuf {
        self.cache_dir.join(AUTH_FILE)
    }
}
