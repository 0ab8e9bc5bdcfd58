//! Application configuration management.
//!
//! Configuration is stored at `~/.config/spendcache/config.json` and covers
//! the Store base URL and the expense-delete consistency policy. The
//! `SPENDCACHE_API_URL` environment variable (including via a `.env` file)
//! overrides the configured URL.

use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Application name used for config/cache directory paths
const APP_NAME: &str = "spendcache";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Default Store base URL (local dev server for the serverless handlers)
const DEFAULT_API_BASE_URL: &str = "http://localhost:8888/api";

/// Environment variable overriding the Store base URL
const API_URL_ENV: &str = "SPENDCACHE_API_URL";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_base_url: String,
    /// Failed Store expense-deletes: `false` keeps the local deletion
    /// final (user-convenience bias), `true` pulls authoritative state to
    /// restore the row (strict consistency).
    pub strict_expense_delete: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            strict_expense_delete: false,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        let mut config = if path.exists() {
            let contents = std::fs::read_to_string(&path)?;
            serde_json::from_str(&contents)?
        } else {
            // First run: write the defaults so the file is there to edit
            let config = Self::default();
            config.save()?;
            config
        };
        if let Ok(url) = std::env::var(API_URL_ENV) {
            if !url.is_empty() {
                config.api_base_url = url;
            }
        }
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    pub fn cache_dir(&self) -> Result<PathBuf> {
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME))
    }
}
