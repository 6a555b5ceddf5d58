use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::executor::RetryPolicy;
use crate::models::Store;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct BackendConfig {
    pub store: Store,
    pub base_url: String,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RetrySettings {
    pub max_attempts: u32,
    pub delay_ms: u64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay_ms: 1000,
        }
    }
}

impl RetrySettings {
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_attempts, Duration::from_millis(self.delay_ms))
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AppConfig {
    pub backends: Vec<BackendConfig>,
    pub retry: RetrySettings,
    pub timeout_secs: u64,
    pub user_agent: String,
    pub auto_scroll: bool,
    pub prefetch_distance: usize,
}

fn default_true() -> bool {
    true
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            backends: vec![
                BackendConfig {
                    store: Store::Community,
                    base_url: "https://community.unistore.app/api".to_string(),
                    enabled: true,
                },
                BackendConfig {
                    store: Store::Shop,
                    base_url: "https://shop.unistore.app/v1".to_string(),
                    enabled: true,
                },
                BackendConfig {
                    store: Store::Open,
                    base_url: "https://open.unistore.app/api".to_string(),
                    enabled: true,
                },
            ],
            retry: RetrySettings::default(),
            timeout_secs: 30,
            user_agent: "UniStore/0.1 (Rust)".to_string(),
            auto_scroll: true,
            prefetch_distance: 5,
        }
    }
}

impl AppConfig {
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("unistore")
            .join("config.json")
    }

    /// Reads `path`; keys missing from the file keep their defaults.
    pub fn load_from(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
        serde_json::from_str(&content).map_err(|e| format!("Invalid config {}: {}", path.display(), e))
    }

    /// Loads the user config if present. A broken file is logged and ignored.
    pub fn load_or_default() -> Self {
        let path = Self::default_path();
        if !path.exists() {
            return Self::default();
        }
        match Self::load_from(&path) {
            Ok(config) => {
                log::info!("Loaded config from {}", path.display());
                config
            }
            Err(e) => {
                log::warn!("{}; using defaults", e);
                Self::default()
            }
        }
    }

    pub fn backend(&self, store: Store) -> Option<&BackendConfig> {
        self.backends.iter().find(|b| b.store == store)
    }
}
