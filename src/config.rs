//! Configuration handling
//!
//! Settings come from, in increasing precedence: built-in defaults, an
//! optional `randm.toml`, environment variables (a `.env` file in the working
//! directory is loaded first), and command-line flags.
//!
//! ## Environment Variables
//!
//! - `RANDM_API_URL` - Base URL of the character API
//! - `RANDM_DATA_DIR` - Directory holding the cache database
//! - `RANDM_OFFLINE` - `1`/`true` to never touch the network
//! - `RANDM_TIMEOUT_MS` - HTTP request timeout
//! - `RANDM_REFRESH_PAGE_CAP` - Maximum pages fetched by a refresh

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::client::DEFAULT_API_URL;
use crate::store::default_data_dir;
use crate::sync::SyncConfig;

/// Configuration file name
pub const CONFIG_FILE_NAME: &str = "randm.toml";

/// Application name, used for the default data directory
pub const APP_NAME: &str = "randm";

pub const ENV_API_URL: &str = "RANDM_API_URL";
pub const ENV_DATA_DIR: &str = "RANDM_DATA_DIR";
pub const ENV_OFFLINE: &str = "RANDM_OFFLINE";
pub const ENV_TIMEOUT_MS: &str = "RANDM_TIMEOUT_MS";
pub const ENV_REFRESH_PAGE_CAP: &str = "RANDM_REFRESH_PAGE_CAP";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the character API
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// Cache directory; the platform data dir when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
    /// HTTP request timeout
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Connect timeout of the reachability probe
    #[serde(default = "default_probe_timeout_ms")]
    pub probe_timeout_ms: u64,
    /// Treat the network as unreachable
    #[serde(default)]
    pub offline: bool,
    #[serde(default)]
    pub sync: SyncSection,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncSection {
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    #[serde(default = "default_refresh_page_cap")]
    pub refresh_page_cap: u32,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_timeout_ms() -> u64 {
    30_000
}

fn default_probe_timeout_ms() -> u64 {
    1_500
}

fn default_page_size() -> u32 {
    20
}

fn default_refresh_page_cap() -> u32 {
    5
}

impl Default for SyncSection {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            refresh_page_cap: default_refresh_page_cap(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            data_dir: None,
            timeout_ms: default_timeout_ms(),
            probe_timeout_ms: default_probe_timeout_ms(),
            offline: false,
            sync: SyncSection::default(),
        }
    }
}

impl Config {
    /// Load configuration.
    ///
    /// An explicit `path` must exist. Without one, `randm.toml` in the
    /// working directory is used when present, defaults otherwise.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        // .env is optional
        let _ = dotenvy::dotenv();

        let mut config = match path {
            Some(path) => {
                if !path.exists() {
                    anyhow::bail!("Configuration file not found: {}", path.display());
                }
                Self::from_file(path)?
            }
            None => {
                let local = Path::new(CONFIG_FILE_NAME);
                if local.exists() {
                    Self::from_file(local)?
                } else {
                    Self::default()
                }
            }
        };

        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        tracing::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Apply overrides looked up by variable name. Empty or unparsable values
    /// are ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        if let Some(url) = get(ENV_API_URL) {
            self.api_url = url;
        }

        if let Some(dir) = get(ENV_DATA_DIR) {
            self.data_dir = Some(PathBuf::from(dir));
        }

        if let Some(offline) = get(ENV_OFFLINE) {
            self.offline = matches!(offline.to_ascii_lowercase().as_str(), "1" | "true" | "yes");
        }

        if let Some(timeout) = get(ENV_TIMEOUT_MS).and_then(|v| v.parse().ok()) {
            self.timeout_ms = timeout;
        }

        if let Some(cap) = get(ENV_REFRESH_PAGE_CAP)
            .and_then(|v| v.parse().ok())
            .filter(|cap: &u32| *cap > 0)
        {
            self.sync.refresh_page_cap = cap;
        }
    }

    pub fn data_dir(&self) -> PathBuf {
        self.data_dir
            .clone()
            .unwrap_or_else(|| default_data_dir(APP_NAME))
    }

    pub fn database_path(&self) -> PathBuf {
        self.data_dir().join("characters.db")
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }

    pub fn sync_config(&self) -> SyncConfig {
        SyncConfig {
            page_size: self.sync.page_size.max(1),
            refresh_page_cap: self.sync.refresh_page_cap.max(1),
        }
    }
}
