//! Configuration management
//!
//! Reads `settings.json` from the data directory:
//! ```json
//! {
//!   "api": { "endpoints": ["https://..."], "timeoutSecs": 15 }
//! }
//! ```
//! Unmanaged fields are preserved on save. `OUTLAY_API_URL` overrides the
//! endpoint list (single endpoint, used for tests and local backends).

use std::path::Path;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use url::Url;

/// Production endpoint candidates, tried in order on network failure
const DEFAULT_ENDPOINTS: &[&str] = &[
    "https://api.outlay.app/api",
    "https://outlay-backend.onrender.com/api",
];

/// Default request timeout in seconds
const DEFAULT_TIMEOUT_SECS: u64 = 15;

/// Environment variable overriding the endpoint list
pub const API_URL_ENV: &str = "OUTLAY_API_URL";

/// Raw settings.json structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SettingsFile {
    #[serde(default)]
    api: ApiSettings,
    #[serde(default)]
    app: serde_json::Value,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiSettings {
    #[serde(default)]
    endpoints: Vec<String>,
    #[serde(default)]
    timeout_secs: Option<u64>,
}

/// Outlay configuration (simplified view of settings)
#[derive(Debug, Clone)]
pub struct Config {
    pub endpoints: Vec<String>,
    pub timeout_secs: u64,
    // Keep the raw settings for preservation when saving
    _raw_settings: SettingsFile,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoints: DEFAULT_ENDPOINTS.iter().map(|s| s.to_string()).collect(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            _raw_settings: SettingsFile::default(),
        }
    }
}

impl Config {
    /// Load config from the data directory
    ///
    /// Endpoint resolution order:
    /// 1. `OUTLAY_API_URL` environment variable (single endpoint)
    /// 2. `api.endpoints` in settings.json
    /// 3. Built-in production candidates
    pub fn load(data_dir: &Path) -> Result<Self> {
        let settings_path = data_dir.join("settings.json");

        let raw: SettingsFile = if settings_path.exists() {
            let content = std::fs::read_to_string(&settings_path)?;
            serde_json::from_str(&content).unwrap_or_default()
        } else {
            SettingsFile::default()
        };

        let endpoints = if let Ok(override_url) = std::env::var(API_URL_ENV) {
            vec![override_url]
        } else if !raw.api.endpoints.is_empty() {
            raw.api.endpoints.clone()
        } else {
            DEFAULT_ENDPOINTS.iter().map(|s| s.to_string()).collect()
        };

        for endpoint in &endpoints {
            Url::parse(endpoint)
                .map_err(|e| anyhow::anyhow!("Invalid backend endpoint '{}': {}", endpoint, e))?;
        }

        let timeout_secs = raw.api.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS);

        Ok(Self {
            endpoints,
            timeout_secs,
            _raw_settings: raw,
        })
    }

    /// Save config to the data directory, preserving fields the client
    /// doesn't manage
    pub fn save(&self, data_dir: &Path) -> Result<()> {
        let settings_path = data_dir.join("settings.json");

        let mut settings = if settings_path.exists() {
            let content = std::fs::read_to_string(&settings_path)?;
            serde_json::from_str::<SettingsFile>(&content).unwrap_or_default()
        } else {
            SettingsFile::default()
        };

        settings.api.endpoints = self.endpoints.clone();
        settings.api.timeout_secs = Some(self.timeout_secs);

        let content = serde_json::to_string_pretty(&settings)?;
        std::fs::write(&settings_path, content)?;
        Ok(())
    }
}
