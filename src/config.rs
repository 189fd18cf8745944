//! Configuration Management
//!
//! Handles persistent provider configuration for sbrule.

use crate::azure::client::{DEFAULT_API_VERSION, DEFAULT_ENDPOINT};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const SUBSCRIPTION_ENV_VAR: &str = "ARM_SUBSCRIPTION_ID";
pub const ENDPOINT_ENV_VAR: &str = "ARM_ENDPOINT";

/// Provider configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    /// Azure subscription the client is scoped to
    #[serde(default)]
    pub subscription_id: Option<String>,
    /// ARM endpoint, for sovereign clouds
    #[serde(default)]
    pub endpoint: Option<String>,
    /// Service Bus management API version
    #[serde(default)]
    pub api_version: Option<String>,
}

impl Config {
    /// Get the config file path
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("sbrule").join("config.json"))
    }

    /// Load configuration from disk
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            return Self::default();
        };
        Self::load_from(&path)
    }

    /// Load configuration from a specific file; missing or unreadable files
    /// yield the defaults
    pub fn load_from(path: &std::path::Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                tracing::warn!("Ignoring malformed config {:?}: {}", path, e);
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<()> {
        let Some(path) = Self::config_path() else {
            return Ok(());
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, content)?;

        Ok(())
    }

    /// Get effective subscription (CLI > config > environment)
    pub fn effective_subscription(&self) -> String {
        self.subscription_id
            .clone()
            .or_else(|| non_empty_env(SUBSCRIPTION_ENV_VAR))
            .unwrap_or_default()
    }

    /// Get effective endpoint (CLI > config > environment > public cloud)
    pub fn effective_endpoint(&self) -> String {
        self.endpoint
            .clone()
            .or_else(|| non_empty_env(ENDPOINT_ENV_VAR))
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string())
    }

    /// Get effective API version
    pub fn effective_api_version(&self) -> String {
        self.api_version
            .clone()
            .unwrap_or_else(|| DEFAULT_API_VERSION.to_string())
    }

    /// Set subscription and save
    pub fn set_subscription(&mut self, subscription_id: &str) -> Result<()> {
        self.subscription_id = Some(subscription_id.to_string());
        self.save()
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_values_win() {
        let config = Config {
            subscription_id: Some("sub-from-file".to_string()),
            endpoint: Some("https://management.usgovcloudapi.net".to_string()),
            api_version: Some("2021-11-01".to_string()),
        };

        assert_eq!(config.effective_subscription(), "sub-from-file");
        assert_eq!(config.effective_endpoint(), "https://management.usgovcloudapi.net");
        assert_eq!(config.effective_api_version(), "2021-11-01");
    }

    #[test]
    fn test_api_version_default() {
        assert_eq!(Config::default().effective_api_version(), DEFAULT_API_VERSION);
    }

    #[test]
    fn test_load_from_missing_file_is_default() {
        let path = std::env::temp_dir().join("sbrule-test-does-not-exist").join("config.json");
        assert_eq!(Config::load_from(&path), Config::default());
    }

    #[test]
    fn test_load_from_reads_partial_json() {
        let dir = std::env::temp_dir().join(format!("sbrule-config-test-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.json");
        std::fs::write(&path, r#"{ "subscription_id": "abc" }"#).unwrap();

        let config = Config::load_from(&path);
        assert_eq!(config.subscription_id.as_deref(), Some("abc"));
        assert_eq!(config.endpoint, None);

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
