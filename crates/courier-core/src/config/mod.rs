//! Configuration management with file persistence

use anyhow::{Context, anyhow};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::PathBuf;

/// Default backend for organizations, profile, billing and feature flags
pub const DEFAULT_API_BASE_URL: &str = "https://api.courier.dev";

/// Courier configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub sync: SyncConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StorageConfig {
    /// Overrides the platform data directory
    pub data_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// How long a pending merge-conflict prompt may stay unanswered
    pub conflict_timeout_secs: u64,
    /// Maximum number of local projects promoted to remote at once
    pub promotion_concurrency: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE_URL.to_string(),
            timeout_secs: 30,
        }
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            conflict_timeout_secs: 300,
            promotion_concurrency: 4,
        }
    }
}

impl ApiConfig {
    /// Base URL with the `COURIER_API_URL` override applied
    pub fn resolved_base_url(&self) -> String {
        env::var("COURIER_API_URL").unwrap_or_else(|_| self.base_url.clone())
    }
}

impl StorageConfig {
    /// Resolve the data directory.
    ///
    /// `COURIER_DATA_PATH` wins over the configured value, which wins over the
    /// platform data directory.
    pub fn resolved_data_dir(&self) -> anyhow::Result<PathBuf> {
        if let Ok(path) = env::var("COURIER_DATA_PATH") {
            return Ok(PathBuf::from(path));
        }
        if let Some(dir) = &self.data_dir {
            return Ok(dir.clone());
        }
        Ok(dirs::data_dir()
            .ok_or_else(|| anyhow!("Could not determine data directory"))?
            .join("courier"))
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> anyhow::Result<PathBuf> {
        let dir = if let Ok(custom_dir) = env::var("COURIER_CONFIG_DIR") {
            PathBuf::from(custom_dir)
        } else {
            dirs::config_dir()
                .ok_or_else(|| anyhow!("Could not determine config directory"))?
                .join("courier")
        };
        Ok(dir)
    }

    /// Get the config file path
    pub fn config_path() -> anyhow::Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Load configuration from file, or fall back to defaults if it doesn't exist
    pub fn load() -> anyhow::Result<Self> {
        let path = Self::config_path()?;

        if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            let config = Self::from_toml(&contents)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    /// Parse and validate a TOML document
    pub fn from_toml(contents: &str) -> anyhow::Result<Self> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self) -> anyhow::Result<()> {
        self.validate()?;

        let dir = Self::config_dir()?;
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create config directory: {}", dir.display()))?;

        let path = Self::config_path()?;
        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(&path, contents)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if !(self.api.base_url.starts_with("http://") || self.api.base_url.starts_with("https://"))
        {
            return Err(anyhow!(
                "api.base_url must start with http:// or https://, got {}",
                self.api.base_url
            ));
        }
        if self.api.timeout_secs == 0 {
            return Err(anyhow!("api.timeout_secs must be greater than zero"));
        }
        if self.sync.conflict_timeout_secs == 0 {
            return Err(anyhow!("sync.conflict_timeout_secs must be greater than zero"));
        }
        if self.sync.promotion_concurrency == 0 {
            return Err(anyhow!("sync.promotion_concurrency must be at least 1"));
        }
        Ok(())
    }

    /// Get a configuration value by key
    pub fn get(&self, key: &str) -> anyhow::Result<String> {
        match key {
            "api.base_url" => Ok(self.api.base_url.clone()),
            "api.timeout_secs" => Ok(self.api.timeout_secs.to_string()),
            "storage.data_dir" => Ok(self
                .storage
                .data_dir
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "(default)".to_string())),
            "sync.conflict_timeout_secs" => Ok(self.sync.conflict_timeout_secs.to_string()),
            "sync.promotion_concurrency" => Ok(self.sync.promotion_concurrency.to_string()),
            _ => Err(anyhow!(
                "Unknown configuration key: {}. Use `courier config list` to see available keys.",
                key
            )),
        }
    }

    /// Set a configuration value by key
    pub fn set(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
        match key {
            "api.base_url" => {
                if !(value.starts_with("http://") || value.starts_with("https://")) {
                    return Err(anyhow!("Invalid base URL: {}", value));
                }
                self.api.base_url = value.trim_end_matches('/').to_string();
            }
            "api.timeout_secs" => {
                let secs: u64 = value
                    .parse()
                    .with_context(|| format!("Invalid timeout_secs value: {}", value))?;
                if secs == 0 {
                    return Err(anyhow!("Timeout must be greater than zero"));
                }
                self.api.timeout_secs = secs;
            }
            "storage.data_dir" => {
                self.storage.data_dir = if value.is_empty() {
                    None
                } else {
                    Some(PathBuf::from(value))
                };
            }
            "sync.conflict_timeout_secs" => {
                let secs: u64 = value
                    .parse()
                    .with_context(|| format!("Invalid conflict_timeout_secs value: {}", value))?;
                if secs == 0 {
                    return Err(anyhow!("Conflict timeout must be greater than zero"));
                }
                self.sync.conflict_timeout_secs = secs;
            }
            "sync.promotion_concurrency" => {
                let n: usize = value
                    .parse()
                    .with_context(|| format!("Invalid promotion_concurrency value: {}", value))?;
                if !(1..=32).contains(&n) {
                    return Err(anyhow!("Promotion concurrency must be between 1 and 32"));
                }
                self.sync.promotion_concurrency = n;
            }
            _ => {
                return Err(anyhow!(
                    "Unknown configuration key: {}. Use `courier config list` to see available keys.",
                    key
                ));
            }
        }
        Ok(())
    }

    /// List all configuration keys and their values
    pub fn list(&self) -> anyhow::Result<Vec<(String, String)>> {
        let keys = [
            "api.base_url",
            "api.timeout_secs",
            "storage.data_dir",
            "sync.conflict_timeout_secs",
            "sync.promotion_concurrency",
        ];

        keys.into_iter()
            .map(|key| {
                let value = self.get(key)?;
                Ok((key.to_string(), value))
            })
            .collect()
    }

    /// Reset configuration to defaults
    pub fn reset() -> anyhow::Result<()> {
        let path = Self::config_path()?;
        if path.exists() {
            fs::remove_file(&path)
                .with_context(|| format!("Failed to remove config file: {}", path.display()))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        config.validate().unwrap();
        assert_eq!(config.api.base_url, DEFAULT_API_BASE_URL);
        assert_eq!(config.sync.promotion_concurrency, 4);
    }

    #[test]
    fn test_get_set_roundtrip() {
        let mut config = Config::default();
        config.set("api.base_url", "http://localhost:8080/").unwrap();
        assert_eq!(config.get("api.base_url").unwrap(), "http://localhost:8080");

        config.set("sync.conflict_timeout_secs", "45").unwrap();
        assert_eq!(config.get("sync.conflict_timeout_secs").unwrap(), "45");

        config.set("storage.data_dir", "/tmp/courier").unwrap();
        assert_eq!(config.get("storage.data_dir").unwrap(), "/tmp/courier");
        config.set("storage.data_dir", "").unwrap();
        assert_eq!(config.get("storage.data_dir").unwrap(), "(default)");
    }

    #[test]
    fn test_set_rejects_invalid_values() {
        let mut config = Config::default();
        assert!(config.set("api.base_url", "ftp://nope").is_err());
        assert!(config.set("api.timeout_secs", "0").is_err());
        assert!(config.set("sync.promotion_concurrency", "0").is_err());
        assert!(config.set("sync.promotion_concurrency", "abc").is_err());
        assert!(config.set("does.not.exist", "1").is_err());
    }

    #[test]
    fn test_list_contains_every_key() {
        let keys: Vec<String> = Config::default()
            .list()
            .unwrap()
            .into_iter()
            .map(|(k, _)| k)
            .collect();
        assert_eq!(keys.len(), 5);
        assert!(keys.contains(&"sync.promotion_concurrency".to_string()));
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = Config::from_toml(
            r#"
            [api]
            base_url = "http://127.0.0.1:9000"
            timeout_secs = 5
            "#,
        )
        .unwrap();
        assert_eq!(config.api.timeout_secs, 5);
        assert_eq!(config.sync.conflict_timeout_secs, 300);
        assert!(config.storage.data_dir.is_none());
    }

    #[test]
    fn test_invalid_toml_rejected_by_validation() {
        let result = Config::from_toml(
            r#"
            [sync]
            conflict_timeout_secs = 0
            promotion_concurrency = 2
            "#,
        );
        assert!(result.is_err());
    }
}
