use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";
pub const DEFAULT_MAX_ENTRIES: usize = 1000;

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the chat service
    pub base_url: String,

    /// Maximum number of transcript entries to keep in memory
    pub max_entries: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            max_entries: DEFAULT_MAX_ENTRIES,
        }
    }
}

impl Config {
    /// Initialize configuration from various sources
    pub async fn init() -> Result<Self> {
        debug!("Initializing configuration");

        let mut config = Self::default();

        // Load from environment variables
        config.load_from_env();

        // Try to load from configuration files
        if let Ok(file_config) = Self::load_from_file().await {
            config.merge_with(file_config);
        }

        Ok(config)
    }

    /// Load configuration from environment variables
    pub fn load_from_env(&mut self) {
        if let Ok(base_url) = std::env::var("SOLACE_BASE_URL") {
            self.base_url = base_url;
        }

        if let Ok(max_entries_str) = std::env::var("SOLACE_MAX_ENTRIES") {
            if let Ok(max_entries) = max_entries_str.parse() {
                self.max_entries = max_entries;
            }
        }
    }

    /// Load configuration from solace.json files
    pub async fn load_from_file() -> Result<Self> {
        // Configuration priority:
        // 1. ./.solace.json
        // 2. ./solace.json
        // 3. $HOME/.config/solace/solace.json
        let mut config_paths = vec![
            PathBuf::from("./.solace.json"),
            PathBuf::from("./solace.json"),
        ];

        if let Some(config_dir) = dirs::config_dir() {
            config_paths.push(config_dir.join("solace").join("solace.json"));
        }

        for path in config_paths {
            if path.exists() {
                return Self::load_from_path(&path).await;
            }
        }

        Err(anyhow::anyhow!("No configuration file found"))
    }

    /// Load configuration from a specific file
    pub async fn load_from_path(path: &Path) -> Result<Self> {
        debug!("Loading configuration from: {}", path.display());
        let content = tokio::fs::read_to_string(path).await?;
        let config: Self = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Merge another configuration into this one
    pub fn merge_with(&mut self, other: Self) {
        if !other.base_url.is_empty() && other.base_url != DEFAULT_BASE_URL {
            self.base_url = other.base_url;
        }
        if other.max_entries != 0 && other.max_entries != DEFAULT_MAX_ENTRIES {
            self.max_entries = other.max_entries;
        }
    }

    /// Apply a command line override for the base URL
    pub fn with_base_url(mut self, base_url: Option<String>) -> Self {
        if let Some(base_url) = base_url {
            self.base_url = base_url;
        }
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.base_url.is_empty() {
            return Err(anyhow::anyhow!(
                "base_url is required. Set SOLACE_BASE_URL or add it to solace.json."
            ));
        }

        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(anyhow::anyhow!(
                "base_url must start with http:// or https://, got: {}",
                self.base_url
            ));
        }

        if self.max_entries == 0 {
            return Err(anyhow::anyhow!("max_entries must be greater than 0"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.max_entries, DEFAULT_MAX_ENTRIES);
    }

    #[test]
    fn test_merge_takes_non_default_values() {
        let mut config = Config::default();
        config.merge_with(Config {
            base_url: "http://chat.internal:9000".to_string(),
            max_entries: 250,
        });
        assert_eq!(config.base_url, "http://chat.internal:9000");
        assert_eq!(config.max_entries, 250);
    }

    #[test]
    fn test_merge_keeps_existing_over_defaults() {
        let mut config = Config {
            base_url: "http://chat.internal:9000".to_string(),
            ..Config::default()
        };
        config.merge_with(Config::default());
        assert_eq!(config.base_url, "http://chat.internal:9000");
    }

    #[test]
    fn test_with_base_url_override() {
        let config = Config::default().with_base_url(Some("http://10.0.0.5:8000".to_string()));
        assert_eq!(config.base_url, "http://10.0.0.5:8000");

        let config = config.with_base_url(None);
        assert_eq!(config.base_url, "http://10.0.0.5:8000");
    }

    #[test]
    fn test_validate_rejects_empty_base_url() {
        let config = Config {
            base_url: String::new(),
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_scheme() {
        let config = Config {
            base_url: "ftp://example.com".to_string(),
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_accepts_https() {
        let config = Config {
            base_url: "https://chat.example.com".to_string(),
            ..Config::default()
        };
        assert!(config.validate().is_ok());
    }

    #[tokio::test]
    async fn test_load_from_path_fills_missing_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("solace.json");
        tokio::fs::write(&path, r#"{"base_url": "http://127.0.0.1:9000"}"#)
            .await
            .unwrap();

        let config = Config::load_from_path(&path).await.unwrap();
        assert_eq!(config.base_url, "http://127.0.0.1:9000");
        assert_eq!(config.max_entries, DEFAULT_MAX_ENTRIES);
    }

    #[tokio::test]
    async fn test_load_from_path_rejects_malformed_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("solace.json");
        tokio::fs::write(&path, "not json").await.unwrap();

        assert!(Config::load_from_path(&path).await.is_err());
    }
}
