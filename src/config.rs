use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use anyhow::{Result, anyhow};

use crate::mode::QueryMode;

pub const DEFAULT_ENDPOINT: &str = "http://localhost:8020";
pub const ENDPOINT_ENV: &str = "RAGASK_ENDPOINT";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    pub endpoint: String,
    pub default_mode: QueryMode,
    /// Send attached files as multipart. Off unless the server accepts them.
    pub attachments: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    pub fn new() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            default_mode: QueryMode::default(),
            attachments: false,
        }
    }

    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;
        Self::load_from(&config_path)
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            return Ok(Self::new());
        }

        let config_content = fs::read_to_string(config_path)?;
        let config: Config = serde_json::from_str(&config_content)
            .map_err(|e| anyhow!("Invalid config {}: {}", config_path.display(), e))?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::get_config_path()?;
        self.save_to(&config_path)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        // Create config directory if it doesn't exist
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let config_content = serde_json::to_string_pretty(self)?;
        fs::write(config_path, config_content)?;
        Ok(())
    }

    pub fn save_default_mode(mode: QueryMode) -> Result<()> {
        let config_path = Self::get_config_path()?;
        Self::save_default_mode_to(&config_path, mode)
    }

    /// Update only `default_mode` in the file at `config_path`. A file that
    /// exists but cannot be parsed is left untouched and reported as an error.
    pub fn save_default_mode_to(config_path: &Path, mode: QueryMode) -> Result<()> {
        let mut config = Self::load_from(config_path)?;
        config.default_mode = mode;
        config.save_to(config_path)
    }

    /// Apply `RAGASK_ENDPOINT` then an explicit override, in that order.
    pub fn resolve_endpoint(&mut self, cli_endpoint: Option<&str>) {
        let env_endpoint = std::env::var(ENDPOINT_ENV).ok();
        self.override_endpoint(env_endpoint.as_deref(), cli_endpoint);
    }

    fn override_endpoint(&mut self, env_endpoint: Option<&str>, cli_endpoint: Option<&str>) {
        if let Some(endpoint) = env_endpoint.filter(|e| !e.trim().is_empty()) {
            self.endpoint = endpoint.to_string();
        }
        if let Some(endpoint) = cli_endpoint {
            self.endpoint = endpoint.to_string();
        }
    }

    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("ragask").join("config.json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("config.json")).unwrap();
        assert_eq!(config, Config::new());
        assert_eq!(config.default_mode, QueryMode::Hybrid);
        assert!(!config.attachments);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let config = Config {
            endpoint: "http://10.0.0.5:9000".to_string(),
            default_mode: QueryMode::Global,
            attachments: true,
        };
        config.save_to(&path).unwrap();

        assert_eq!(Config::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{ "default_mode": "naive" }"#).unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.default_mode, QueryMode::Naive);
        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
    }

    #[test]
    fn test_invalid_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{ "default_mode": "turbo" }"#).unwrap();

        assert!(Config::load_from(&path).is_err());
    }

    #[test]
    fn test_cli_endpoint_wins() {
        let mut config = Config::new();
        config.resolve_endpoint(Some("http://127.0.0.1:8000"));
        assert_eq!(config.endpoint, "http://127.0.0.1:8000");
    }

    fn config_with_endpoint(endpoint: &str) -> Config {
        Config {
            endpoint: endpoint.to_string(),
            ..Config::new()
        }
    }

    #[test]
    fn test_env_endpoint_overrides_file() {
        let mut config = config_with_endpoint("http://from-file:8020");
        config.override_endpoint(Some("http://from-env:8020"), None);
        assert_eq!(config.endpoint, "http://from-env:8020");
    }

    #[test]
    fn test_cli_endpoint_beats_env() {
        let mut config = config_with_endpoint("http://from-file:8020");
        config.override_endpoint(Some("http://from-env:8020"), Some("http://from-flag:8020"));
        assert_eq!(config.endpoint, "http://from-flag:8020");
    }

    #[test]
    fn test_blank_env_endpoint_is_ignored() {
        let mut config = config_with_endpoint("http://from-file:8020");
        config.override_endpoint(Some("   "), None);
        assert_eq!(config.endpoint, "http://from-file:8020");

        config.override_endpoint(None, None);
        assert_eq!(config.endpoint, "http://from-file:8020");
    }

    #[test]
    fn test_save_default_mode_keeps_other_settings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        config_with_endpoint("http://rag.internal:9000").save_to(&path).unwrap();

        Config::save_default_mode_to(&path, QueryMode::Local).unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.default_mode, QueryMode::Local);
        assert_eq!(config.endpoint, "http://rag.internal:9000");
    }

    #[test]
    fn test_save_default_mode_leaves_unreadable_file_alone() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let original =
            r#"{"endpoint":"http://rag.internal:9000","default_mode":"mix","attachments":true}"#;
        fs::write(&path, original).unwrap();

        assert!(Config::save_default_mode_to(&path, QueryMode::Global).is_err());
        assert_eq!(fs::read_to_string(&path).unwrap(), original);
    }
}
