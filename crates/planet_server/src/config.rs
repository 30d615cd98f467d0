//! Server settings
//!
//! Loaded from a JSON file; a file with default values is written when none
//! exists yet.

use anyhow::{Context, Result};
use planet_core::gen::GenerationConfig;
use planet_core::registry::RegistryConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_CONFIG_PATH: &str = "config/planet-server.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Registry snapshots live here
    pub data_dir: PathBuf,

    /// Root of the generated planet and world documents
    pub artifact_dir: PathBuf,

    /// WebSocket address observers connect to
    pub listen_addr: String,

    pub registry: RegistryConfig,

    pub generation: GenerationConfig,

    /// Seconds between maintenance attempts (the registry cooldown still applies)
    pub maintenance_interval_secs: u64,

    /// Seconds between dirty checks for autosave
    pub autosave_interval_secs: u64,

    /// Planets created when the registry starts out empty
    pub bootstrap_planets: usize,

    /// Capacity of the background job queue
    pub worker_queue: usize,

    /// Default tracing filter, overridden by `RUST_LOG`
    pub log_level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data/registry"),
            artifact_dir: PathBuf::from("data/artifacts"),
            listen_addr: "127.0.0.1:7878".into(),
            registry: RegistryConfig::default(),
            generation: GenerationConfig::default(),
            maintenance_interval_secs: 60,
            autosave_interval_secs: 30,
            bootstrap_planets: 3,
            worker_queue: 64,
            log_level: "info".into(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from `path`, or create it with defaults if missing
    pub fn load_or_create(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = fs::read_to_string(path)
                .with_context(|| format!("failed to read config file {}", path.display()))?;
            serde_json::from_str(&content)
                .with_context(|| format!("failed to parse config file {}", path.display()))
        } else {
            let config = Self::default();
            config.save(path)?;
            Ok(config)
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let content = serde_json::to_string_pretty(self).context("failed to serialize config")?;
        fs::write(path, content)
            .with_context(|| format!("failed to write config file {}", path.display()))
    }

    pub fn maintenance_interval(&self) -> Duration {
        Duration::from_secs(self.maintenance_interval_secs.max(1))
    }

    pub fn autosave_interval(&self) -> Duration {
        Duration::from_secs(self.autosave_interval_secs.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use planet_core::registry::ArchiveFidelity;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_is_created_with_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config").join("server.json");
        let config = ServerConfig::load_or_create(&path).unwrap();
        assert!(path.exists());
        assert_eq!(config, ServerConfig::default());
        assert_eq!(config.registry.max_planets, 100);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("server.json");
        fs::write(
            &path,
            r#"{ "bootstrap_planets": 0, "registry": { "archive_fidelity": "lossless" } }"#,
        )
        .unwrap();
        let config = ServerConfig::load_or_create(&path).unwrap();
        assert_eq!(config.bootstrap_planets, 0);
        assert_eq!(config.registry.archive_fidelity, ArchiveFidelity::Lossless);
        assert_eq!(config.registry.max_loaded, 10);
        assert_eq!(config.listen_addr, "127.0.0.1:7878");
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("server.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(ServerConfig::load_or_create(&path).is_err());
    }
}
