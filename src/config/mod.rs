//! HTT-WoW Configuration System
//!
//! Loads configuration from YAML files with a cascading priority system:
//! 1. `./htt-wow.yaml` (current directory - highest priority)
//! 2. `~/.config/htt-wow/htt-wow.yaml` (user config directory)
//! 3. `/etc/htt-wow/htt-wow.yaml` (system - lowest priority)
//!
//! Values from higher priority files override those from lower priority files.
//!
//! # YAML Structure
//!
//! ```yaml
//! host:
//!   max_interfaces: 4
//! capabilities:
//!   address_width: addr64
//!   tx_completion: bulk_credit
//!   max_tx_queue_groups: 8
//!   tx_msdu_desc_ext: true
//! ```
//!
//! Every field is optional; an empty file yields the defaults.

mod host;

use crate::negotiate::Capabilities;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub use host::HostConfig;

/// Default config filename.
const CONFIG_FILENAME: &str = "htt-wow.yaml";

/// Directory name under the system and user config roots.
const CONFIG_DIR: &str = "htt-wow";

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    ParseYaml {
        path: PathBuf,
        source: serde_yaml::Error,
    },
}

/// Root configuration structure.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Host limits (`host.*`).
    #[serde(default)]
    pub host: HostConfig,

    /// Capabilities advertised in VERSION_REQ (`capabilities.*`).
    #[serde(default)]
    pub capabilities: Capabilities,
}

impl Config {
    /// Create a new default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from the standard search paths.
    ///
    /// Returns a tuple of (config, paths_loaded) where paths_loaded contains
    /// the paths that were successfully loaded.
    pub fn load() -> Result<(Self, Vec<PathBuf>), ConfigError> {
        let search_paths = Self::search_paths();
        Self::load_from_paths(&search_paths)
    }

    /// Load configuration from specific paths.
    ///
    /// Paths are processed in order, with later paths overriding earlier ones.
    pub fn load_from_paths(paths: &[PathBuf]) -> Result<(Self, Vec<PathBuf>), ConfigError> {
        let mut config = Config::default();
        let mut loaded_paths = Vec::new();

        for path in paths {
            if path.exists() {
                let file_config = Self::load_file(path)?;
                config.merge(file_config);
                loaded_paths.push(path.clone());
            }
        }

        Ok((config, loaded_paths))
    }

    /// Load configuration from a single file.
    pub fn load_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
            path: path.to_path_buf(),
            source: e,
        })?;

        // serde_yaml rejects an empty document for a struct
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }

        serde_yaml::from_str(&contents).map_err(|e| ConfigError::ParseYaml {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Get the standard search paths in priority order (lowest to highest).
    pub fn search_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();

        // System config (lowest priority)
        paths.push(PathBuf::from("/etc").join(CONFIG_DIR).join(CONFIG_FILENAME));

        // User config directory
        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join(CONFIG_DIR).join(CONFIG_FILENAME));
        }

        // Current directory (highest priority)
        paths.push(PathBuf::from(".").join(CONFIG_FILENAME));

        paths
    }

    /// Merge another configuration into this one.
    ///
    /// Values from `other` override values in `self` when they differ from
    /// the defaults.
    pub fn merge(&mut self, other: Config) {
        let defaults = Config::default();

        if other.host.max_interfaces != defaults.host.max_interfaces {
            self.host.max_interfaces = other.host.max_interfaces;
        }

        let caps = other.capabilities;
        if caps.address_width != defaults.capabilities.address_width {
            self.capabilities.address_width = caps.address_width;
        }
        if caps.tx_completion != defaults.capabilities.tx_completion {
            self.capabilities.tx_completion = caps.tx_completion;
        }
        if caps.max_tx_queue_groups != defaults.capabilities.max_tx_queue_groups {
            self.capabilities.max_tx_queue_groups = caps.max_tx_queue_groups;
        }
        if caps.tx_msdu_desc_ext {
            self.capabilities.tx_msdu_desc_ext = true;
        }
    }

    /// Serialize this configuration to YAML.
    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::negotiate::TxCompletionMode;
    use crate::protocol::AddressWidth;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_empty_config() {
        let config = Config::new();
        assert_eq!(config.host.max_interfaces, 4);
        assert_eq!(config.capabilities, Capabilities::default());
        assert_eq!(config.host.dispatch().max_interfaces, 4);
    }

    #[test]
    fn test_parse_yaml_full() {
        let yaml = r#"
host:
  max_interfaces: 2
capabilities:
  address_width: addr64
  tx_completion: bulk_credit
  max_tx_queue_groups: 8
  tx_msdu_desc_ext: true
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.host.max_interfaces, 2);
        assert_eq!(config.capabilities.address_width, AddressWidth::Addr64);
        assert_eq!(config.capabilities.tx_completion, TxCompletionMode::BulkCredit);
        assert_eq!(config.capabilities.max_tx_queue_groups, 8);
        assert!(config.capabilities.tx_msdu_desc_ext);
    }

    #[test]
    fn test_parse_yaml_partial() {
        let yaml = r#"
capabilities:
  max_tx_queue_groups: 3
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.host.max_interfaces, 4);
        assert_eq!(config.capabilities.max_tx_queue_groups, 3);
        assert_eq!(config.capabilities.address_width, AddressWidth::Addr32);
    }

    #[test]
    fn test_parse_yaml_rejects_bad_width() {
        let yaml = r#"
capabilities:
  address_width: addr48
"#;
        assert!(serde_yaml::from_str::<Config>(yaml).is_err());
    }

    #[test]
    fn test_merge_configs() {
        let mut base = Config::new();
        base.host.max_interfaces = 8;
        base.capabilities.max_tx_queue_groups = 2;

        let mut override_config = Config::new();
        override_config.capabilities.max_tx_queue_groups = 6;
        override_config.capabilities.address_width = AddressWidth::Addr64;

        base.merge(override_config);
        assert_eq!(base.host.max_interfaces, 8);
        assert_eq!(base.capabilities.max_tx_queue_groups, 6);
        assert_eq!(base.capabilities.address_width, AddressWidth::Addr64);
    }

    #[test]
    fn test_load_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("htt-wow.yaml");
        fs::write(&config_path, "host:\n  max_interfaces: 1\n").unwrap();

        let config = Config::load_file(&config_path).unwrap();
        assert_eq!(config.host.max_interfaces, 1);
    }

    #[test]
    fn test_load_empty_file() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("htt-wow.yaml");
        fs::write(&config_path, "").unwrap();

        assert_eq!(Config::load_file(&config_path).unwrap(), Config::default());
    }

    #[test]
    fn test_load_invalid_yaml() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("htt-wow.yaml");
        fs::write(&config_path, "host: [unclosed").unwrap();

        assert!(matches!(
            Config::load_file(&config_path),
            Err(ConfigError::ParseYaml { .. })
        ));
    }

    #[test]
    fn test_load_from_paths_merges() {
        let temp_dir = TempDir::new().unwrap();
        let low_priority = temp_dir.path().join("low.yaml");
        let high_priority = temp_dir.path().join("high.yaml");

        fs::write(
            &low_priority,
            r#"
host:
  max_interfaces: 2
capabilities:
  tx_completion: bulk_credit
"#,
        )
        .unwrap();
        fs::write(
            &high_priority,
            r#"
host:
  max_interfaces: 3
"#,
        )
        .unwrap();

        let paths = vec![low_priority, high_priority];
        let (config, loaded) = Config::load_from_paths(&paths).unwrap();

        assert_eq!(loaded.len(), 2);
        assert_eq!(config.host.max_interfaces, 3);
        assert_eq!(config.capabilities.tx_completion, TxCompletionMode::BulkCredit);
    }

    #[test]
    fn test_load_skips_missing_files() {
        let temp_dir = TempDir::new().unwrap();
        let existing = temp_dir.path().join("exists.yaml");
        let missing = temp_dir.path().join("missing.yaml");
        fs::write(&existing, "host:\n  max_interfaces: 6\n").unwrap();

        let paths = vec![missing, existing.clone()];
        let (config, loaded) = Config::load_from_paths(&paths).unwrap();

        assert_eq!(loaded, vec![existing]);
        assert_eq!(config.host.max_interfaces, 6);
    }

    #[test]
    fn test_search_paths_includes_expected() {
        let paths = Config::search_paths();

        assert!(paths.iter().all(|p| p.ends_with("htt-wow.yaml")));
        assert!(paths.iter().any(|p| p.starts_with("/etc/htt-wow")));
        assert_eq!(paths.last(), Some(&PathBuf::from("./htt-wow.yaml")));
    }

    #[test]
    fn test_to_yaml_round_trip() {
        let mut config = Config::new();
        config.capabilities.tx_completion = TxCompletionMode::BulkCredit;

        let yaml = config.to_yaml().unwrap();
        assert!(yaml.contains("host:"));
        assert!(yaml.contains("tx_completion: bulk_credit"));
        let parsed: Config = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed, config);
    }
}
