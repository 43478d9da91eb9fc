use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::context::normalize;

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub storage: StorageConfig,
    pub display: DisplayConfig,
    pub behavior: BehaviorConfig,
    pub history: HistoryConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct StorageConfig {
    // Directory holding the stores; empty means the directory the shell starts in
    pub state_dir: String,
    pub history_file: String,
    pub audit_file: String,
    pub trash_dir: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct DisplayConfig {
    pub language: String,
    // Window shown by `history` without a count
    pub history_default: usize,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct BehaviorConfig {
    pub confirm_recursive_delete: bool,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(default)]
pub struct HistoryConfig {
    // Put the entry back when its undo fails instead of dropping it
    pub restore_on_failed_undo: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            state_dir: String::new(),
            history_file: ".history".to_string(),
            audit_file: "shell.log".to_string(),
            trash_dir: ".trash".to_string(),
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            language: "auto".to_string(),
            history_default: 10,
        }
    }
}

impl Default for BehaviorConfig {
    fn default() -> Self {
        Self {
            confirm_recursive_delete: true,
        }
    }
}

/// Absolute locations of the three persisted stores.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct StatePaths {
    pub root: PathBuf,
    pub history: PathBuf,
    pub audit: PathBuf,
    pub trash: PathBuf,
}

impl Config {
    pub fn new() -> Result<Self> {
        let config_path = Self::get_config_path();

        if config_path.exists() {
            let content = fs::read_to_string(&config_path)
                .with_context(|| format!("cannot read {}", config_path.display()))?;
            let config: Config = toml::from_str(&content)
                .with_context(|| format!("invalid config {}", config_path.display()))?;
            Ok(config)
        } else {
            let config = Config::default();
            config.save()?;
            Ok(config)
        }
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::get_config_path();
        if let Some(config_dir) = config_path.parent() {
            fs::create_dir_all(config_dir)?;
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(&config_path, content)?;
        Ok(())
    }

    fn get_config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".fsh")
            .join("config.toml")
    }

    pub fn get_effective_language(&self) -> String {
        if self.display.language == "auto" {
            // Try to get system language
            std::env::var("LANG")
                .unwrap_or_else(|_| "en_US".to_string())
                .split('.')
                .next()
                .unwrap_or("en")
                .to_string()
        } else {
            self.display.language.clone()
        }
    }

    /// Resolves the store locations; relative entries hang off the state directory.
    pub fn state_paths(&self, launch_dir: &Path) -> StatePaths {
        let root = if self.storage.state_dir.trim().is_empty() {
            launch_dir.to_path_buf()
        } else {
            normalize(&launch_dir.join(&self.storage.state_dir))
        };
        StatePaths {
            history: root.join(&self.storage.history_file),
            audit: root.join(&self.storage.audit_file),
            trash: root.join(&self.storage.trash_dir),
            root,
        }
    }
}
