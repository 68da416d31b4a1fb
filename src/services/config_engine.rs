// anistream Config Engine
// Loads, saves and edits the application configuration, stored as a JSON
// file at the platform config path.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::platform;
use crate::types::config::AppConfig;
use crate::types::errors::ConfigError;

/// Trait defining the config engine interface.
pub trait ConfigEngineTrait {
    fn load(&mut self) -> Result<AppConfig, ConfigError>;
    fn save(&self) -> Result<(), ConfigError>;
    fn config(&self) -> &AppConfig;
    fn set_value(&mut self, key: &str, value: Value) -> Result<(), ConfigError>;
    fn reset(&mut self) -> Result<(), ConfigError>;
    fn config_path(&self) -> &Path;
}

/// Config engine persisting [`AppConfig`] as pretty-printed JSON.
pub struct ConfigEngine {
    config_path: PathBuf,
    config: AppConfig,
}

impl ConfigEngine {
    /// Creates an engine for `path_override`, or the platform path when `None`.
    pub fn new(path_override: Option<PathBuf>) -> Self {
        Self {
            config_path: path_override.unwrap_or_else(platform::get_config_path),
            config: AppConfig::default(),
        }
    }

    /// Engine holding the given config in memory; nothing is read from disk until `load`.
    pub fn with_config(path: PathBuf, config: AppConfig) -> Self {
        Self { config_path: path, config }
    }
}

/// Walks `parts` into `root` and replaces the leaf. Every segment must already exist.
fn set_path(root: &mut Value, key: &str, parts: &[&str], value: Value) -> Result<(), ConfigError> {
    let (leaf, parents) = parts
        .split_last()
        .ok_or_else(|| ConfigError::InvalidKey("Key cannot be empty".to_string()))?;

    let mut current = root;
    for part in parents {
        current = current
            .get_mut(*part)
            .ok_or_else(|| ConfigError::InvalidKey(format!("Key '{}' not found in config", key)))?;
    }

    match current {
        Value::Object(map) if map.contains_key(*leaf) => {
            map.insert(leaf.to_string(), value);
            Ok(())
        }
        Value::Object(_) => Err(ConfigError::InvalidKey(format!(
            "Key '{}' not found in config",
            key
        ))),
        _ => Err(ConfigError::InvalidKey(format!(
            "Cannot navigate to key '{}': intermediate value is not an object",
            key
        ))),
    }
}

/// Range checks the types alone cannot express.
fn validate(config: &AppConfig) -> Result<(), ConfigError> {
    let playback = &config.playback;
    if !(playback.completion_ratio > 0.0 && playback.completion_ratio <= 1.0) {
        return Err(ConfigError::InvalidValue(format!(
            "playback.completion_ratio must be in (0, 1], got {}",
            playback.completion_ratio
        )));
    }
    if !(playback.resume_threshold_secs.is_finite() && playback.resume_threshold_secs >= 0.0) {
        return Err(ConfigError::InvalidValue(format!(
            "playback.resume_threshold_secs must be a non-negative number, got {}",
            playback.resume_threshold_secs
        )));
    }
    if playback.save_interval_secs == 0 {
        return Err(ConfigError::InvalidValue(
            "playback.save_interval_secs must be at least 1".to_string(),
        ));
    }
    Ok(())
}

impl ConfigEngineTrait for ConfigEngine {
    /// Loads the config file. A missing file yields defaults; a malformed one is an error.
    fn load(&mut self) -> Result<AppConfig, ConfigError> {
        if !self.config_path.exists() {
            tracing::debug!(path = %self.config_path.display(), "no config file, using defaults");
            self.config = AppConfig::default();
            return Ok(self.config.clone());
        }

        let content = fs::read_to_string(&self.config_path)
            .map_err(|e| ConfigError::IoError(format!("Failed to read config file: {}", e)))?;

        let config: AppConfig = serde_json::from_str(&content).map_err(|e| {
            ConfigError::SerializationError(format!("Failed to parse config file: {}", e))
        })?;
        validate(&config)?;
        self.config = config;
        tracing::info!(path = %self.config_path.display(), "loaded config");
        Ok(self.config.clone())
    }

    fn save(&self) -> Result<(), ConfigError> {
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                ConfigError::IoError(format!("Failed to create config directory: {}", e))
            })?;
        }

        let json = serde_json::to_string_pretty(&self.config).map_err(|e| {
            ConfigError::SerializationError(format!("Failed to serialize config: {}", e))
        })?;

        fs::write(&self.config_path, json)
            .map_err(|e| ConfigError::IoError(format!("Failed to write config file: {}", e)))
    }

    fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Updates one value by dot-separated path, e.g. `playback.resume_threshold_secs`,
    /// validates the result against [`AppConfig`] and its ranges, and saves.
    fn set_value(&mut self, key: &str, value: Value) -> Result<(), ConfigError> {
        if key.trim().is_empty() {
            return Err(ConfigError::InvalidKey("Key cannot be empty".to_string()));
        }
        let parts: Vec<&str> = key.split('.').collect();

        let mut json_value = serde_json::to_value(&self.config).map_err(|e| {
            ConfigError::SerializationError(format!("Failed to serialize config: {}", e))
        })?;
        set_path(&mut json_value, key, &parts, value)?;

        let config: AppConfig = serde_json::from_value(json_value).map_err(|e| {
            ConfigError::InvalidValue(format!("Invalid value for key '{}': {}", key, e))
        })?;
        validate(&config)?;
        self.config = config;
        self.save()
    }

    fn reset(&mut self) -> Result<(), ConfigError> {
        self.config = AppConfig::default();
        self.save()
    }

    fn config_path(&self) -> &Path {
        &self.config_path
    }
}
