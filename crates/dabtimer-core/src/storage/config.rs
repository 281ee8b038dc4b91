//! TOML-based application configuration.
//!
//! Stores front-end preferences that are not part of the state blob:
//! - Frame loop cadence for `timer watch`
//! - Storage key and log display limit
//!
//! Configuration is stored at `~/.config/dabtimer/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::data_dir;
use super::state_store::STATE_KEY;
use crate::error::{ConfigError, CoreError};

/// Frame loop configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimerConfig {
    /// Delay between frames while watching a running session.
    #[serde(default = "default_frame_interval_ms")]
    pub frame_interval_ms: u64,
    /// Give up watching after this long even if the session is still running.
    #[serde(default = "default_watch_limit_secs")]
    pub watch_limit_secs: u64,
}

/// Storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// kv key holding the state blob.
    #[serde(default = "default_key")]
    pub key: String,
    /// Rows shown by `stats log` when no limit is given.
    #[serde(default = "default_log_display_limit")]
    pub log_display_limit: usize,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/dabtimer/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub timer: TimerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

fn default_frame_interval_ms() -> u64 {
    100
}
fn default_watch_limit_secs() -> u64 {
    3600
}
fn default_key() -> String {
    STATE_KEY.into()
}
fn default_log_display_limit() -> usize {
    120
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            frame_interval_ms: default_frame_interval_ms(),
            watch_limit_secs: default_watch_limit_secs(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            key: default_key(),
            log_display_limit: default_log_display_limit(),
        }
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let (parents, leaf) = match key.rsplit_once('.') {
            Some((parents, leaf)) => (Some(parents), leaf),
            None => (None, key),
        };
        if leaf.is_empty() {
            return Err(unknown());
        }

        let mut current = root;
        if let Some(parents) = parents {
            for part in parents.split('.') {
                current = current.get_mut(part).ok_or_else(unknown)?;
            }
        }
        let obj = current.as_object_mut().ok_or_else(unknown)?;
        let existing = obj.get(leaf).ok_or_else(unknown)?;

        let new_value = match existing {
            serde_json::Value::Bool(_) => serde_json::Value::Bool(
                value
                    .parse::<bool>()
                    .map_err(|e| invalid(e.to_string()))?,
            ),
            serde_json::Value::Number(_) => {
                let n = value
                    .parse::<u64>()
                    .map_err(|_| invalid(format!("cannot parse '{value}' as number")))?;
                serde_json::Value::Number(n.into())
            }
            serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
            }
            _ => serde_json::Value::String(value.into()),
        };

        obj.insert(leaf.to_string(), new_value);
        Ok(())
    }

    /// `~/.config/dabtimer/config.toml`
    pub fn path() -> Result<PathBuf, CoreError> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from the default path, writing defaults when the file is missing.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, CoreError> {
        Self::load_from(Self::path()?)
    }

    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, CoreError> {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(content) => {
                toml::from_str(&content).map_err(|e| ConfigError::ParseFailed(e.to_string()).into())
            }
            Err(_) => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
        }
    }

    /// Load from disk, returning default on error.
    /// This is a convenience method that never fails.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "config unreadable, using defaults");
            Self::default()
        })
    }

    /// Persist to the default path.
    pub fn save(&self) -> Result<(), CoreError> {
        self.save_to(Self::path()?)
    }

    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<(), CoreError> {
        let path = path.as_ref();
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))?;
        Ok(())
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by dot-separated key. Does not save.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value cannot be parsed.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), CoreError> {
        let mut json = serde_json::to_value(&*self)?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        *self = serde_json::from_value(json)?;
        Ok(())
    }

    /// Frame interval, never below one millisecond.
    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.timer.frame_interval_ms.max(1))
    }

    pub fn watch_limit(&self) -> Duration {
        Duration::from_secs(self.timer.watch_limit_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::default();
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.timer.frame_interval_ms, 100);
        assert_eq!(parsed.storage.key, STATE_KEY);
    }

    #[test]
    fn missing_sections_take_defaults() {
        let parsed: Config = toml::from_str("[timer]\nframe_interval_ms = 250\n").unwrap();
        assert_eq!(parsed.timer.frame_interval_ms, 250);
        assert_eq!(parsed.timer.watch_limit_secs, 3600);
        assert_eq!(parsed.storage.log_display_limit, 120);
    }

    #[test]
    fn get_supports_dot_path_keys() {
        let cfg = Config::default();
        assert_eq!(cfg.get("timer.frame_interval_ms").as_deref(), Some("100"));
        assert_eq!(cfg.get("storage.key").as_deref(), Some(STATE_KEY));
        assert!(cfg.get("timer.missing_key").is_none());
        assert!(cfg.get("").is_none());
    }

    #[test]
    fn set_updates_number_and_string() {
        let mut cfg = Config::default();
        cfg.set("timer.frame_interval_ms", "40").unwrap();
        cfg.set("storage.key", "other").unwrap();
        assert_eq!(cfg.timer.frame_interval_ms, 40);
        assert_eq!(cfg.storage.key, "other");
    }

    #[test]
    fn set_rejects_unknown_key_and_bad_type() {
        let mut cfg = Config::default();
        assert!(cfg.set("timer.nonexistent", "1").is_err());
        assert!(cfg.set("timer.frame_interval_ms", "fast").is_err());
        assert!(cfg.set("nope.nested.deep", "1").is_err());
        assert_eq!(cfg.timer.frame_interval_ms, 100);
    }

    #[test]
    fn load_from_missing_file_writes_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let cfg = Config::load_from(&path).unwrap();
        assert_eq!(cfg.timer.frame_interval_ms, 100);
        assert!(path.exists());

        std::fs::write(&path, "timer = 5").unwrap();
        assert!(Config::load_from(&path).is_err());
    }

    #[test]
    fn frame_interval_has_floor() {
        let mut cfg = Config::default();
        cfg.timer.frame_interval_ms = 0;
        assert_eq!(cfg.frame_interval(), Duration::from_millis(1));
    }
}
