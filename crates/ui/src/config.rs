//! Theme/config store with JSON persistence.
//!
//! Holds the named values that style rules can reference instead of literal
//! colors (see [`ConfigSource`]). Because keys are resolved at
//! style-application time, editing and reloading the config file changes
//! already-declared widgets on the next frame.
//!
//! ## File location
//!
//! `<config dir>/mosaic/config.json`, e.g. `~/.config/mosaic/config.json`
//! on Linux.
//!
//! ## Schema version
//!
//! The file carries a schema version. A mismatch discards the file and
//! starts from defaults (graceful degradation, never a startup failure).

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::geom::Rgba;
use crate::style::ConfigSource;

/// Current schema version for the config file.
///
/// Increment this when making breaking changes to the config format.
const SCHEMA_VERSION: u32 = 1;

/// Application name used for the config directory.
const APP_NAME: &str = "mosaic";

/// Config file name.
const CONFIG_FILENAME: &str = "config.json";

/// One configurable value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ConfigValue {
    Color { rgba: Rgba },
    Number { value: f64 },
    Text { value: String },
    Flag { value: bool },
}

/// The persisted document.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ConfigData {
    schema_version: u32,
    values: HashMap<String, ConfigValue>,
}

/// Named-value store backing config-keyed style values.
#[derive(Debug, Clone, Default)]
pub struct Config {
    values: HashMap<String, ConfigValue>,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a value under a key, replacing any previous value.
    pub fn set(&mut self, key: &str, value: ConfigValue) {
        self.values.insert(key.to_string(), value);
    }

    pub fn get(&self, key: &str) -> Option<&ConfigValue> {
        self.values.get(key)
    }

    /// Returns the default config file path, or `None` when the platform
    /// has no config directory.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_NAME).join(CONFIG_FILENAME))
    }

    /// Loads a config file. A missing file, unreadable JSON, or a schema
    /// mismatch yields defaults — a broken theme must not block startup.
    pub fn load(path: &Path) -> Self {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(err) => {
                debug!(?path, %err, "no config file; using defaults");
                return Self::default();
            }
        };

        let data: ConfigData = match serde_json::from_str(&contents) {
            Ok(data) => data,
            Err(err) => {
                warn!(?path, %err, "config file unreadable; using defaults");
                return Self::default();
            }
        };

        if data.schema_version != SCHEMA_VERSION {
            warn!(
                found = data.schema_version,
                expected = SCHEMA_VERSION,
                "config schema mismatch; using defaults"
            );
            return Self::default();
        }

        Self {
            values: data.values,
        }
    }

    /// Saves the config atomically: write to a temp file in the same
    /// directory, then rename over the target.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating config dir {}", parent.display()))?;
        }

        let data = ConfigData {
            schema_version: SCHEMA_VERSION,
            values: self.values.clone(),
        };
        let json = serde_json::to_string_pretty(&data).context("serializing config")?;

        let temp_path = path.with_extension("json.tmp");
        fs::write(&temp_path, json)
            .with_context(|| format!("writing {}", temp_path.display()))?;
        fs::rename(&temp_path, path)
            .with_context(|| format!("renaming into {}", path.display()))?;
        Ok(())
    }
}

impl ConfigSource for Config {
    fn color(&self, key: &str) -> Option<Rgba> {
        match self.values.get(key) {
            Some(ConfigValue::Color { rgba }) => Some(*rgba),
            _ => None,
        }
    }

    fn number(&self, key: &str) -> Option<f64> {
        match self.values.get(key) {
            Some(ConfigValue::Number { value }) => Some(*value),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Config {
        let mut config = Config::new();
        config.set(
            "editor.background",
            ConfigValue::Color {
                rgba: [0.1, 0.1, 0.15, 1.0],
            },
        );
        config.set("editor.tab_width", ConfigValue::Number { value: 4.0 });
        config.set(
            "editor.font",
            ConfigValue::Text {
                value: "monospace".to_string(),
            },
        );
        config
    }

    #[test]
    fn test_save_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let config = sample();
        config.save(&path).unwrap();

        let loaded = Config::load(&path);
        assert_eq!(loaded.color("editor.background"), Some([0.1, 0.1, 0.15, 1.0]));
        assert_eq!(loaded.number("editor.tab_width"), Some(4.0));
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(&dir.path().join("absent.json"));
        assert!(config.get("anything").is_none());
    }

    #[test]
    fn test_garbage_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{not json").unwrap();

        let config = Config::load(&path);
        assert!(config.get("anything").is_none());
    }

    #[test]
    fn test_schema_mismatch_discards_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(
            &path,
            r#"{"schema_version": 999, "values": {"k": {"type": "flag", "value": true}}}"#,
        )
        .unwrap();

        let config = Config::load(&path);
        assert!(config.get("k").is_none());
    }

    #[test]
    fn test_wrong_value_kind_resolves_to_none() {
        let config = sample();
        // A text value queried as a color is None, not a panic.
        assert_eq!(config.color("editor.font"), None);
        assert_eq!(config.number("editor.font"), None);
    }

    #[test]
    fn test_no_stale_temp_file_after_save() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        sample().save(&path).unwrap();
        assert!(path.exists());
        assert!(!path.with_extension("json.tmp").exists());
    }
}
