//! Remembered defaults between editing sessions.
//!
//! Unlike [`super::Config`], which the user edits, preferences are written by the editor
//! itself: last thickness, zoom, colors, font size and save directory. Losing them never
//! affects annotation correctness.

use anyhow::{Context, Result};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::draw::Color;

/// Key-value store for remembered defaults.
pub trait PreferenceStore {
    fn get_float(&self, key: &str, default: f64) -> f64;
    fn get_int(&self, key: &str, default: i64) -> i64;
    fn get_string(&self, key: &str, default: &str) -> String;
    fn set_float(&mut self, key: &str, value: f64);
    fn set_int(&mut self, key: &str, value: i64);
    fn set_string(&mut self, key: &str, value: &str);

    /// Persists pending changes. In-memory stores have nothing to do.
    fn flush(&mut self) -> Result<()> {
        Ok(())
    }

    /// Reads a color stored as four integer channels `<key>_r`, `<key>_g`, `<key>_b`,
    /// `<key>_a`.
    fn get_color(&self, key: &str, default: Color) -> Color {
        let channel = |suffix: &str, fallback: u8| -> u8 {
            let value = self.get_int(&format!("{key}_{suffix}"), fallback as i64);
            value.clamp(0, 255) as u8
        };
        Color::new(
            channel("r", default.r),
            channel("g", default.g),
            channel("b", default.b),
            channel("a", default.a),
        )
    }

    fn set_color(&mut self, key: &str, color: Color) {
        self.set_int(&format!("{key}_r"), color.r as i64);
        self.set_int(&format!("{key}_g"), color.g as i64);
        self.set_int(&format!("{key}_b"), color.b as i64);
        self.set_int(&format!("{key}_a"), color.a as i64);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
enum PreferenceValue {
    Int(i64),
    Float(f64),
    Text(String),
}

/// Preferences kept only for the lifetime of the process.
#[derive(Debug, Clone, Default)]
pub struct MemoryPreferences {
    values: BTreeMap<String, PreferenceValue>,
}

impl MemoryPreferences {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl PreferenceStore for MemoryPreferences {
    fn get_float(&self, key: &str, default: f64) -> f64 {
        match self.values.get(key) {
            Some(PreferenceValue::Float(value)) => *value,
            Some(PreferenceValue::Int(value)) => *value as f64,
            _ => default,
        }
    }

    fn get_int(&self, key: &str, default: i64) -> i64 {
        match self.values.get(key) {
            Some(PreferenceValue::Int(value)) => *value,
            _ => default,
        }
    }

    fn get_string(&self, key: &str, default: &str) -> String {
        match self.values.get(key) {
            Some(PreferenceValue::Text(value)) => value.clone(),
            _ => default.to_string(),
        }
    }

    fn set_float(&mut self, key: &str, value: f64) {
        if value.is_finite() {
            self.values
                .insert(key.to_string(), PreferenceValue::Float(value));
        }
    }

    fn set_int(&mut self, key: &str, value: i64) {
        self.values.insert(key.to_string(), PreferenceValue::Int(value));
    }

    fn set_string(&mut self, key: &str, value: &str) {
        self.values
            .insert(key.to_string(), PreferenceValue::Text(value.to_string()));
    }
}

/// Preferences persisted as a flat TOML table.
#[derive(Debug)]
pub struct TomlPreferences {
    path: PathBuf,
    values: MemoryPreferences,
    dirty: bool,
}

impl TomlPreferences {
    /// Default location: `~/.local/share/shotscribe/preferences.toml`.
    pub fn default_path() -> Result<PathBuf> {
        let data_dir = dirs::data_dir()
            .context("Could not find data directory")?
            .join("shotscribe");
        Ok(data_dir.join("preferences.toml"))
    }

    /// Opens the store at `path`; a missing file yields an empty store.
    pub fn open(path: &Path) -> Result<Self> {
        let values = if path.exists() {
            let text = fs::read_to_string(path)
                .with_context(|| format!("Failed to read preferences from {}", path.display()))?;
            let values: BTreeMap<String, PreferenceValue> = toml::from_str(&text)
                .with_context(|| format!("Failed to parse preferences from {}", path.display()))?;
            debug!("Loaded {} preferences from {}", values.len(), path.display());
            MemoryPreferences { values }
        } else {
            debug!("No preferences at {}, starting empty", path.display());
            MemoryPreferences::new()
        };
        Ok(Self {
            path: path.to_path_buf(),
            values,
            dirty: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PreferenceStore for TomlPreferences {
    fn get_float(&self, key: &str, default: f64) -> f64 {
        self.values.get_float(key, default)
    }

    fn get_int(&self, key: &str, default: i64) -> i64 {
        self.values.get_int(key, default)
    }

    fn get_string(&self, key: &str, default: &str) -> String {
        self.values.get_string(key, default)
    }

    fn set_float(&mut self, key: &str, value: f64) {
        self.values.set_float(key, value);
        self.dirty = true;
    }

    fn set_int(&mut self, key: &str, value: i64) {
        self.values.set_int(key, value);
        self.dirty = true;
    }

    fn set_string(&mut self, key: &str, value: &str) {
        self.values.set_string(key, value);
        self.dirty = true;
    }

    fn flush(&mut self) -> Result<()> {
        if !self.dirty {
            return Ok(());
        }
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).context("Failed to create preferences directory")?;
        }
        let text =
            toml::to_string_pretty(&self.values.values).context("Failed to serialize preferences")?;
        fs::write(&self.path, text)
            .with_context(|| format!("Failed to write preferences to {}", self.path.display()))?;
        self.dirty = false;
        info!("Saved preferences to {}", self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draw::color::{ORANGE, RED};

    #[test]
    fn memory_store_returns_defaults_for_missing_or_mistyped_keys() {
        let mut prefs = MemoryPreferences::new();
        assert_eq!(prefs.get_float("thickness", 3.0), 3.0);
        prefs.set_string("thickness", "thick");
        assert_eq!(prefs.get_float("thickness", 3.0), 3.0);
        prefs.set_int("thickness", 7);
        assert_eq!(prefs.get_float("thickness", 3.0), 7.0);
        prefs.set_float("zoom", f64::NAN);
        assert_eq!(prefs.get_float("zoom", 1.5), 1.5);
    }

    #[test]
    fn colors_are_stored_per_channel() {
        let mut prefs = MemoryPreferences::new();
        assert_eq!(prefs.get_color("drawing_color", RED), RED);
        prefs.set_color("drawing_color", ORANGE);
        assert_eq!(prefs.get_int("drawing_color_g", 0), ORANGE.g as i64);
        assert_eq!(prefs.get_color("drawing_color", RED), ORANGE);
        assert_eq!(prefs.len(), 4);
    }

    #[test]
    fn toml_store_persists_on_flush() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("preferences.toml");

        let mut prefs = TomlPreferences::open(&path).unwrap();
        prefs.set_float("log2_zoom", -1.5);
        prefs.set_int("font_size_px", 24);
        prefs.set_string("default_path", "/tmp/shots");
        prefs.flush().unwrap();

        let reopened = TomlPreferences::open(&path).unwrap();
        assert_eq!(reopened.get_float("log2_zoom", 0.0), -1.5);
        assert_eq!(reopened.get_int("font_size_px", 0), 24);
        assert_eq!(reopened.get_string("default_path", ""), "/tmp/shots");
    }
}
