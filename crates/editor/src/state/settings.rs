//! Editor settings

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::history::{DEFAULT_CAPACITY, DEFAULT_DEBOUNCE};
use super::store::DEFAULT_DUPLICATE_OFFSET;

/// Undo/redo behaviour
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistorySettings {
    /// Maximum number of undo entries kept
    pub capacity: usize,
    /// Coalescing window for inspector and gizmo edits
    pub debounce_ms: u64,
}

impl Default for HistorySettings {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            debounce_ms: DEFAULT_DEBOUNCE.as_millis() as u64,
        }
    }
}

impl HistorySettings {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

/// Editor settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditorSettings {
    #[serde(default)]
    pub history: HistorySettings,
    /// Offset applied to duplicated entities
    #[serde(default = "default_duplicate_offset")]
    pub duplicate_offset: [f64; 3],
    /// Save the project to the data dir after every history entry
    #[serde(default)]
    pub autosave: bool,
}

fn default_duplicate_offset() -> [f64; 3] {
    DEFAULT_DUPLICATE_OFFSET
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            history: HistorySettings::default(),
            duplicate_offset: DEFAULT_DUPLICATE_OFFSET,
            autosave: false,
        }
    }
}

impl EditorSettings {
    fn config_path() -> Option<std::path::PathBuf> {
        directories::ProjectDirs::from("com", "scene-editor", "scene-editor")
            .map(|dirs| dirs.config_dir().join("settings.json"))
    }

    /// Load settings from file, or return default if not found
    pub fn load() -> Self {
        Self::config_path()
            .map(|path| Self::load_from(&path))
            .unwrap_or_default()
    }

    /// Save settings to file
    pub fn save(&self) {
        if let Some(path) = Self::config_path() {
            if let Err(e) = self.save_to(&path) {
                tracing::warn!("failed to save settings: {}", e);
            }
        }
    }

    /// Missing or malformed files fall back to defaults
    pub fn load_from(path: &Path) -> Self {
        let Ok(json) = std::fs::read_to_string(path) else {
            return Self::default();
        };
        match serde_json::from_str(&json) {
            Ok(settings) => settings,
            Err(e) => {
                tracing::warn!("ignoring malformed settings {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    pub fn save_to(&self, path: &Path) -> std::io::Result<()> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(path, json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let s = EditorSettings::default();
        assert_eq!(s.history.capacity, 50);
        assert_eq!(s.history.debounce(), Duration::from_millis(250));
        assert_eq!(s.duplicate_offset, [1.0, 0.0, 1.0]);
        assert!(!s.autosave);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let s: EditorSettings = serde_json::from_str(r#"{"autosave": true}"#).unwrap();
        assert!(s.autosave);
        assert_eq!(s.history, HistorySettings::default());
    }

    #[test]
    fn test_save_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cfg").join("settings.json");
        let mut s = EditorSettings::default();
        s.history.capacity = 7;
        s.duplicate_offset = [0.0, 2.0, 0.0];
        s.save_to(&path).unwrap();
        assert_eq!(EditorSettings::load_from(&path), s);
    }

    #[test]
    fn test_malformed_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "capacity = 3").unwrap();
        assert_eq!(EditorSettings::load_from(&path), EditorSettings::default());
        assert_eq!(
            EditorSettings::load_from(&dir.path().join("absent.json")),
            EditorSettings::default()
        );
    }
}
