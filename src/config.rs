//! Persisted user settings (lives in the OS config directory).
//!
//! Every field carries a default so a partial or older `settings.json`
//! still loads; missing keys fall back to the built-in values.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Result, ScheduleError};
use crate::layout::LayoutMetrics;

const SETTINGS_FILE: &str = "settings.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Smallest pixel width a day may shrink to before zoom is applied.
    pub min_day_width: f32,
    pub row_height: f32,
    /// Vertical inset so bars don't touch row edges.
    pub bar_inset: f32,
    pub handle_width: f32,
    pub connector_radius: f32,
    /// Days of padding before the earliest task start.
    pub grid_lead_days: i64,
    /// Days of padding after the latest task end.
    pub grid_trail_days: i64,
    /// Log level name; `None` defers to the `GANTT_LOG` environment variable.
    pub log_level: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            min_day_width: 18.0,
            row_height: 32.0,
            bar_inset: 5.0,
            handle_width: 7.0,
            connector_radius: 5.0,
            grid_lead_days: 5,
            grid_trail_days: 10,
            log_level: None,
        }
    }
}

impl Settings {
    /// Path of the settings file in the platform config directory.
    pub fn default_path() -> Result<PathBuf> {
        ProjectDirs::from("com", "gantt-scheduler", "GanttScheduler")
            .map(|dirs| dirs.config_dir().join(SETTINGS_FILE))
            .ok_or(ScheduleError::NoConfigDir)
    }

    /// Load settings from the default location, writing defaults on first run.
    ///
    /// Never fails: any problem falls back to the defaults and is returned
    /// in [`LoadedSettings::warnings`], since logging is usually not
    /// installed yet when this runs.
    pub fn load_or_default() -> LoadedSettings {
        Self::load_or_default_at(Self::default_path())
    }

    pub fn load_or_default_at(path: Result<PathBuf>) -> LoadedSettings {
        let path = match path {
            Ok(p) => p,
            Err(e) => return LoadedSettings::fallback(format!("{e}; using default settings")),
        };

        if !path.exists() {
            let settings = Self::default();
            let mut warnings = Vec::new();
            if let Err(e) = settings.save(&path) {
                warnings.push(format!("Could not write default settings to {:?}: {e}", path));
            }
            return LoadedSettings { settings, warnings };
        }

        match Self::load(&path) {
            Ok(settings) => LoadedSettings {
                settings,
                warnings: Vec::new(),
            },
            Err(e) => LoadedSettings::fallback(format!(
                "Failed to parse settings {:?}: {e}; using defaults",
                path
            )),
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let settings = serde_json::from_str(&json)?;
        debug!("Loaded settings from {:?}", path);
        Ok(settings)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    pub fn log_level(&self) -> Option<tracing::Level> {
        self.log_level
            .as_deref()
            .and_then(crate::logging::parse_level_str)
    }

    pub fn layout_metrics(&self) -> LayoutMetrics {
        LayoutMetrics {
            min_day_width: self.min_day_width,
            row_height: self.row_height,
            bar_inset: self.bar_inset,
            handle_width: self.handle_width,
            connector_radius: self.connector_radius,
            grid_lead_days: self.grid_lead_days,
            grid_trail_days: self.grid_trail_days,
        }
    }
}

/// Result of [`Settings::load_or_default`].
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedSettings {
    pub settings: Settings,
    /// Problems that forced a fallback, to be logged once logging is up.
    pub warnings: Vec<String>,
}

impl LoadedSettings {
    fn fallback(warning: String) -> Self {
        Self {
            settings: Settings::default(),
            warnings: vec![warning],
        }
    }

    /// Emit the collected warnings through `tracing`.
    pub fn report(&self) {
        for w in &self.warnings {
            warn!("{w}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let s: Settings = serde_json::from_str(r#"{ "row_height": 40.0 }"#).unwrap();
        assert_eq!(s.row_height, 40.0);
        assert_eq!(s.grid_lead_days, 5);
        assert_eq!(s.grid_trail_days, 10);
    }

    #[test]
    fn save_then_load_preserves_values() {
        let dir = std::env::temp_dir().join(format!("gantt-settings-{}", uuid::Uuid::new_v4()));
        let path = dir.join(SETTINGS_FILE);
        let mut s = Settings::default();
        s.min_day_width = 24.0;
        s.log_level = Some("debug".into());
        s.save(&path).unwrap();

        let loaded = Settings::load(&path).unwrap();
        assert_eq!(loaded, s);
        assert_eq!(loaded.log_level(), Some(tracing::Level::DEBUG));
        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = std::env::temp_dir().join(format!("gantt-settings-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(SETTINGS_FILE);
        std::fs::write(&path, "not json").unwrap();
        assert!(matches!(Settings::load(&path), Err(ScheduleError::Json(_))));

        let loaded = Settings::load_or_default_at(Ok(path));
        assert_eq!(loaded.settings, Settings::default());
        assert_eq!(loaded.warnings.len(), 1);
        assert!(loaded.warnings[0].contains("Failed to parse settings"));
        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn first_run_writes_defaults_without_warnings() {
        let dir = std::env::temp_dir().join(format!("gantt-settings-{}", uuid::Uuid::new_v4()));
        let path = dir.join(SETTINGS_FILE);
        let loaded = Settings::load_or_default_at(Ok(path.clone()));
        assert!(loaded.warnings.is_empty());
        assert!(path.exists());
        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn missing_config_dir_is_reported() {
        let loaded = Settings::load_or_default_at(Err(ScheduleError::NoConfigDir));
        assert_eq!(loaded.settings, Settings::default());
        assert_eq!(loaded.warnings.len(), 1);
    }
}
