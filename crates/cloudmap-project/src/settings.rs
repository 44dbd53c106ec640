use anyhow::{Context, Result};
use cloudmap_core::{CountFilter, LayoutDirection};
use cloudmap_graph::LayoutSettings;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const APP_DIR: &str = "cloudmap";
const SETTINGS_FILE: &str = "settings.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewSettings {
    /// Viewports narrower than this lay the tree out left to right.
    pub breakpoint_width: f32,
    pub layout: LayoutSettings,
    pub default_filter: CountFilter,
    #[serde(default = "default_true")]
    pub show_minimap: bool,
    #[serde(default = "default_true")]
    pub show_legend: bool,
}

fn default_true() -> bool {
    true
}

impl Default for ViewSettings {
    fn default() -> Self {
        Self {
            breakpoint_width: Self::DEFAULT_BREAKPOINT,
            layout: LayoutSettings::default(),
            default_filter: CountFilter::All,
            show_minimap: true,
            show_legend: true,
        }
    }
}

impl ViewSettings {
    pub const DEFAULT_BREAKPOINT: f32 = 768.0;

    pub fn direction_for(&self, width: f32) -> LayoutDirection {
        if width < self.breakpoint_width {
            LayoutDirection::Horizontal
        } else {
            LayoutDirection::Vertical
        }
    }

    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR).join(SETTINGS_FILE))
    }

    /// Loads from the user config dir, falling back to defaults.
    pub fn load() -> Self {
        match Self::default_path() {
            Some(path) => Self::load_or_default(&path),
            None => {
                tracing::info!("No config directory, using default view settings");
                Self::default()
            }
        }
    }

    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            tracing::info!("Settings file {:?} not found, using defaults", path);
            return Self::default();
        }
        match Self::load_from(path) {
            Ok(settings) => {
                tracing::info!("Settings loaded from {:?}", path);
                settings
            }
            Err(e) => {
                tracing::error!("Failed to load settings: {:#}", e);
                Self::default()
            }
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading settings file {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("parsing settings file {}", path.display()))
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content).with_context(|| format!("writing {}", path.display()))?;
        Ok(())
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::default_path().context("no config directory on this platform")?;
        self.save_to(&path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_direction_breakpoint() {
        let settings = ViewSettings::default();
        assert_eq!(settings.direction_for(375.0), LayoutDirection::Horizontal);
        assert_eq!(settings.direction_for(767.9), LayoutDirection::Horizontal);
        assert_eq!(settings.direction_for(768.0), LayoutDirection::Vertical);
        assert_eq!(settings.direction_for(1920.0), LayoutDirection::Vertical);
    }

    #[test]
    fn test_partial_file_keeps_defaults() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{ "breakpoint_width": 1024, "default_filter": "alerts" }"#)?;

        let settings = ViewSettings::load_from(&path)?;
        assert_eq!(settings.breakpoint_width, 1024.0);
        assert_eq!(settings.default_filter, CountFilter::Alerts);
        assert_eq!(settings.layout, LayoutSettings::default());
        assert!(settings.show_minimap);
        assert!(settings.show_legend);
        Ok(())
    }

    #[test]
    fn test_save_and_reload() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("nested").join("settings.json");

        let mut settings = ViewSettings::default();
        settings.show_minimap = false;
        settings.layout.node_width = 200.0;
        settings.save_to(&path)?;

        assert_eq!(ViewSettings::load_from(&path)?, settings);
        Ok(())
    }

    #[test]
    fn test_broken_file_falls_back() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("settings.json");
        fs::write(&path, "{ not json")?;

        assert!(ViewSettings::load_from(&path).is_err());
        assert_eq!(ViewSettings::load_or_default(&path), ViewSettings::default());
        assert_eq!(
            ViewSettings::load_or_default(&dir.path().join("missing.json")),
            ViewSettings::default()
        );
        Ok(())
    }
}
