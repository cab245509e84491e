//! Snapping configuration.
//!
//! The shaping code never reads live settings. Callers take a [`SnapSettings`]
//! snapshot once per pointer event and pass it down explicitly.

use crate::snap::GRID_SIZE;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Settings errors.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("IO error: {0}")]
    Io(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("Could not determine configuration directory")]
    NoConfigDir,
    #[error("Invalid grid size: {0}")]
    InvalidGridSize(f64),
}

/// Result type for settings operations.
pub type SettingsResult<T> = Result<T, SettingsError>;

/// When the anchor of an arrow is snapped to the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnchorSnap {
    /// Snap on the first shaping event of a gesture only.
    #[default]
    Once,
    /// Re-snap on every pointer move. The anchor may jump after barbs
    /// have already been drawn against its old position.
    EveryEvent,
}

/// Snapshot of the snapping flags for a single pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapSettings {
    /// Snap the arrow anchor to grid intersections.
    pub snap_to_grid: bool,
    /// Snap the shaft to the eight canonical directions.
    pub snap_rotation: bool,
    /// Grid pitch in canvas units.
    pub grid_size: f64,
    /// Anchor re-snap policy.
    pub anchor_snap: AnchorSnap,
}

impl Default for SnapSettings {
    fn default() -> Self {
        Self {
            snap_to_grid: false,
            snap_rotation: false,
            grid_size: GRID_SIZE,
            anchor_snap: AnchorSnap::default(),
        }
    }
}

impl SnapSettings {
    /// Settings with both grid and rotation snapping turned on.
    pub fn snapping() -> Self {
        Self {
            snap_to_grid: true,
            snap_rotation: true,
            ..Self::default()
        }
    }

    /// The settings in effect for an event. Holding shift disables both snaps.
    pub fn effective(&self, shift_down: bool) -> Self {
        if shift_down {
            Self {
                snap_to_grid: false,
                snap_rotation: false,
                ..*self
            }
        } else {
            *self
        }
    }

    /// Reject grid sizes that cannot be snapped to.
    pub fn validate(&self) -> SettingsResult<()> {
        if self.grid_size.is_finite() && self.grid_size > 0.0 {
            Ok(())
        } else {
            Err(SettingsError::InvalidGridSize(self.grid_size))
        }
    }

    /// Parse settings from JSON.
    pub fn from_json(json: &str) -> SettingsResult<Self> {
        let settings: Self = serde_json::from_str(json)
            .map_err(|e| SettingsError::Serialization(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Serialize settings to pretty-printed JSON.
    pub fn to_json(&self) -> SettingsResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| SettingsError::Serialization(e.to_string()))
    }

    /// Default settings file location.
    ///
    /// On Unix: `~/.config/penarrow/settings.json`
    pub fn default_path() -> SettingsResult<PathBuf> {
        let base = dirs::config_dir()
            .or_else(dirs::home_dir)
            .ok_or(SettingsError::NoConfigDir)?;
        Ok(base.join("penarrow").join("settings.json"))
    }

    /// Load settings from a file.
    pub fn load(path: &Path) -> SettingsResult<Self> {
        let json = fs::read_to_string(path)
            .map_err(|e| SettingsError::Io(format!("Failed to read {}: {}", path.display(), e)))?;
        Self::from_json(&json)
    }

    /// Load settings, falling back to defaults when the file does not exist.
    pub fn load_or_default(path: &Path) -> SettingsResult<Self> {
        if !path.exists() {
            log::info!("No settings at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        Self::load(path)
    }

    /// Save settings to a file, creating parent directories as needed.
    pub fn save(&self, path: &Path) -> SettingsResult<()> {
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| {
                    SettingsError::Io(format!("Failed to create {}: {}", parent.display(), e))
                })?;
            }
        }
        let json = self.to_json()?;
        fs::write(path, json)
            .map_err(|e| SettingsError::Io(format!("Failed to write {}: {}", path.display(), e)))
    }
}
