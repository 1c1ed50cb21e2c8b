use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use strata_engine::{LoopConfig, PhysicsConfig, DEFAULT_TILE_SIZE};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub(crate) enum SettingsError {
    #[error("failed to read settings {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid settings json at {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Optional `assets/settings.json`; every field falls back to its default.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct GameSettings {
    pub window_title: String,
    pub window_width: u32,
    pub window_height: u32,
    pub update_rate_hz: u32,
    pub render_rate_hz: u32,
    pub vsync: bool,
    pub max_consecutive_faults: u32,
    /// World pixels per map tile; non-positive values keep the default.
    pub tile_size: f32,
    pub physics: PhysicsConfig,
}

impl Default for GameSettings {
    fn default() -> Self {
        let loop_defaults = LoopConfig::default();
        Self {
            window_title: loop_defaults.window_title,
            window_width: loop_defaults.window_width,
            window_height: loop_defaults.window_height,
            update_rate_hz: loop_defaults.update_rate_hz,
            render_rate_hz: loop_defaults.render_rate_hz,
            vsync: loop_defaults.vsync,
            max_consecutive_faults: loop_defaults.max_consecutive_faults,
            tile_size: DEFAULT_TILE_SIZE,
            physics: PhysicsConfig::default(),
        }
    }
}

impl GameSettings {
    pub(crate) fn loop_config(&self) -> LoopConfig {
        LoopConfig {
            window_title: self.window_title.clone(),
            window_width: self.window_width.max(1),
            window_height: self.window_height.max(1),
            update_rate_hz: self.update_rate_hz,
            render_rate_hz: self.render_rate_hz,
            vsync: self.vsync,
            max_consecutive_faults: self.max_consecutive_faults,
            ..LoopConfig::default()
        }
    }
}

pub(crate) fn parse_settings(text: &str) -> Result<GameSettings, SettingsError> {
    let mut deserializer = serde_json::Deserializer::from_str(text);
    let settings: GameSettings =
        serde_path_to_error::deserialize(&mut deserializer).map_err(|error| {
            SettingsError::Parse {
                path: error.path().to_string(),
                source: error.into_inner(),
            }
        })?;
    deserializer.end().map_err(|source| SettingsError::Parse {
        path: ".".to_string(),
        source,
    })?;
    Ok(settings)
}

/// `Ok(None)` when the file does not exist.
pub(crate) fn load_settings(path: &Path) -> Result<Option<GameSettings>, SettingsError> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(source) if source.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(SettingsError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    parse_settings(&text).map(Some)
}

/// Settings never stop startup: problems are logged and defaults used.
pub(crate) fn resolve_settings(path: &Path) -> GameSettings {
    match load_settings(path) {
        Ok(Some(settings)) => {
            info!(path = %path.display(), "settings_loaded");
            settings
        }
        Ok(None) => {
            info!(path = %path.display(), "settings_missing_using_defaults");
            GameSettings::default()
        }
        Err(error) => {
            warn!(
                path = %path.display(),
                error = %error,
                "settings_invalid_using_defaults"
            );
            GameSettings::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use serde_json::json;
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn empty_object_yields_defaults() {
        let settings = parse_settings("{}").expect("parse");
        assert_eq!(settings, GameSettings::default());
        assert_eq!(settings.update_rate_hz, 60);
        assert_eq!(settings.tile_size, DEFAULT_TILE_SIZE);
    }

    #[test]
    fn tile_size_is_read_from_settings() {
        let settings = parse_settings(r#"{ "tile_size": 16.0 }"#).expect("parse");
        assert_eq!(settings.tile_size, 16.0);
        assert_eq!(settings.physics, PhysicsConfig::default());
    }

    #[test]
    fn partial_settings_keep_remaining_defaults() {
        let raw = json!({
            "render_rate_hz": 30,
            "vsync": false,
            "physics": { "gravity": 0.25 }
        });
        let settings = parse_settings(&raw.to_string()).expect("parse");
        assert_eq!(settings.render_rate_hz, 30);
        assert!(!settings.vsync);
        assert_eq!(settings.physics.gravity, 0.25);
        assert_eq!(settings.physics.ground_speed, PhysicsConfig::default().ground_speed);

        let config = settings.loop_config();
        assert_eq!(config.render_rate_hz, 30);
        assert_eq!(config.update_rate_hz, 60);
        assert!(!config.vsync);
    }

    #[test]
    fn unknown_field_error_reports_json_path() {
        let error = parse_settings(r#"{ "physics": { "gravityy": 1.0 } }"#)
            .expect_err("unknown field should fail");
        let SettingsError::Parse { path, .. } = error else {
            panic!("expected parse error");
        };
        assert!(path.starts_with("physics"));
    }

    #[test]
    fn missing_file_is_not_an_error() {
        let temp = TempDir::new().expect("tempdir");
        let loaded = load_settings(&temp.path().join("settings.json")).expect("load");
        assert!(loaded.is_none());
    }

    #[test]
    fn invalid_file_resolves_to_defaults() {
        let temp = TempDir::new().expect("tempdir");
        let path = temp.path().join("settings.json");
        fs::write(&path, "{ \"vsync\": \"maybe\" }").expect("write");
        assert!(load_settings(&path).is_err());
        assert_eq!(resolve_settings(&path), GameSettings::default());
    }
}
