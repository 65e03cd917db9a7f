use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use tilecore::{CameraMode, LevelId, LoopConfig};
use tracing::info;

pub(crate) const CONFIG_ENV_VAR: &str = "TILEGAME_CONFIG";
const DEFAULT_CONFIG_FILE: &str = "game.json";

#[derive(Debug, Error)]
pub(crate) enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid config file {path} at '{field}': {source}")]
    Parse {
        path: PathBuf,
        field: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("config value '{field}' out of range: {reason}")]
    OutOfRange { field: &'static str, reason: String },
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct GameConfig {
    pub(crate) window_title: String,
    pub(crate) window_width: u32,
    pub(crate) window_height: u32,
    pub(crate) target_tps: u32,
    pub(crate) max_ticks_per_frame: u32,
    pub(crate) metrics_interval_ms: u64,
    pub(crate) max_render_fps: Option<u32>,
    /// Tile rows that fill the window height with the follow camera.
    pub(crate) tile_count_height: f64,
    pub(crate) start_level: String,
    pub(crate) camera_mode: CameraMode,
    pub(crate) loading_idle_frames: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            window_title: "tilegame".to_string(),
            window_width: 1280,
            window_height: 720,
            target_tps: 60,
            max_ticks_per_frame: 5,
            metrics_interval_ms: 1000,
            max_render_fps: Some(60),
            tile_count_height: 18.0,
            start_level: "tutorial-0".to_string(),
            camera_mode: CameraMode::FollowTarget,
            loading_idle_frames: 30,
        }
    }
}

impl GameConfig {
    pub(crate) fn start_level_id(&self) -> LevelId {
        LevelId::new(self.start_level.clone())
    }

    pub(crate) fn loop_config(&self, sprites_dir: PathBuf) -> LoopConfig {
        LoopConfig {
            window_title: self.window_title.clone(),
            window_width: self.window_width,
            window_height: self.window_height,
            target_tps: self.target_tps,
            max_ticks_per_frame: self.max_ticks_per_frame,
            metrics_log_interval: Duration::from_millis(self.metrics_interval_ms),
            max_render_fps: self.max_render_fps,
            sprites_dir,
            ..LoopConfig::default()
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.target_tps == 0 {
            return Err(ConfigError::OutOfRange {
                field: "target_tps",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.max_ticks_per_frame == 0 {
            return Err(ConfigError::OutOfRange {
                field: "max_ticks_per_frame",
                reason: "must be at least 1".to_string(),
            });
        }
        if !(self.tile_count_height.is_finite() && self.tile_count_height >= 1.0) {
            return Err(ConfigError::OutOfRange {
                field: "tile_count_height",
                reason: format!("expected >= 1, got {}", self.tile_count_height),
            });
        }
        if self.window_width == 0 || self.window_height == 0 {
            return Err(ConfigError::OutOfRange {
                field: "window_width/window_height",
                reason: format!("got {}x{}", self.window_width, self.window_height),
            });
        }
        Ok(())
    }
}

/// `TILEGAME_CONFIG` wins; otherwise `game.json` in the project root.
pub(crate) fn config_path(root: &Path) -> PathBuf {
    match std::env::var_os(CONFIG_ENV_VAR) {
        Some(path) if !path.is_empty() => PathBuf::from(path),
        _ => root.join(DEFAULT_CONFIG_FILE),
    }
}

pub(crate) fn load_config(path: &Path) -> Result<GameConfig, ConfigError> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(error) if error.kind() == io::ErrorKind::NotFound => {
            info!(path = %path.display(), "config_missing_using_defaults");
            return Ok(GameConfig::default());
        }
        Err(source) => {
            return Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    let config = parse_config(path, &raw)?;
    config.validate()?;
    info!(
        path = %path.display(),
        start_level = config.start_level.as_str(),
        camera_mode = ?config.camera_mode,
        "config_loaded"
    );
    Ok(config)
}

fn parse_config(path: &Path, raw: &str) -> Result<GameConfig, ConfigError> {
    let mut deserializer = serde_json::Deserializer::from_str(raw);
    serde_path_to_error::deserialize::<_, GameConfig>(&mut deserializer).map_err(|error| {
        let field = error.path().to_string();
        ConfigError::Parse {
            path: path.to_path_buf(),
            field,
            source: error.into_inner(),
        }
    })
}
