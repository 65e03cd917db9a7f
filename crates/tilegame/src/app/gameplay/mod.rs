mod animation;
mod dialogue;
mod director;
mod entities;
mod events;
mod interaction;
mod listener;
mod map;
mod motion;
mod orchestrator;
mod screens;
mod stats;

use tilecore::{Game, LevelCatalog};
use tracing::info;

use super::config::GameConfig;
use listener::LoggingLevelListener;
use orchestrator::{SceneOrchestrator, SceneSettings};

pub(crate) use orchestrator::SceneError;

pub(crate) fn build_game(
    config: &GameConfig,
    catalog: LevelCatalog,
) -> Result<Box<dyn Game>, SceneError> {
    let settings = SceneSettings {
        start_level: config.start_level_id(),
        tile_count_height: config.tile_count_height,
        camera_mode: config.camera_mode,
        loading_idle_frames: config.loading_idle_frames,
        tutorial_entry_delay: (config.target_tps >> 1) as i32,
    };
    info!(
        start_level = %settings.start_level,
        levels = catalog.len(),
        tile_count_height = settings.tile_count_height,
        "scene_configured"
    );
    let scene = SceneOrchestrator::new(catalog, settings, Box::new(LoggingLevelListener))?;
    Ok(Box::new(scene))
}
