use thiserror::Error;
use tilecore::{resolve_app_paths, Game, LevelCatalog, LevelLoadError, LoopConfig, StartupError};
use tracing::info;
use tracing_subscriber::EnvFilter;

use super::config::{config_path, load_config, ConfigError};
use super::gameplay::{self, SceneError};

pub(crate) struct AppWiring {
    pub(crate) config: LoopConfig,
    pub(crate) game: Box<dyn Game>,
}

#[derive(Debug, Error)]
pub(crate) enum BootstrapError {
    #[error(transparent)]
    Paths(#[from] StartupError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Levels(#[from] LevelLoadError),
    #[error(transparent)]
    Scene(#[from] SceneError),
}

pub(crate) fn build_app() -> Result<AppWiring, BootstrapError> {
    init_tracing();
    info!("=== tilegame startup ===");

    let paths = resolve_app_paths()?;
    let config = load_config(&config_path(&paths.root))?;
    let catalog = LevelCatalog::load_dir(&paths.levels_dir)?;
    let game = gameplay::build_game(&config, catalog)?;

    info!(
        root = %paths.root.display(),
        start_level = config.start_level.as_str(),
        "bootstrap_complete"
    );
    Ok(AppWiring {
        config: config.loop_config(paths.sprites_dir),
        game,
    })
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .compact()
        .init();
}
