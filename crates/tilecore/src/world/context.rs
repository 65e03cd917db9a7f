use crate::app::GameState;

use super::{CameraMode, LevelDataStore, PixelRect, ViewportController};

/// Shared state every scene component reads: the game state machine, the
/// current level's data and the viewport.
#[derive(Debug)]
pub struct EngineContext {
    pub state: GameState,
    pub level: LevelDataStore,
    pub viewport: ViewportController,
    /// World-pixel offset subtracted from every destination rect at render.
    pub camera: (i32, i32),
    pub frame: u64,
}

impl EngineContext {
    pub fn new(tile_count_height: f64, camera_mode: CameraMode) -> Self {
        Self {
            state: GameState::Menu,
            level: LevelDataStore::default(),
            viewport: ViewportController::new(tile_count_height, camera_mode),
            camera: (0, 0),
            frame: 0,
        }
    }

    pub fn is_ingame(&self) -> bool {
        matches!(
            self.state,
            GameState::IngamePlaying | GameState::IngameDialogue
        )
    }

    /// Screen placement of a world-space destination rect.
    pub fn to_screen(&self, rect: PixelRect) -> PixelRect {
        self.viewport.project(rect, self.camera)
    }
}
