mod game;
mod input;
mod loop_runner;
mod metrics;
mod rendering;

pub use game::{Game, GameState, InputSnapshot};
pub use input::{ActionStates, InputAction, InputEvent};
pub use loop_runner::{run_app, AppError, LoopConfig};
pub use metrics::LoopMetricsSnapshot;
pub use rendering::{Canvas, DrawCall, RecordingCanvas, Renderer, Rgba, SpriteKeyError};
