mod canvas;
mod raster;
mod renderer;
mod sprites;

pub use canvas::{Canvas, DrawCall, RecordingCanvas, Rgba};
pub use renderer::Renderer;
pub use sprites::SpriteKeyError;
