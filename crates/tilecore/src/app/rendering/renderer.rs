use std::path::PathBuf;
use std::sync::Arc;

use pixels::{Error, Pixels, SurfaceTexture};
use winit::window::Window;

use super::canvas::{Canvas, DrawCall, Rgba};
use super::raster::{fallback_color, Frame};
use super::sprites::SpriteCache;

const CAPTION_COLOR: Rgba = Rgba::rgb(236, 236, 228);

/// Window-backed [`Canvas`]: draw calls rasterize straight into the
/// `pixels` frame buffer and `present` pushes it to the surface.
pub struct Renderer {
    window: Arc<Window>,
    pixels: Pixels<'static>,
    size: (u32, u32),
    sprites: SpriteCache,
    last_error: Option<Error>,
}

impl Renderer {
    pub fn new(window: Arc<Window>, sprites_dir: PathBuf) -> Result<Self, Error> {
        let size = window.inner_size();
        let width = size.width.max(1);
        let height = size.height.max(1);
        let pixels = Self::build_pixels(Arc::clone(&window), width, height)?;
        Ok(Self {
            window,
            pixels,
            size: (width, height),
            sprites: SpriteCache::new(sprites_dir),
            last_error: None,
        })
    }

    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), Error> {
        if width == 0 || height == 0 {
            return Ok(());
        }
        self.pixels = Self::build_pixels(Arc::clone(&self.window), width, height)?;
        self.size = (width, height);
        Ok(())
    }

    pub fn size(&self) -> (u32, u32) {
        self.size
    }

    /// Error from the most recent `present`, if any.
    pub fn take_error(&mut self) -> Option<Error> {
        self.last_error.take()
    }

    fn build_pixels(
        window: Arc<Window>,
        width: u32,
        height: u32,
    ) -> Result<Pixels<'static>, Error> {
        let surface = SurfaceTexture::new(width, height, window);
        Pixels::new(width, height, surface)
    }

    fn frame(&mut self) -> Frame<'_> {
        let (width, height) = self.size;
        Frame {
            bytes: self.pixels.frame_mut(),
            width,
            height,
        }
    }
}

impl Canvas for Renderer {
    fn clear(&mut self, color: Rgba) {
        self.frame().fill(color);
    }

    fn draw(&mut self, call: DrawCall) {
        match call {
            DrawCall::Sprite {
                key,
                frame,
                rect,
                grayscale,
            } => {
                let (width, height) = self.size;
                let mut target = Frame {
                    bytes: self.pixels.frame_mut(),
                    width,
                    height,
                };
                match self.sprites.get(&key) {
                    Some(sheet) => target.blit_frame(sheet, frame, rect, grayscale),
                    None => {
                        let color = fallback_color(&key);
                        let color = if grayscale { color.grayscale() } else { color };
                        target.fill_rect(rect.inflated(-1), color);
                    }
                }
            }
            DrawCall::Panel { rect, color } => self.frame().fill_rect(rect, color),
            DrawCall::Caption { text, rect } => self.frame().caption(&text, rect, CAPTION_COLOR),
        }
    }

    fn present(&mut self) {
        if let Err(error) = self.pixels.render() {
            self.last_error = Some(error);
        }
    }
}
