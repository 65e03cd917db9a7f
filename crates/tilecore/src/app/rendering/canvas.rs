use crate::world::PixelRect;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgba(pub [u8; 4]);

impl Rgba {
    pub const BLACK: Rgba = Rgba([0, 0, 0, 255]);
    pub const WHITE: Rgba = Rgba([255, 255, 255, 255]);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Rgba([r, g, b, 255])
    }

    /// Luma-weighted gray with the same alpha.
    pub fn grayscale(self) -> Self {
        let [r, g, b, a] = self.0;
        let luma = (r as u32 * 299 + g as u32 * 587 + b as u32 * 114) / 1000;
        let luma = luma.min(255) as u8;
        Rgba([luma, luma, luma, a])
    }
}

/// One primitive handed to a [`Canvas`]. Rects are in screen pixels.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCall {
    Sprite {
        key: String,
        frame: u32,
        rect: PixelRect,
        grayscale: bool,
    },
    Panel {
        rect: PixelRect,
        color: Rgba,
    },
    Caption {
        text: String,
        rect: PixelRect,
    },
}

impl DrawCall {
    pub fn sprite_key(&self) -> Option<&str> {
        match self {
            DrawCall::Sprite { key, .. } => Some(key.as_str()),
            DrawCall::Panel { .. } | DrawCall::Caption { .. } => None,
        }
    }
}

pub trait Canvas {
    fn clear(&mut self, color: Rgba);

    fn draw(&mut self, call: DrawCall);

    fn present(&mut self);
}

/// Keeps every call in order; used to assert layering without a window.
#[derive(Debug, Default)]
pub struct RecordingCanvas {
    pub calls: Vec<DrawCall>,
    pub clears: usize,
    pub presents: usize,
}

impl RecordingCanvas {
    pub fn sprite_keys(&self) -> Vec<&str> {
        self.calls.iter().filter_map(DrawCall::sprite_key).collect()
    }

    /// Index of the last sprite whose key starts with `prefix`.
    pub fn last_sprite_index(&self, prefix: &str) -> Option<usize> {
        self.calls
            .iter()
            .rposition(|call| call.sprite_key().is_some_and(|key| key.starts_with(prefix)))
    }

    pub fn captions(&self) -> Vec<&str> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                DrawCall::Caption { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl Canvas for RecordingCanvas {
    fn clear(&mut self, _color: Rgba) {
        self.calls.clear();
        self.clears += 1;
    }

    fn draw(&mut self, call: DrawCall) {
        self.calls.push(call);
    }

    fn present(&mut self) {
        self.presents += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grayscale_keeps_alpha_and_equalizes_channels() {
        let gray = Rgba([200, 40, 90, 128]).grayscale();
        let [r, g, b, a] = gray.0;
        assert_eq!(r, g);
        assert_eq!(g, b);
        assert_eq!(a, 128);
    }

    #[test]
    fn recording_canvas_reports_last_index_by_prefix() {
        let mut canvas = RecordingCanvas::default();
        canvas.clear(Rgba::BLACK);
        for key in ["tile/1", "slime", "player", "slime"] {
            canvas.draw(DrawCall::Sprite {
                key: key.to_string(),
                frame: 0,
                rect: PixelRect::new(0, 0, 1, 1),
                grayscale: false,
            });
        }
        assert_eq!(canvas.last_sprite_index("slime"), Some(3));
        assert_eq!(canvas.last_sprite_index("tile/"), Some(0));
        assert_eq!(canvas.last_sprite_index("missing"), None);
    }
}
