//! Software rasterization into an RGBA8 frame buffer.

use crate::world::PixelRect;

use super::canvas::Rgba;
use super::sprites::SpriteSheet;

const CAPTION_CELL_GAP_PX: i32 = 1;

#[derive(Debug)]
pub(crate) struct Frame<'a> {
    pub(crate) bytes: &'a mut [u8],
    pub(crate) width: u32,
    pub(crate) height: u32,
}

impl Frame<'_> {
    pub(crate) fn fill(&mut self, color: Rgba) {
        for pixel in self.bytes.chunks_exact_mut(4) {
            pixel.copy_from_slice(&color.0);
        }
    }

    fn clipped(&self, rect: PixelRect) -> Option<(i32, i32, i32, i32)> {
        let left = rect.x.max(0);
        let top = rect.y.max(0);
        let right = rect.right().min(self.width as i32);
        let bottom = rect.bottom().min(self.height as i32);
        (left < right && top < bottom).then_some((left, top, right, bottom))
    }

    fn put(&mut self, x: i32, y: i32, color: [u8; 4]) {
        let offset = (y as usize * self.width as usize + x as usize) * 4;
        if let Some(pixel) = self.bytes.get_mut(offset..offset + 4) {
            pixel.copy_from_slice(&color);
        }
    }

    pub(crate) fn fill_rect(&mut self, rect: PixelRect, color: Rgba) {
        let Some((left, top, right, bottom)) = self.clipped(rect) else {
            return;
        };
        for y in top..bottom {
            for x in left..right {
                self.put(x, y, color.0);
            }
        }
    }

    /// Nearest-neighbour scale of one sheet frame into `rect`; fully
    /// transparent source pixels are skipped.
    pub(crate) fn blit_frame(
        &mut self,
        sheet: &SpriteSheet,
        frame: u32,
        rect: PixelRect,
        grayscale: bool,
    ) {
        let (src_x, src_y, src_w, src_h) = sheet.frame_rect(frame);
        if src_w == 0 || src_h == 0 || rect.is_empty() {
            return;
        }
        if sheet.rgba.len() < sheet.width as usize * sheet.height as usize * 4 {
            return;
        }
        let Some((left, top, right, bottom)) = self.clipped(rect) else {
            return;
        };
        let sheet_width = sheet.width as usize;
        for y in top..bottom {
            let sy = src_y + ((y - rect.y) as u32 * src_h / rect.h as u32).min(src_h - 1);
            for x in left..right {
                let sx = src_x + ((x - rect.x) as u32 * src_w / rect.w as u32).min(src_w - 1);
                let offset = (sy as usize * sheet_width + sx as usize) * 4;
                let texel = [
                    sheet.rgba[offset],
                    sheet.rgba[offset + 1],
                    sheet.rgba[offset + 2],
                    sheet.rgba[offset + 3],
                ];
                if texel[3] == 0 {
                    continue;
                }
                let color = if grayscale {
                    Rgba(texel).grayscale()
                } else {
                    Rgba(texel)
                };
                self.put(x, y, color.0);
            }
        }
    }

    /// Draws text as one solid cell per visible glyph, wrapping inside
    /// `rect`. Whitespace leaves a gap.
    pub(crate) fn caption(&mut self, text: &str, rect: PixelRect, color: Rgba) {
        let cell_h = (rect.h / 3).clamp(4, 18);
        let cell_w = (cell_h * 3 / 5).max(2);
        let advance = cell_w + CAPTION_CELL_GAP_PX;
        let line_advance = cell_h + cell_h / 2;
        let per_line = (rect.w / advance).max(1);

        let mut column = 0;
        let mut line = 0;
        for ch in text.chars() {
            if ch == '\n' || column >= per_line {
                column = 0;
                line += 1;
            }
            let y = rect.y + line * line_advance;
            if y + cell_h > rect.bottom() {
                return;
            }
            if ch == '\n' {
                continue;
            }
            if !ch.is_whitespace() {
                let x = rect.x + column * advance;
                self.fill_rect(PixelRect::new(x, y, cell_w, cell_h), color);
            }
            column += 1;
        }
    }
}

/// Stable flat color for a sprite key with no image on disk.
pub(crate) fn fallback_color(key: &str) -> Rgba {
    let hash = key
        .bytes()
        .fold(0x811c_9dc5_u32, |acc, byte| (acc ^ byte as u32).wrapping_mul(0x0100_0193));
    let [a, b, c, _] = hash.to_le_bytes();
    Rgba::rgb(64 + a / 2, 64 + b / 2, 64 + c / 2)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pixel(bytes: &[u8], width: u32, x: u32, y: u32) -> [u8; 4] {
        let offset = ((y * width + x) * 4) as usize;
        [
            bytes[offset],
            bytes[offset + 1],
            bytes[offset + 2],
            bytes[offset + 3],
        ]
    }

    #[test]
    fn fill_rect_is_clipped_to_frame() {
        let mut bytes = vec![0u8; 4 * 4 * 4];
        let mut frame = Frame {
            bytes: &mut bytes,
            width: 4,
            height: 4,
        };
        frame.fill_rect(PixelRect::new(-2, 2, 4, 10), Rgba::WHITE);

        assert_eq!(pixel(&bytes, 4, 0, 3), Rgba::WHITE.0);
        assert_eq!(pixel(&bytes, 4, 1, 2), Rgba::WHITE.0);
        assert_eq!(pixel(&bytes, 4, 2, 2), [0, 0, 0, 0]);
        assert_eq!(pixel(&bytes, 4, 0, 1), [0, 0, 0, 0]);
    }

    #[test]
    fn blit_scales_selected_frame_and_skips_transparent() {
        // Two 1x1 frames: opaque red, then transparent.
        let sheet = SpriteSheet {
            width: 2,
            height: 1,
            rgba: vec![255, 0, 0, 255, 0, 255, 0, 0],
        };
        let mut bytes = vec![0u8; 4 * 4 * 4];
        let mut frame = Frame {
            bytes: &mut bytes,
            width: 4,
            height: 4,
        };
        frame.blit_frame(&sheet, 0, PixelRect::new(0, 0, 2, 2), false);
        frame.blit_frame(&sheet, 1, PixelRect::new(2, 2, 2, 2), false);

        assert_eq!(pixel(&bytes, 4, 1, 1), [255, 0, 0, 255]);
        assert_eq!(pixel(&bytes, 4, 3, 3), [0, 0, 0, 0]);
    }

    #[test]
    fn grayscale_blit_equalizes_channels() {
        let sheet = SpriteSheet {
            width: 1,
            height: 1,
            rgba: vec![200, 10, 10, 255],
        };
        let mut bytes = vec![0u8; 4];
        let mut frame = Frame {
            bytes: &mut bytes,
            width: 1,
            height: 1,
        };
        frame.blit_frame(&sheet, 0, PixelRect::new(0, 0, 1, 1), true);
        assert_eq!(bytes[0], bytes[1]);
        assert_eq!(bytes[1], bytes[2]);
    }

    #[test]
    fn caption_leaves_gaps_for_spaces() {
        let mut bytes = vec![0u8; 40 * 12 * 4];
        let mut frame = Frame {
            bytes: &mut bytes,
            width: 40,
            height: 12,
        };
        frame.caption("a b", PixelRect::new(0, 0, 40, 12), Rgba::WHITE);

        // cell_h = 4, cell_w = 2, advance = 3
        assert_eq!(pixel(&bytes, 40, 0, 0), Rgba::WHITE.0);
        assert_eq!(pixel(&bytes, 40, 3, 0), [0, 0, 0, 0]);
        assert_eq!(pixel(&bytes, 40, 6, 0), Rgba::WHITE.0);
    }

    #[test]
    fn fallback_color_is_stable_per_key() {
        assert_eq!(fallback_color("slime"), fallback_color("slime"));
        assert_ne!(fallback_color("slime"), fallback_color("player"));
    }
}
