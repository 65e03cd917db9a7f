use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use image::ImageReader;
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpriteKeyError {
    #[error("sprite key must not be empty")]
    Empty,
    #[error("sprite key must not start with '/'")]
    LeadingSlash,
    #[error("sprite key must not contain '..'")]
    ParentTraversal,
    #[error("sprite key contains invalid character '{character}'")]
    InvalidCharacter { character: char },
}

/// Keys name files under the sprites directory, so they are restricted to
/// lowercase path segments.
pub(crate) fn validate_sprite_key(key: &str) -> Result<(), SpriteKeyError> {
    if key.is_empty() {
        return Err(SpriteKeyError::Empty);
    }
    if key.starts_with('/') {
        return Err(SpriteKeyError::LeadingSlash);
    }
    if key.contains("..") {
        return Err(SpriteKeyError::ParentTraversal);
    }
    for ch in key.chars() {
        if ch.is_ascii_lowercase() || ch.is_ascii_digit() || matches!(ch, '_' | '/' | '-') {
            continue;
        }
        return Err(SpriteKeyError::InvalidCharacter { character: ch });
    }
    Ok(())
}

/// A horizontal strip of square frames.
#[derive(Debug)]
pub(crate) struct SpriteSheet {
    pub(crate) width: u32,
    pub(crate) height: u32,
    pub(crate) rgba: Vec<u8>,
}

impl SpriteSheet {
    pub(crate) fn frame_count(&self) -> u32 {
        if self.height == 0 {
            return 0;
        }
        (self.width / self.height).max(1)
    }

    /// Source rect `(x, y, w, h)` of `frame`, wrapping past the last frame.
    pub(crate) fn frame_rect(&self, frame: u32) -> (u32, u32, u32, u32) {
        let count = self.frame_count();
        if count <= 1 {
            return (0, 0, self.width, self.height);
        }
        let side = self.height;
        ((frame % count) * side, 0, side, side)
    }
}

/// Lazily loads `<sprites_dir>/<key>.png`. Failures are cached as `None`
/// and warned about once per key.
#[derive(Debug)]
pub(crate) struct SpriteCache {
    sprites_dir: PathBuf,
    loaded: HashMap<String, Option<SpriteSheet>>,
    warned_keys: HashSet<String>,
}

impl SpriteCache {
    pub(crate) fn new(sprites_dir: PathBuf) -> Self {
        Self {
            sprites_dir,
            loaded: HashMap::new(),
            warned_keys: HashSet::new(),
        }
    }

    pub(crate) fn get(&mut self, key: &str) -> Option<&SpriteSheet> {
        if !self.loaded.contains_key(key) {
            let sheet = match self.load(key) {
                Ok(sheet) => Some(sheet),
                Err((path, reason)) => {
                    self.warn_once(key, path.as_deref(), &reason);
                    None
                }
            };
            self.loaded.insert(key.to_string(), sheet);
        }
        self.loaded.get(key).and_then(Option::as_ref)
    }

    fn load(&self, key: &str) -> Result<SpriteSheet, (Option<PathBuf>, String)> {
        validate_sprite_key(key).map_err(|error| (None, format!("invalid_key:{error}")))?;
        let path = self.sprites_dir.join(format!("{key}.png"));
        load_sheet(&path).map_err(|reason| (Some(path), reason))
    }

    fn warn_once(&mut self, key: &str, path: Option<&Path>, reason: &str) {
        if !self.warned_keys.insert(key.to_string()) {
            return;
        }
        let path_display = path
            .map(|path| path.display().to_string())
            .unwrap_or_else(|| "<unresolved>".to_string());
        warn!(
            sprite_key = key,
            path = %path_display,
            reason = reason,
            "sprite_load_failed_using_fallback"
        );
    }
}

fn load_sheet(path: &Path) -> Result<SpriteSheet, String> {
    let reader = ImageReader::open(path).map_err(|error| format!("file_open_failed:{error}"))?;
    let decoded = reader
        .decode()
        .map_err(|error| format!("decode_failed:{error}"))?;
    let image = decoded.to_rgba8();
    Ok(SpriteSheet {
        width: image.width(),
        height: image.height(),
        rgba: image.into_raw(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_valid_keys() {
        for key in ["player", "tile/1", "light-bulb", "slime_blue"] {
            assert!(validate_sprite_key(key).is_ok(), "key={key}");
        }
    }

    #[test]
    fn rejects_invalid_keys() {
        for key in ["", "/a", "..", "a/../b", "A", "a.b", r"a\b"] {
            assert!(validate_sprite_key(key).is_err(), "key={key}");
        }
    }

    #[test]
    fn frame_rect_wraps_over_strip() {
        let sheet = SpriteSheet {
            width: 64,
            height: 16,
            rgba: vec![0; 64 * 16 * 4],
        };
        assert_eq!(sheet.frame_count(), 4);
        assert_eq!(sheet.frame_rect(1), (16, 0, 16, 16));
        assert_eq!(sheet.frame_rect(5), (16, 0, 16, 16));
    }

    #[test]
    fn missing_sprite_is_cached_as_absent() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut cache = SpriteCache::new(dir.path().to_path_buf());

        assert!(cache.get("player").is_none());
        assert!(cache.get("player").is_none());
        assert_eq!(cache.warned_keys.len(), 1);
    }

    #[test]
    fn png_on_disk_is_loaded() {
        let dir = tempfile::tempdir().expect("tempdir");
        let image = image::RgbaImage::from_pixel(8, 4, image::Rgba([10, 20, 30, 255]));
        image
            .save(dir.path().join("slime.png"))
            .expect("write png");

        let mut cache = SpriteCache::new(dir.path().to_path_buf());
        let sheet = cache.get("slime").expect("sheet");
        assert_eq!((sheet.width, sheet.height), (8, 4));
        assert_eq!(sheet.frame_count(), 2);
    }
}
