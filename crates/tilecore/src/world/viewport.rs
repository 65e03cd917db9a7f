use serde::Deserialize;
use tracing::debug;

use super::grid::{GridPoint, PixelRect};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CameraMode {
    /// A fixed number of tile rows fills the window height; the camera is
    /// centred on a focus entity.
    #[default]
    FollowTarget,
    /// The whole map is scaled into the window and centred, no scrolling.
    FixedFullscreen,
}

impl CameraMode {
    pub fn toggled(self) -> Self {
        match self {
            Self::FollowTarget => Self::FixedFullscreen,
            Self::FixedFullscreen => Self::FollowTarget,
        }
    }
}

/// Inclusive tile bounds that are worth drawing this frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileWindow {
    pub x_min: i32,
    pub x_max: i32,
    pub y_min: i32,
    pub y_max: i32,
}

impl TileWindow {
    pub fn contains(&self, point: GridPoint) -> bool {
        point.x >= self.x_min && point.x <= self.x_max && point.y >= self.y_min && point.y <= self.y_max
    }
}

/// Maps grid coordinates to window pixels.
#[derive(Debug, Clone)]
pub struct ViewportController {
    mode: CameraMode,
    window_size: (u32, u32),
    map_tiles: (u32, u32),
    tile_count_height: f64,
    tile_count_width: f64,
    tile_px: i32,
    origin: (i32, i32),
}

impl ViewportController {
    pub fn new(tile_count_height: f64, mode: CameraMode) -> Self {
        let mut viewport = Self {
            mode,
            window_size: (0, 0),
            map_tiles: (0, 0),
            tile_count_height: tile_count_height.max(1.0),
            tile_count_width: 0.0,
            tile_px: 1,
            origin: (0, 0),
        };
        viewport.recompute();
        viewport
    }

    pub fn on_window_change(&mut self, window_size: (u32, u32)) {
        self.window_size = window_size;
        self.recompute();
    }

    pub fn on_level_change(&mut self, map_tiles: (u32, u32)) {
        self.map_tiles = map_tiles;
        self.recompute();
    }

    pub fn switch_camera_mode(&mut self) {
        self.mode = self.mode.toggled();
        self.recompute();
        debug!(mode = ?self.mode, "camera_mode_switched");
    }

    pub fn mode(&self) -> CameraMode {
        self.mode
    }

    pub fn window_size(&self) -> (u32, u32) {
        self.window_size
    }

    pub fn tile_px(&self) -> i32 {
        self.tile_px
    }

    /// Tile rows visible in follow mode.
    pub fn tile_count_height(&self) -> f64 {
        self.tile_count_height
    }

    /// Tile columns visible in follow mode, derived from the window aspect.
    pub fn tile_count_width(&self) -> f64 {
        self.tile_count_width
    }

    /// World-space placement of one tile. Depends only on `coords` and the
    /// last window/level change, so repeated calls agree.
    pub fn dest_rect(&self, coords: GridPoint) -> PixelRect {
        PixelRect::new(
            coords.x * self.tile_px + self.origin.0,
            coords.y * self.tile_px + self.origin.1,
            self.tile_px,
            self.tile_px,
        )
    }

    /// Top-left corner of the visible region in world pixels.
    pub fn camera_offset(&self, focus: PixelRect) -> (i32, i32) {
        match self.mode {
            CameraMode::FollowTarget => {
                let (cx, cy) = focus.center();
                (
                    cx - self.window_size.0 as i32 / 2,
                    cy - self.window_size.1 as i32 / 2,
                )
            }
            CameraMode::FixedFullscreen => (0, 0),
        }
    }

    /// Screen placement of a world-space rect under the given camera.
    pub fn project(&self, rect: PixelRect, camera: (i32, i32)) -> PixelRect {
        rect.translated(-camera.0, -camera.1)
    }

    pub fn visible_tiles(&self, focus: GridPoint) -> TileWindow {
        match self.mode {
            CameraMode::FollowTarget => {
                let half_w = (self.tile_count_width / 2.0).ceil() as i32 + 1;
                let half_h = (self.tile_count_height / 2.0).ceil() as i32 + 1;
                TileWindow {
                    x_min: focus.x - half_w,
                    x_max: focus.x + half_w,
                    y_min: focus.y - half_h,
                    y_max: focus.y + half_h,
                }
            }
            CameraMode::FixedFullscreen => TileWindow {
                x_min: 0,
                x_max: self.map_tiles.0 as i32 - 1,
                y_min: 0,
                y_max: self.map_tiles.1 as i32 - 1,
            },
        }
    }

    fn recompute(&mut self) {
        let (window_w, window_h) = self.window_size;
        if window_h > 0 {
            self.tile_count_width = self.tile_count_height * window_w as f64 / window_h as f64;
        }

        match self.mode {
            CameraMode::FollowTarget => {
                self.tile_px = ((window_h as f64 / self.tile_count_height) as i32).max(1);
                self.origin = (0, 0);
            }
            CameraMode::FixedFullscreen => {
                let (map_w, map_h) = self.map_tiles;
                if map_w == 0 || map_h == 0 {
                    self.tile_px = 1;
                    self.origin = (0, 0);
                    return;
                }
                self.tile_px = (window_w / map_w).min(window_h / map_h).max(1) as i32;
                self.origin = (
                    (window_w as i32 - map_w as i32 * self.tile_px) / 2,
                    (window_h as i32 - map_h as i32 * self.tile_px) / 2,
                );
            }
        }
    }
}
