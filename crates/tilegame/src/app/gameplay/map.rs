use tilecore::{
    Canvas, DrawCall, EngineContext, GridPoint, LevelDataStore, MapLayout, VOID_TILE,
};
use tracing::debug;

/// Draws the tile grid of the current level. Grayscale is switched on
/// while the player's death plays out.
#[derive(Debug, Default)]
pub(crate) struct MapHandler {
    layout: Option<MapLayout>,
    grayscale: bool,
}

impl MapHandler {
    pub(crate) fn on_level_change(&mut self, level: &LevelDataStore) {
        self.layout = level.map().cloned();
        self.grayscale = false;
        debug!(tiles = ?level.tile_count(), "map_loaded");
    }

    pub(crate) fn is_grayscale(&self) -> bool {
        self.grayscale
    }

    pub(crate) fn set_grayscale(&mut self, grayscale: bool) {
        self.grayscale = grayscale;
    }

    /// Draws every non-void tile inside the viewport window around `focus`.
    pub(crate) fn render(&self, canvas: &mut dyn Canvas, ctx: &EngineContext, focus: GridPoint) {
        let Some(layout) = self.layout.as_ref() else {
            return;
        };
        let window = ctx.viewport.visible_tiles(focus);
        let y_range = window.y_min.max(0)..=window.y_max.min(layout.height() as i32 - 1);
        for y in y_range {
            for x in window.x_min.max(0)..=window.x_max.min(layout.width() as i32 - 1) {
                let point = GridPoint::new(x, y);
                let Some(tile) = layout.tile_at(point).filter(|tile| *tile != VOID_TILE) else {
                    continue;
                };
                canvas.draw(DrawCall::Sprite {
                    key: format!("tile/{tile}"),
                    frame: 0,
                    rect: ctx.to_screen(ctx.viewport.dest_rect(point)),
                    grayscale: self.grayscale,
                });
            }
        }
    }
}
