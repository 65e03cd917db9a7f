use tilecore::{
    Canvas, EngineContext, EntityId, GridPoint, LevelId, PixelRect, PoolMember, Renderable,
    SpawnError, SpawnRecord, ViewportController, WindowAware,
};

use super::super::animation::Animator;
use super::{draw_sprite, unexpected, AMBIENT_CLIPS};

const TELEPORTER_SPRITE: &str = "teleporter";

#[derive(Debug)]
pub(crate) struct Teleporter {
    id: EntityId,
    coords: GridPoint,
    target_level: LevelId,
    target_coords: GridPoint,
    animator: Animator,
    dest_rect: PixelRect,
}

impl Teleporter {
    pub(crate) fn coords(&self) -> GridPoint {
        self.coords
    }

    pub(crate) fn target_level(&self) -> &LevelId {
        &self.target_level
    }

    pub(crate) fn target_coords(&self) -> GridPoint {
        self.target_coords
    }

    pub(crate) fn update_animation(&mut self) {
        self.animator.advance();
    }
}

impl PoolMember for Teleporter {
    const KIND: &'static str = "teleporter";

    fn spawn(id: EntityId, record: &SpawnRecord) -> Result<Self, SpawnError> {
        match record {
            SpawnRecord::Teleporter {
                coords,
                target_level,
                target_coords,
            } => Ok(Self {
                id,
                coords: *coords,
                target_level: target_level.clone(),
                target_coords: *target_coords,
                animator: Animator::new(&AMBIENT_CLIPS),
                dest_rect: PixelRect::default(),
            }),
            other => Err(unexpected(Self::KIND, other)),
        }
    }

    fn id(&self) -> EntityId {
        self.id
    }
}

impl WindowAware for Teleporter {
    fn on_window_change(&mut self, viewport: &ViewportController) {
        self.dest_rect = viewport.dest_rect(self.coords);
    }
}

impl Renderable for Teleporter {
    fn render(&self, canvas: &mut dyn Canvas, ctx: &EngineContext) {
        draw_sprite(
            canvas,
            ctx,
            TELEPORTER_SPRITE.to_string(),
            self.animator.frame(),
            self.dest_rect,
        );
    }
}
