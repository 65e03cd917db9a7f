use tilecore::{
    Canvas, EngineContext, EntityId, GridPoint, PixelRect, PoolMember, Renderable, SpawnError,
    SpawnRecord, ViewportController, WindowAware,
};

use super::super::animation::Animator;
use super::{draw_sprite, unexpected, AMBIENT_CLIPS};

#[derive(Debug)]
pub(crate) struct Decoration {
    id: EntityId,
    coords: GridPoint,
    sprite: String,
    animator: Animator,
    dest_rect: PixelRect,
}

impl Decoration {
    pub(crate) fn update_animation(&mut self) {
        self.animator.advance();
    }
}

impl PoolMember for Decoration {
    const KIND: &'static str = "decoration";

    fn spawn(id: EntityId, record: &SpawnRecord) -> Result<Self, SpawnError> {
        match record {
            SpawnRecord::Decoration { coords, sprite } => Ok(Self {
                id,
                coords: *coords,
                sprite: sprite.clone(),
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

impl WindowAware for Decoration {
    fn on_window_change(&mut self, viewport: &ViewportController) {
        self.dest_rect = viewport.dest_rect(self.coords);
    }
}

impl Renderable for Decoration {
    fn render(&self, canvas: &mut dyn Canvas, ctx: &EngineContext) {
        draw_sprite(
            canvas,
            ctx,
            self.sprite.clone(),
            self.animator.frame(),
            self.dest_rect,
        );
    }
}
