use tilecore::{
    Canvas, EngineContext, EntityId, GridPoint, PixelRect, PoolMember, Renderable, SpawnError,
    SpawnRecord, ViewportController, WindowAware,
};

use super::super::animation::Animator;
use super::{draw_sprite, unexpected, AMBIENT_CLIPS};

/// A solid prop with something to say (cats, signs, the laptop).
#[derive(Debug)]
pub(crate) struct Interactable {
    id: EntityId,
    coords: GridPoint,
    sprite: String,
    lines: Vec<String>,
    animator: Animator,
    dest_rect: PixelRect,
}

impl Interactable {
    pub(crate) fn coords(&self) -> GridPoint {
        self.coords
    }

    pub(crate) fn lines(&self) -> &[String] {
        &self.lines
    }

    pub(crate) fn update_animation(&mut self) {
        self.animator.advance();
    }
}

impl PoolMember for Interactable {
    const KIND: &'static str = "interactable";

    fn spawn(id: EntityId, record: &SpawnRecord) -> Result<Self, SpawnError> {
        match record {
            SpawnRecord::Interactable {
                coords,
                sprite,
                lines,
            } => Ok(Self {
                id,
                coords: *coords,
                sprite: sprite.clone(),
                lines: lines.clone(),
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

impl WindowAware for Interactable {
    fn on_window_change(&mut self, viewport: &ViewportController) {
        self.dest_rect = viewport.dest_rect(self.coords);
    }
}

impl Renderable for Interactable {
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
