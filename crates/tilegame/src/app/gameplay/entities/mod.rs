use tilecore::{Canvas, DrawCall, EngineContext, PixelRect, SpawnError, SpawnRecord};

use super::animation::{Animator, Clip, ClipTable};
use super::motion::GridMotion;
use super::stats::Stats;

mod decoration;
mod interactable;
mod player;
mod projectile;
mod slime;
mod teleporter;

pub(crate) use decoration::Decoration;
pub(crate) use interactable::Interactable;
pub(crate) use player::Player;
pub(crate) use projectile::Projectile;
pub(crate) use slime::Slime;
pub(crate) use teleporter::Teleporter;

/// Looping clip for props that only idle.
static AMBIENT_CLIPS: ClipTable = ClipTable {
    idle: Clip::new(4, 12),
    walk: Clip::new(4, 12),
    run: Clip::new(4, 12),
    attack: Clip::new(1, 1),
    damaged: Clip::new(1, 1),
    death: Clip::new(1, 1),
    strike_frame: 0,
};

/// Anything that can attack and be hit.
pub(crate) trait Combatant {
    fn motion(&self) -> &GridMotion;
    fn animator(&self) -> &Animator;
    fn animator_mut(&mut self) -> &mut Animator;
    fn stats(&self) -> &Stats;
    fn stats_mut(&mut self) -> &mut Stats;
    fn dest_rect(&self) -> PixelRect;

    fn is_alive(&self) -> bool {
        !self.animator().is_dead()
    }
}

fn draw_sprite(canvas: &mut dyn Canvas, ctx: &EngineContext, key: String, frame: u32, rect: PixelRect) {
    canvas.draw(DrawCall::Sprite {
        key,
        frame,
        rect: ctx.to_screen(rect),
        grayscale: false,
    });
}

fn unexpected(pool: &'static str, record: &SpawnRecord) -> SpawnError {
    SpawnError::UnexpectedRecord {
        pool,
        found: record.variant_name(),
    }
}
