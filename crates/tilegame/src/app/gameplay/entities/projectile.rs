use tilecore::{
    Canvas, Direction, EngineContext, EntityId, GridPoint, MapLayout, PixelRect, PoolMember,
    Renderable, SpawnError, SpawnRecord, ViewportController, WindowAware,
};

use super::{draw_sprite, unexpected};

const PROJECTILE_SPRITE: &str = "projectile";
const TICKS_PER_TILE: u32 = 4;
const RANGE_TILES: u32 = 8;

#[derive(Debug)]
pub(crate) struct Projectile {
    id: EntityId,
    coords: GridPoint,
    direction: Direction,
    tick: u32,
    travelled: u32,
    dest_rect: PixelRect,
    terminated: bool,
}

impl Projectile {
    pub(crate) fn coords(&self) -> GridPoint {
        self.coords
    }

    pub(crate) fn launch(&mut self, direction: Direction, viewport: &ViewportController) {
        self.direction = direction;
        self.dest_rect = viewport.dest_rect(self.coords);
    }

    pub(crate) fn terminate(&mut self) {
        self.terminated = true;
    }

    /// Advances one tile every few ticks; leaving walkable ground or the
    /// end of its range terminates it.
    pub(crate) fn update(&mut self, map: &MapLayout, viewport: &ViewportController) {
        if self.terminated {
            return;
        }
        self.tick += 1;
        if self.tick >= TICKS_PER_TILE {
            self.tick = 0;
            self.coords = self.coords.offset(self.direction);
            self.travelled += 1;
            if !map.is_walkable(self.coords) || self.travelled >= RANGE_TILES {
                self.terminated = true;
            }
        }
        self.dest_rect = viewport.dest_rect(self.coords);
    }
}

impl PoolMember for Projectile {
    const KIND: &'static str = "projectile";

    fn spawn(id: EntityId, record: &SpawnRecord) -> Result<Self, SpawnError> {
        match record {
            SpawnRecord::Generic { coords } => Ok(Self {
                id,
                coords: *coords,
                direction: Direction::default(),
                tick: 0,
                travelled: 0,
                dest_rect: PixelRect::default(),
                terminated: false,
            }),
            other => Err(unexpected(Self::KIND, other)),
        }
    }

    fn id(&self) -> EntityId {
        self.id
    }

    fn is_terminated(&self) -> bool {
        self.terminated
    }
}

impl WindowAware for Projectile {
    fn on_window_change(&mut self, viewport: &ViewportController) {
        self.dest_rect = viewport.dest_rect(self.coords);
    }
}

impl Renderable for Projectile {
    fn render(&self, canvas: &mut dyn Canvas, ctx: &EngineContext) {
        draw_sprite(
            canvas,
            ctx,
            PROJECTILE_SPRITE.to_string(),
            self.travelled,
            self.dest_rect,
        );
    }
}
