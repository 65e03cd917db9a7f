use std::collections::HashSet;

use tilecore::{
    Canvas, Direction, EngineContext, EntityId, GridPoint, MapLayout, PixelRect, PoolMember,
    Renderable, SpawnError, SpawnRecord, ViewportController, WindowAware,
};

use super::super::animation::{AnimationEvent, AnimationType, Animator, Clip, ClipTable};
use super::super::motion::GridMotion;
use super::super::stats::{Stats, SLIME_STATS};
use super::{draw_sprite, unexpected, Combatant};

const SLIME_SPRITE: &str = "slime";
const SLIME_WALK_TICKS: u32 = 24;
const SLIME_AGGRO_RADIUS: i32 = 6;

static SLIME_CLIPS: ClipTable = ClipTable {
    idle: Clip::new(4, 12),
    walk: Clip::new(4, 6),
    run: Clip::new(4, 6),
    attack: Clip::new(5, 6),
    damaged: Clip::new(3, 4),
    death: Clip::new(5, 6),
    strike_frame: 3,
};

#[derive(Debug)]
pub(crate) struct Slime {
    id: EntityId,
    motion: GridMotion,
    animator: Animator,
    stats: Stats,
    dest_rect: PixelRect,
    terminated: bool,
}

impl Slime {
    pub(crate) fn coords(&self) -> GridPoint {
        self.motion.coords()
    }

    pub(crate) fn face_toward(&mut self, point: GridPoint) {
        if let Some(direction) = Direction::toward(self.motion.coords(), point) {
            self.motion.face(direction);
        }
    }

    /// Steps one tile toward the player when it is within aggro range but
    /// not yet adjacent. Claimed tiles go into `occupied` so two slimes
    /// never pick the same cell.
    pub(crate) fn calculate_move(
        &mut self,
        player: GridPoint,
        map: &MapLayout,
        occupied: &mut HashSet<GridPoint>,
    ) {
        if !self.is_alive()
            || self.motion.is_moving()
            || self.animator.current() == AnimationType::Attack
        {
            return;
        }
        let here = self.motion.coords();
        if here.chebyshev_distance(player) > SLIME_AGGRO_RADIUS {
            return;
        }
        if here.manhattan_distance(player) <= 1 {
            self.face_toward(player);
            return;
        }
        for direction in approach_directions(here, player) {
            if self
                .motion
                .try_begin(direction, map, |point| occupied.contains(&point))
            {
                occupied.insert(self.motion.target());
                return;
            }
        }
    }

    pub(crate) fn initiate_animation(&mut self) {
        let locomotion = if self.motion.is_moving() {
            AnimationType::Walk
        } else {
            AnimationType::Idle
        };
        self.animator.request(locomotion);
        self.animator.initiate();
    }

    pub(crate) fn update(&mut self, viewport: &ViewportController) {
        if self.animator.is_dead() {
            self.motion.invalidate();
        }
        self.motion.advance();
        if self.animator.advance() == AnimationEvent::DeathCompleted {
            self.terminated = true;
        }
        self.dest_rect = self.motion.dest_rect(viewport);
    }
}

/// Dominant axis first, then the other one.
fn approach_directions(from: GridPoint, to: GridPoint) -> Vec<Direction> {
    let horizontal = match (to.x - from.x).signum() {
        1 => Some(Direction::East),
        -1 => Some(Direction::West),
        _ => None,
    };
    let vertical = match (to.y - from.y).signum() {
        1 => Some(Direction::South),
        -1 => Some(Direction::North),
        _ => None,
    };
    if (to.x - from.x).abs() >= (to.y - from.y).abs() {
        horizontal.into_iter().chain(vertical).collect()
    } else {
        vertical.into_iter().chain(horizontal).collect()
    }
}

impl PoolMember for Slime {
    const KIND: &'static str = "slime";

    fn spawn(id: EntityId, record: &SpawnRecord) -> Result<Self, SpawnError> {
        match record {
            SpawnRecord::Generic { coords } => Ok(Self {
                id,
                motion: GridMotion::new(*coords, SLIME_WALK_TICKS),
                animator: Animator::new(&SLIME_CLIPS),
                stats: SLIME_STATS,
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

impl Combatant for Slime {
    fn motion(&self) -> &GridMotion {
        &self.motion
    }

    fn animator(&self) -> &Animator {
        &self.animator
    }

    fn animator_mut(&mut self) -> &mut Animator {
        &mut self.animator
    }

    fn stats(&self) -> &Stats {
        &self.stats
    }

    fn stats_mut(&mut self) -> &mut Stats {
        &mut self.stats
    }

    fn dest_rect(&self) -> PixelRect {
        self.dest_rect
    }
}

impl WindowAware for Slime {
    fn on_window_change(&mut self, viewport: &ViewportController) {
        self.dest_rect = self.motion.dest_rect(viewport);
    }
}

impl Renderable for Slime {
    fn render(&self, canvas: &mut dyn Canvas, ctx: &EngineContext) {
        let key = format!("{SLIME_SPRITE}/{}", self.animator.current().as_str());
        draw_sprite(canvas, ctx, key, self.animator.frame(), self.dest_rect);
    }
}
