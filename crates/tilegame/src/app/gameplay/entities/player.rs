use tilecore::{
    Canvas, Direction, EngineContext, EventBus, GridPoint, InputAction, InputSnapshot, LevelAware,
    MapLayout, PixelRect, Renderable, SpawnRecord, ViewportController, WindowAware,
};
use tracing::debug;

use super::super::animation::{AnimationEvent, AnimationType, Animator, Clip, ClipTable};
use super::super::events::GameEvent;
use super::super::motion::GridMotion;
use super::super::stats::{Stats, PLAYER_STATS};
use super::{draw_sprite, Combatant};

const PLAYER_SPRITE: &str = "player";
const PLAYER_WALK_TICKS: u32 = 12;
const PROJECTILE_COOLDOWN_TICKS: u32 = 30;

static PLAYER_CLIPS: ClipTable = ClipTable {
    idle: Clip::new(4, 10),
    walk: Clip::new(4, 3),
    run: Clip::new(4, 2),
    attack: Clip::new(4, 4),
    damaged: Clip::new(3, 4),
    death: Clip::new(6, 8),
    strike_frame: 2,
};

/// Held movement keys in precedence order.
const MOVE_BINDINGS: [(InputAction, Direction); 4] = [
    (InputAction::MoveUp, Direction::North),
    (InputAction::MoveDown, Direction::South),
    (InputAction::MoveLeft, Direction::West),
    (InputAction::MoveRight, Direction::East),
];

#[derive(Debug)]
pub(crate) struct Player {
    motion: GridMotion,
    animator: Animator,
    stats: Stats,
    dest_rect: PixelRect,
    projectile_cooldown: u32,
    death_posted: bool,
}

impl Player {
    pub(crate) fn new() -> Self {
        Self {
            motion: GridMotion::new(GridPoint::default(), PLAYER_WALK_TICKS),
            animator: Animator::new(&PLAYER_CLIPS),
            stats: PLAYER_STATS,
            dest_rect: PixelRect::default(),
            projectile_cooldown: 0,
            death_posted: false,
        }
    }

    pub(crate) fn coords(&self) -> GridPoint {
        self.motion.coords()
    }

    pub(crate) fn motion_mut(&mut self) -> &mut GridMotion {
        &mut self.motion
    }

    /// Cancels the move in flight and drops out of running.
    pub(crate) fn halt(&mut self) {
        self.motion.invalidate();
        self.motion.set_running(false);
    }

    pub(crate) fn handle_input(
        &mut self,
        input: &InputSnapshot,
        map: &MapLayout,
        blocked: impl Fn(GridPoint) -> bool,
        events: &mut EventBus<GameEvent>,
    ) {
        if self.animator.is_dead() {
            return;
        }
        self.projectile_cooldown = self.projectile_cooldown.saturating_sub(1);
        self.motion.set_running(input.is_down(InputAction::Run));

        if input.is_down(InputAction::Attack) {
            self.animator.request(AnimationType::Attack);
        }
        if input.is_down(InputAction::CastProjectile) && self.projectile_cooldown == 0 {
            self.projectile_cooldown = PROJECTILE_COOLDOWN_TICKS;
            events.post(GameEvent::ProjectileRequested {
                origin: self.motion.target(),
                direction: self.motion.facing(),
            });
        }

        if self.animator.current() == AnimationType::Attack {
            return;
        }
        let held = MOVE_BINDINGS
            .iter()
            .find(|(action, _)| input.is_down(*action))
            .map(|(_, direction)| *direction);
        if let Some(direction) = held {
            if self.motion.try_begin(direction, map, blocked) {
                debug!(from = ?self.motion.coords(), to = ?self.motion.next(), "player_move_started");
            }
        }
    }

    pub(crate) fn initiate_animation(&mut self) {
        let locomotion = match (self.motion.is_moving(), self.motion.is_running()) {
            (false, _) => AnimationType::Idle,
            (true, false) => AnimationType::Walk,
            (true, true) => AnimationType::Run,
        };
        self.animator.request(locomotion);
        self.animator.initiate();
    }

    pub(crate) fn update(&mut self, viewport: &ViewportController, events: &mut EventBus<GameEvent>) {
        if self.animator.is_dead() {
            self.motion.invalidate();
            if !self.death_posted {
                self.death_posted = true;
                events.post(GameEvent::DeathPending);
            }
        }
        self.motion.advance();
        if self.animator.advance() == AnimationEvent::DeathCompleted {
            events.post(GameEvent::DeathFinalized);
        }
        self.dest_rect = self.motion.dest_rect(viewport);
    }
}

impl Combatant for Player {
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

impl LevelAware for Player {
    fn on_level_change(&mut self, record: &SpawnRecord) {
        self.motion.reset(record.coords());
        self.animator.reset();
        self.stats = PLAYER_STATS;
        self.projectile_cooldown = 0;
        self.death_posted = false;
    }
}

impl WindowAware for Player {
    fn on_window_change(&mut self, viewport: &ViewportController) {
        self.dest_rect = self.motion.dest_rect(viewport);
    }
}

impl Renderable for Player {
    fn render(&self, canvas: &mut dyn Canvas, ctx: &EngineContext) {
        let key = format!("{PLAYER_SPRITE}/{}", self.animator.current().as_str());
        draw_sprite(canvas, ctx, key, self.animator.frame(), self.dest_rect);
    }
}
