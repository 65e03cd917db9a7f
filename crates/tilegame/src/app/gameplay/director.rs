use tilecore::{EntityTag, GridPoint, LevelDataStore, LevelId, SpawnRecord, ViewportController};
use tracing::{debug, info};

pub(crate) const TUTORIAL_LEVEL: &str = "tutorial-0";
pub(crate) const WRAP_LEVEL: &str = "white-space";

pub(crate) const PROGRESS_KEY: &str = "progress";
pub(crate) const BORDER_TRAVERSED_KEY: &str = "is-border-traversed";

const WRAP_TELEPORTER_COORDS: GridPoint = GridPoint::new(52, 43);
const WRAP_TELEPORTER_TARGET_LEVEL: &str = "breakroom-initial";
const WRAP_TELEPORTER_TARGET_COORDS: GridPoint = GridPoint::new(20, 11);

/// Inclusive tile range on one axis; `-1` leaves that side open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Bound {
    pub(crate) min: i32,
    pub(crate) max: i32,
}

impl Bound {
    const fn new(min: i32, max: i32) -> Self {
        Self { min, max }
    }

    fn contains(self, value: i32) -> bool {
        (self.min == -1 || value >= self.min) && (self.max == -1 || value <= self.max)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Guard {
    pub(crate) x: Bound,
    pub(crate) y: Bound,
}

impl Guard {
    const fn new(x: (i32, i32), y: (i32, i32)) -> Self {
        Self {
            x: Bound::new(x.0, x.1),
            y: Bound::new(y.0, y.1),
        }
    }

    pub(crate) fn contains(&self, point: GridPoint) -> bool {
        self.x.contains(point.x) && self.y.contains(point.y)
    }
}

/// One scripted beat: fires once when the guard holds, then progress
/// moves on.
#[derive(Debug)]
struct ScriptStep {
    guard: Option<Guard>,
    lines: &'static [&'static str],
    wave: Option<&'static [(i32, i32)]>,
}

const PSST: &str = "... (Pssst, hey you!)";
const GO_THERE: &str = "... (It says it wanna talk to you!)";
const JUST_GO: &str = "... (So, uh, just go there, I guess?)";
const DONT_DISAPPOINT: &str = "... (You don't want to disappoint a cat, do you?)";

static TUTORIAL_SCRIPT: [ScriptStep; 8] = [
    ScriptStep {
        guard: None,
        lines: &[
            "... (Press [E]. That's all you need to know.)\n(For now.)",
            "... (Good job! Now...)",
            "... (Did you know you could move around with [W][A][S][D]?)",
            "... (C'mon, give it a little try!)",
        ],
        wave: None,
    },
    ScriptStep {
        guard: Some(Guard::new((-1, -1), (-1, 89))),
        lines: &[
            PSST,
            "... (Yes, you!)",
            "... (Do you see that cat up there?)",
            GO_THERE,
            JUST_GO,
            DONT_DISAPPOINT,
        ],
        wave: None,
    },
    ScriptStep {
        guard: Some(Guard::new((23, 24), (88, 89))),
        lines: &[
            PSST,
            "... (Yes, you again! Like, who else is here?)",
            "... (Do you see that cat on your left?)",
            GO_THERE,
            JUST_GO,
            DONT_DISAPPOINT,
        ],
        wave: None,
    },
    ScriptStep {
        guard: Some(Guard::new((39, 40), (76, 77))),
        lines: &[
            PSST,
            "... (I hope you talked to both cats.)",
            "... (Like, the developer who created all this didn't really provide me with a proper mechanism to track such interactions, so I really do not know.)",
            "... (But, uh, if you haven't, can you, like, go back and talk to them?)",
            "... (Because, uh, you'll never see them again? C'mon, everyone knows that this tutorial is a one-time thing.)",
            "...",
            // Shown as a single box.
            "... (Oh, one more thing.)... (Make sure you read the sign before going any further.)",
        ],
        wave: None,
    },
    ScriptStep {
        guard: Some(Guard::new((-1, 36), (67, 73))),
        lines: &[
            "... (You might want to press [SPACE].)",
            "... (Because, uh, you might be dead otherwise.)",
        ],
        wave: Some(&[(27, 70)]),
    },
    ScriptStep {
        guard: Some(Guard::new((-1, 27), (67, 73))),
        lines: &["... (You might want to, uh, press [1].)"],
        wave: Some(&[(17, 68), (18, 70), (17, 72)]),
    },
    ScriptStep {
        guard: Some(Guard::new((-1, 18), (67, 73))),
        lines: &["... (You might want to, uh, look behind you.)"],
        wave: Some(&[(8, 68), (9, 70), (8, 72), (28, 68), (27, 70), (28, 72)]),
    },
    ScriptStep {
        guard: Some(Guard::new((-1, 9), (67, 73))),
        lines: &[
            "... (You might want to, uh, keep going?)",
            "... (Nothing'll happen this time, I promise!)",
            "... (You've done well.)",
        ],
        wave: None,
    },
];

/// Everything the director asks of the scene this frame. The store has
/// already been updated when effects are returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum DirectorEffect {
    Dialogue(Vec<String>),
    /// Cancel the player's move in flight and stop running.
    HaltPlayer,
    /// Slime records were replaced; respawn the slime pool from the store.
    ReplaceSlimes,
    /// A teleporter record was added; respawn the teleporter pool.
    ArmTeleporter,
    /// Cancel the player's move and place it on this cell.
    WrapPlayer(GridPoint),
}

/// What the director needs to know about the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PlayerView {
    pub(crate) coords: GridPoint,
    pub(crate) next: Option<GridPoint>,
}

impl PlayerView {
    fn target(&self) -> GridPoint {
        self.next.unwrap_or(self.coords)
    }
}

/// Per-level scripted sequences. Stateless itself; all state lives in the
/// level store and is dropped with the level.
#[derive(Debug)]
pub(crate) struct LevelDirector {
    entry_delay_frames: i32,
}

impl LevelDirector {
    /// `entry_delay_frames` is how long the tutorial waits before its
    /// first beat.
    pub(crate) fn new(entry_delay_frames: i32) -> Self {
        Self { entry_delay_frames }
    }

    /// Seeds the level's properties. Runs once per level change, after the
    /// store was reset.
    pub(crate) fn on_level_entry(&self, level: &mut LevelDataStore) {
        match level.level_id().map(LevelId::as_str) {
            Some(TUTORIAL_LEVEL) => level.set_int(PROGRESS_KEY, -self.entry_delay_frames),
            Some(WRAP_LEVEL) => level.set_bool(BORDER_TRAVERSED_KEY, false),
            _ => {}
        }
    }

    pub(crate) fn step(
        &self,
        level: &mut LevelDataStore,
        player: PlayerView,
        viewport: &ViewportController,
    ) -> Vec<DirectorEffect> {
        match level.level_id().map(LevelId::as_str) {
            Some(TUTORIAL_LEVEL) => tutorial_step(level, player),
            Some(WRAP_LEVEL) => wrap_step(level, player, viewport),
            _ => Vec::new(),
        }
    }
}

fn tutorial_step(level: &mut LevelDataStore, player: PlayerView) -> Vec<DirectorEffect> {
    let Some(progress) = level.int(PROGRESS_KEY) else {
        return Vec::new();
    };
    if progress < 0 {
        level.set_int(PROGRESS_KEY, progress + 1);
        return Vec::new();
    }
    let Some(step) = TUTORIAL_SCRIPT.get(progress as usize) else {
        return Vec::new();
    };

    let mut effects = Vec::new();
    if let Some(guard) = step.guard {
        if !guard.contains(player.target()) {
            return effects;
        }
        effects.push(DirectorEffect::HaltPlayer);
    }
    effects.push(DirectorEffect::Dialogue(
        step.lines.iter().map(|line| line.to_string()).collect(),
    ));
    if let Some(wave) = step.wave {
        level.erase_records(EntityTag::Slime);
        for &(x, y) in wave {
            level.insert_record(
                EntityTag::Slime,
                SpawnRecord::Generic {
                    coords: GridPoint::new(x, y),
                },
            );
        }
        effects.push(DirectorEffect::ReplaceSlimes);
    }
    level.set_int(PROGRESS_KEY, progress + 1);
    info!(progress, wave = step.wave.map_or(0, <[_]>::len), "tutorial_step_fired");
    effects
}

/// Wrap bounds on one axis, kept half a window away from the map edge so
/// the camera never shows the seam. Moving onto or past a bound lands the
/// player on the opposite bound. Axes too small to hold both bounds never
/// wrap.
fn wrap_axis(value: i32, visible_tiles: f64, map_tiles: u32, top_margin: f64) -> Option<i32> {
    let lower = visible_tiles / 2.0 + top_margin;
    let upper = map_tiles as f64 - visible_tiles / 2.0 - 1.0;
    if lower >= upper {
        return None;
    }
    let value_f = value as f64;
    if value_f <= lower {
        Some(upper.floor() as i32)
    } else if value_f >= upper {
        Some(lower.ceil() as i32)
    } else {
        None
    }
}

fn wrap_step(
    level: &mut LevelDataStore,
    player: PlayerView,
    viewport: &ViewportController,
) -> Vec<DirectorEffect> {
    let Some(next) = player.next else {
        return Vec::new();
    };
    let (map_w, map_h) = level.tile_count();
    // Only the axis being moved along can wrap; a player parked on a bound
    // may still walk along it.
    let wrapped_x = (next.x != player.coords.x)
        .then(|| wrap_axis(next.x, viewport.tile_count_width(), map_w, 1.0))
        .flatten();
    let wrapped_y = (next.y != player.coords.y)
        .then(|| wrap_axis(next.y, viewport.tile_count_height(), map_h, 2.0))
        .flatten();
    if wrapped_x.is_none() && wrapped_y.is_none() {
        return Vec::new();
    }

    let destination = GridPoint::new(wrapped_x.unwrap_or(next.x), wrapped_y.unwrap_or(next.y));
    debug!(from = ?next, to = ?destination, "player_wrapped");
    let mut effects = vec![DirectorEffect::WrapPlayer(destination)];

    if level.bool(BORDER_TRAVERSED_KEY) == Some(false) {
        level.set_bool(BORDER_TRAVERSED_KEY, true);
        level.insert_record(
            EntityTag::Teleporter,
            SpawnRecord::Teleporter {
                coords: WRAP_TELEPORTER_COORDS,
                target_level: LevelId::new(WRAP_TELEPORTER_TARGET_LEVEL),
                target_coords: WRAP_TELEPORTER_TARGET_COORDS,
            },
        );
        info!(coords = ?WRAP_TELEPORTER_COORDS, "wrap_teleporter_armed");
        effects.push(DirectorEffect::ArmTeleporter);
    }
    effects
}

#[cfg(test)]
mod tests {
    use super::*;
    use tilecore::{CameraMode, LevelDescriptor, MapLayout};

    fn store_for(name: &str, width: u32, height: u32) -> LevelDataStore {
        let mut store = LevelDataStore::default();
        store.reset(LevelDescriptor::new(
            LevelId::new(name),
            MapLayout::filled(width, height, 1).expect("map"),
        ));
        store
    }

    fn standing(x: i32, y: i32) -> PlayerView {
        PlayerView {
            coords: GridPoint::new(x, y),
            next: None,
        }
    }

    fn dialogue_count(effects: &[DirectorEffect]) -> usize {
        effects
            .iter()
            .filter(|effect| matches!(effect, DirectorEffect::Dialogue(_)))
            .count()
    }

    #[test]
    fn open_bounds_accept_anything_on_that_side() {
        let guard = Guard::new((-1, 36), (67, 73));
        assert!(guard.contains(GridPoint::new(-500, 70)));
        assert!(guard.contains(GridPoint::new(36, 73)));
        assert!(!guard.contains(GridPoint::new(37, 70)));
        assert!(!guard.contains(GridPoint::new(0, 74)));
    }

    #[test]
    fn entry_delay_counts_up_to_zero_before_first_beat() {
        let director = LevelDirector::new(3);
        let viewport = ViewportController::new(18.0, CameraMode::FollowTarget);
        let mut store = store_for(TUTORIAL_LEVEL, 48, 96);
        director.on_level_entry(&mut store);
        assert_eq!(store.int(PROGRESS_KEY), Some(-3));

        for _ in 0..3 {
            assert!(director.step(&mut store, standing(24, 94), &viewport).is_empty());
        }
        let effects = director.step(&mut store, standing(24, 94), &viewport);
        assert_eq!(dialogue_count(&effects), 1);
        assert_eq!(store.int(PROGRESS_KEY), Some(1));
    }

    #[test]
    fn unsatisfied_guard_never_advances() {
        let director = LevelDirector::new(0);
        let viewport = ViewportController::new(18.0, CameraMode::FollowTarget);
        let mut store = store_for(TUTORIAL_LEVEL, 48, 96);
        store.set_int(PROGRESS_KEY, 1);

        for _ in 0..10 {
            assert!(director.step(&mut store, standing(24, 94), &viewport).is_empty());
        }
        assert_eq!(store.int(PROGRESS_KEY), Some(1));

        let effects = director.step(&mut store, standing(24, 89), &viewport);
        assert_eq!(effects[0], DirectorEffect::HaltPlayer);
        assert_eq!(dialogue_count(&effects), 1);
        assert_eq!(store.int(PROGRESS_KEY), Some(2));

        // Still inside the first guard, outside the next one.
        assert_eq!(
            dialogue_count(&director.step(&mut store, standing(30, 89), &viewport)),
            0
        );
    }

    #[test]
    fn guard_checks_the_cell_being_entered() {
        let director = LevelDirector::new(0);
        let viewport = ViewportController::new(18.0, CameraMode::FollowTarget);
        let mut store = store_for(TUTORIAL_LEVEL, 48, 96);
        store.set_int(PROGRESS_KEY, 1);

        let entering = PlayerView {
            coords: GridPoint::new(24, 90),
            next: Some(GridPoint::new(24, 89)),
        };
        assert!(!director.step(&mut store, entering, &viewport).is_empty());
    }

    #[test]
    fn wave_replaces_slime_records() {
        let director = LevelDirector::new(0);
        let viewport = ViewportController::new(18.0, CameraMode::FollowTarget);
        let mut store = store_for(TUTORIAL_LEVEL, 48, 96);
        store.insert_record(
            EntityTag::Slime,
            SpawnRecord::Generic {
                coords: GridPoint::new(1, 1),
            },
        );
        store.set_int(PROGRESS_KEY, 5);

        let effects = director.step(&mut store, standing(20, 70), &viewport);

        assert!(effects.contains(&DirectorEffect::ReplaceSlimes));
        let coords: Vec<_> = store
            .records(EntityTag::Slime)
            .iter()
            .map(SpawnRecord::coords)
            .collect();
        assert_eq!(
            coords,
            vec![
                GridPoint::new(17, 68),
                GridPoint::new(18, 70),
                GridPoint::new(17, 72)
            ]
        );
    }

    #[test]
    fn sign_reminder_shares_a_box_with_the_last_aside() {
        let director = LevelDirector::new(0);
        let viewport = ViewportController::new(18.0, CameraMode::FollowTarget);
        let mut store = store_for(TUTORIAL_LEVEL, 48, 96);
        store.set_int(PROGRESS_KEY, 3);

        let effects = director.step(&mut store, standing(39, 76), &viewport);

        let Some(DirectorEffect::Dialogue(lines)) = effects.get(1) else {
            panic!("expected dialogue, got {effects:?}");
        };
        assert_eq!(lines.len(), 7);
        assert_eq!(
            lines.last().map(String::as_str),
            Some("... (Oh, one more thing.)... (Make sure you read the sign before going any further.)")
        );
    }

    #[test]
    fn script_end_is_quiet() {
        let director = LevelDirector::new(0);
        let viewport = ViewportController::new(18.0, CameraMode::FollowTarget);
        let mut store = store_for(TUTORIAL_LEVEL, 48, 96);
        store.set_int(PROGRESS_KEY, TUTORIAL_SCRIPT.len() as i32);
        assert!(director.step(&mut store, standing(0, 70), &viewport).is_empty());
    }

    fn wrap_fixture() -> (LevelDirector, ViewportController, LevelDataStore) {
        let director = LevelDirector::new(0);
        let mut viewport = ViewportController::new(18.0, CameraMode::FollowTarget);
        viewport.on_window_change((1280, 720));
        let mut store = store_for(WRAP_LEVEL, 80, 60);
        director.on_level_entry(&mut store);
        (director, viewport, store)
    }

    #[test]
    fn wrap_moves_to_opposite_bound_on_each_axis() {
        let (director, viewport, mut store) = wrap_fixture();
        // tile_count_width = 32: x bounds are 17 and 63.
        let at_left = PlayerView {
            coords: GridPoint::new(18, 30),
            next: Some(GridPoint::new(17, 30)),
        };
        let effects = director.step(&mut store, at_left, &viewport);
        assert_eq!(effects[0], DirectorEffect::WrapPlayer(GridPoint::new(63, 30)));

        let at_right = PlayerView {
            coords: GridPoint::new(62, 30),
            next: Some(GridPoint::new(63, 30)),
        };
        let effects = director.step(&mut store, at_right, &viewport);
        assert_eq!(effects[0], DirectorEffect::WrapPlayer(GridPoint::new(17, 30)));

        // tile_count_height = 18: y bounds are 11 and 50.
        let at_top = PlayerView {
            coords: GridPoint::new(30, 12),
            next: Some(GridPoint::new(30, 11)),
        };
        let effects = director.step(&mut store, at_top, &viewport);
        assert_eq!(effects[0], DirectorEffect::WrapPlayer(GridPoint::new(30, 50)));
    }

    #[test]
    fn teleporter_arms_on_first_wrap_only() {
        let (director, viewport, mut store) = wrap_fixture();
        let crossing = PlayerView {
            coords: GridPoint::new(18, 30),
            next: Some(GridPoint::new(17, 30)),
        };

        let first = director.step(&mut store, crossing, &viewport);
        let second = director.step(&mut store, crossing, &viewport);

        assert!(first.contains(&DirectorEffect::ArmTeleporter));
        assert!(!second.contains(&DirectorEffect::ArmTeleporter));
        assert_eq!(store.records(EntityTag::Teleporter).len(), 1);
        assert_eq!(store.bool(BORDER_TRAVERSED_KEY), Some(true));
    }

    #[test]
    fn leaving_a_landing_bound_does_not_wrap_back() {
        let (director, viewport, mut store) = wrap_fixture();
        let back_inside = PlayerView {
            coords: GridPoint::new(63, 30),
            next: Some(GridPoint::new(62, 30)),
        };
        assert!(director.step(&mut store, back_inside, &viewport).is_empty());

        let along_bound = PlayerView {
            coords: GridPoint::new(63, 30),
            next: Some(GridPoint::new(63, 31)),
        };
        assert!(director.step(&mut store, along_bound, &viewport).is_empty());
    }

    #[test]
    fn map_smaller_than_the_window_never_wraps() {
        let director = LevelDirector::new(0);
        let mut viewport = ViewportController::new(18.0, CameraMode::FollowTarget);
        viewport.on_window_change((1280, 720));
        let mut store = store_for(WRAP_LEVEL, 20, 60);
        director.on_level_entry(&mut store);

        let step_left = PlayerView {
            coords: GridPoint::new(10, 30),
            next: Some(GridPoint::new(9, 30)),
        };
        assert!(director.step(&mut store, step_left, &viewport).is_empty());

        let step_up = PlayerView {
            coords: GridPoint::new(10, 12),
            next: Some(GridPoint::new(10, 11)),
        };
        assert_eq!(
            director.step(&mut store, step_up, &viewport)[0],
            DirectorEffect::WrapPlayer(GridPoint::new(10, 50))
        );
    }

    #[test]
    fn standing_player_never_wraps() {
        let (director, viewport, mut store) = wrap_fixture();
        assert!(director.step(&mut store, standing(0, 0), &viewport).is_empty());
    }
}
