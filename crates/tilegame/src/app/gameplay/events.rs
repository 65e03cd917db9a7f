use tilecore::{Direction, GridPoint, LevelId};

/// Cross-entity notifications. Entities post these during a step; the
/// orchestrator drains them once the step's passes are done.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum GameEvent {
    Teleport {
        target_level: LevelId,
        target_coords: GridPoint,
    },
    DeathPending,
    DeathFinalized,
    ProjectileRequested {
        origin: GridPoint,
        direction: Direction,
    },
    InteractRequested {
        lines: Vec<String>,
    },
}

impl GameEvent {
    pub(crate) fn name(&self) -> &'static str {
        match self {
            Self::Teleport { .. } => "teleport",
            Self::DeathPending => "death_pending",
            Self::DeathFinalized => "death_finalized",
            Self::ProjectileRequested { .. } => "projectile_requested",
            Self::InteractRequested { .. } => "interact_requested",
        }
    }
}
