//! Side-effect-free collision and combat predicates. Each function answers
//! "would this interaction happen now?"; the orchestrator applies the
//! outcome.

use tilecore::{Direction, EntityId, EntityPool, GridPoint, PixelRect, PoolMember};

use super::animation::AnimationType;
use super::entities::{Combatant, Interactable, Player, Projectile, Slime, Teleporter};
use super::stats::{physical_damage, Stats};

/// Result of one landed hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct HitOutcome {
    pub(crate) damage: i32,
    pub(crate) animation: AnimationType,
}

/// Reach of a swing: the attacker's rect pushed half a tile forward.
pub(crate) fn attack_reach(rect: PixelRect, facing: Direction, tile_px: i32) -> PixelRect {
    let (dx, dy) = facing.delta();
    rect.translated(dx * tile_px / 2, dy * tile_px / 2)
}

/// Body used when being hit; slightly smaller than the tile.
pub(crate) fn hurtbox(rect: PixelRect, tile_px: i32) -> PixelRect {
    rect.inflated(-(tile_px / 8))
}

/// Teleporters trigger on exact cell match once the player has arrived.
pub(crate) fn teleporter_hit<'a>(
    player: &Player,
    teleporters: &'a EntityPool<Teleporter>,
) -> Option<&'a Teleporter> {
    if player.motion().is_moving() || !player.is_alive() {
        return None;
    }
    teleporters
        .iter()
        .find(|teleporter| teleporter.coords() == player.coords())
}

/// A live slime whose body overlaps the player's.
pub(crate) fn slime_contact(
    player: &Player,
    slimes: &EntityPool<Slime>,
    tile_px: i32,
) -> Option<EntityId> {
    let body = hurtbox(player.dest_rect(), tile_px);
    slimes
        .iter()
        .filter(|slime| slime.is_alive())
        .find(|slime| hurtbox(slime.dest_rect(), tile_px).overlaps(&body))
        .map(|slime| slime.id())
}

/// The slime is idle next to the player and facing it would put the
/// player inside its reach.
pub(crate) fn initiates_attack(slime: &Slime, player: &Player, tile_px: i32) -> bool {
    if !slime.is_alive() || !player.is_alive() {
        return false;
    }
    if slime.motion().is_moving() || slime.animator().current().is_one_shot() {
        return false;
    }
    let Some(facing) = Direction::toward(slime.coords(), player.coords()) else {
        return false;
    };
    if slime.coords().manhattan_distance(player.coords()) != 1 {
        return false;
    }
    attack_reach(slime.dest_rect(), facing, tile_px)
        .overlaps(&hurtbox(player.dest_rect(), tile_px))
}

/// The attacker's swing is on its strike frame and reaches the defender.
pub(crate) fn registers_hit<A, D>(attacker: &A, defender: &D, tile_px: i32) -> bool
where
    A: Combatant,
    D: Combatant,
{
    if !attacker.is_alive() || !defender.is_alive() {
        return false;
    }
    if !attacker.animator().is_striking() {
        return false;
    }
    let reach = attack_reach(attacker.dest_rect(), attacker.motion().facing(), tile_px);
    reach.overlaps(&hurtbox(defender.dest_rect(), tile_px))
}

/// Combat state machine step for one hit. Damage lands only while the
/// attacker is inside its own Attack clip; a hit that empties the
/// defender's hp always yields Death.
pub(crate) fn resolve_hit(
    attacker_stats: &Stats,
    attacker_animation: AnimationType,
    defender_stats: &Stats,
) -> HitOutcome {
    if attacker_animation != AnimationType::Attack {
        return HitOutcome {
            damage: 0,
            animation: AnimationType::Damaged,
        };
    }
    let damage = physical_damage(attacker_stats.attack, defender_stats.defense);
    let animation = if defender_stats.hp - damage <= 0 {
        AnimationType::Death
    } else {
        AnimationType::Damaged
    };
    HitOutcome { damage, animation }
}

/// Projectile/slime pairs where the projectile sits on the slime's cell.
/// Each projectile hits at most one slime.
pub(crate) fn projectile_hits(
    projectiles: &EntityPool<Projectile>,
    slimes: &EntityPool<Slime>,
) -> Vec<(EntityId, EntityId)> {
    projectiles
        .iter()
        .filter(|projectile| !projectile.is_terminated())
        .filter_map(|projectile| {
            slimes
                .iter()
                .filter(|slime| slime.is_alive())
                .find(|slime| slime.motion().occupies(projectile.coords()))
                .map(|slime| (projectile.id(), slime.id()))
        })
        .collect()
}

/// The interactable directly in front of the player, if any.
pub(crate) fn facing_interactable<'a>(
    player: &Player,
    interactables: &'a EntityPool<Interactable>,
) -> Option<&'a Interactable> {
    if player.motion().is_moving() {
        return None;
    }
    let front: GridPoint = player.coords().offset(player.motion().facing());
    interactables
        .iter()
        .find(|interactable| interactable.coords() == front)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::gameplay::stats::{PLAYER_STATS, SLIME_STATS};

    #[test]
    fn exact_threshold_hit_is_death_not_damaged() {
        let attacker = Stats::new(10, 5, 0);
        let mut defender = Stats::new(10, 0, 2);
        defender.hp = 3;

        let outcome = resolve_hit(&attacker, AnimationType::Attack, &defender);

        assert_eq!(outcome.damage, 3);
        assert_eq!(outcome.animation, AnimationType::Death);
    }

    #[test]
    fn surviving_hit_is_damaged() {
        let outcome = resolve_hit(&PLAYER_STATS, AnimationType::Attack, &SLIME_STATS);
        assert_eq!(outcome.damage, 3);
        assert_eq!(outcome.animation, AnimationType::Damaged);
    }

    #[test]
    fn outcome_outside_attack_clip_deals_no_damage() {
        let outcome = resolve_hit(&PLAYER_STATS, AnimationType::Walk, &SLIME_STATS);
        assert_eq!(outcome.damage, 0);
        assert_eq!(outcome.animation, AnimationType::Damaged);
    }

    #[test]
    fn reach_covers_front_neighbour_but_not_diagonal() {
        let tile = 40;
        let attacker = PixelRect::new(40, 40, tile, tile);
        let reach = attack_reach(attacker, Direction::East, tile);

        assert!(reach.overlaps(&hurtbox(PixelRect::new(80, 40, tile, tile), tile)));
        assert!(!reach.overlaps(&hurtbox(PixelRect::new(80, 80, tile, tile), tile)));
        assert!(!reach.overlaps(&hurtbox(PixelRect::new(0, 40, tile, tile), tile)));
    }
}
