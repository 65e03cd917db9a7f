#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Stats {
    pub(crate) hp: i32,
    pub(crate) max_hp: i32,
    pub(crate) attack: i32,
    pub(crate) defense: i32,
}

impl Stats {
    pub(crate) const fn new(max_hp: i32, attack: i32, defense: i32) -> Self {
        Self {
            hp: max_hp,
            max_hp,
            attack,
            defense,
        }
    }

    /// Returns the hp left after the hit.
    pub(crate) fn take_damage(&mut self, damage: i32) -> i32 {
        self.hp = self.hp.saturating_sub(damage.max(0));
        self.hp
    }
}

pub(crate) const PLAYER_STATS: Stats = Stats::new(20, 4, 1);
pub(crate) const SLIME_STATS: Stats = Stats::new(8, 3, 1);
pub(crate) const PROJECTILE_ATTACK: i32 = 5;

/// Subtractive damage; every landed hit deals at least one point.
pub(crate) fn physical_damage(attack: i32, defense: i32) -> i32 {
    attack.saturating_sub(defense).max(1)
}
