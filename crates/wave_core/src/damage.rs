//! Damage resolution.
//!
//! Damage is the attack/defense difference, floored at [`MIN_DAMAGE`], plus
//! a random bonus of up to half that base. The random source is always
//! passed in so a seeded generator reproduces every roll.

use rand::Rng;

/// Minimum damage floor - every hit deals at least 1 damage.
pub const MIN_DAMAGE: u32 = 1;

/// Base damage before the random bonus.
#[must_use]
pub const fn base_damage(attack: u32, defense: u32) -> u32 {
    let diff = attack.saturating_sub(defense);
    if diff < MIN_DAMAGE {
        MIN_DAMAGE
    } else {
        diff
    }
}

/// Inclusive upper bound of the random bonus for a given base.
#[must_use]
pub const fn max_bonus(base: u32) -> u32 {
    let half = base / 2;
    if half < 1 {
        1
    } else {
        half
    }
}

/// Roll damage for one attack.
///
/// `base = max(1, attack - defense)`; the result is
/// `base + uniform(0..=max(1, base / 2))`, so it is never below 1. The sum
/// saturates at `u32::MAX`.
pub fn compute_damage<R: Rng + ?Sized>(attack: u32, defense: u32, rng: &mut R) -> u32 {
    let base = base_damage(attack, defense);
    base.saturating_add(rng.gen_range(0..=max_bonus(base)))
}

/// Smallest and largest values [`compute_damage`] can return.
#[must_use]
pub const fn damage_range(attack: u32, defense: u32) -> (u32, u32) {
    let base = base_damage(attack, defense);
    (base, base.saturating_add(max_bonus(base)))
}
