//! Wave generation.
//!
//! Wave 1 is a fixed pair of goblins. Later waves scale with the index and
//! roll a little variance per monster; every third wave adds a boss.
//! Random draws happen in roster order (health, attack, speed per goblin),
//! so a seeded generator always reproduces the same roster.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::combatant::{any_alive, count_alive, CombatStats, Monster, MonsterKind};
use crate::error::{GameError, Result};

/// Largest number of regular monsters in a wave.
pub const MAX_REGULAR_MONSTERS: u32 = 5;

/// Every wave whose index is a multiple of this gets a boss.
pub const BOSS_INTERVAL: u32 = 3;

/// Fixed stats of the wave-1 goblins (health, attack, defense, speed).
pub const FIRST_WAVE_GOBLIN: (u32, u32, u32, u32) = (40, 6, 2, 5);

/// Name of the wave elite.
pub const BOSS_NAME: &str = "Orc Boss";

/// Smallest value any generated stat may take.
const STAT_FLOOR: i64 = 1;

/// A generated monster roster for one wave.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Wave {
    /// 1-based wave index.
    pub index: u32,
    /// Monsters in roster order. Composition is fixed once generated.
    pub monsters: Vec<Monster>,
}

impl Wave {
    /// Number of monsters in the wave.
    #[must_use]
    pub fn len(&self) -> usize {
        self.monsters.len()
    }

    /// Check if the wave has no monsters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.monsters.is_empty()
    }

    /// Check if any monster is still standing.
    #[must_use]
    pub fn has_survivors(&self) -> bool {
        any_alive(&self.monsters)
    }

    /// Number of monsters still standing.
    #[must_use]
    pub fn alive_count(&self) -> usize {
        count_alive(&self.monsters)
    }

    /// Check if this wave includes a boss.
    #[must_use]
    pub fn has_boss(&self) -> bool {
        self.monsters.iter().any(Monster::is_boss)
    }
}

/// Number of regular (non-boss) monsters for a wave index.
#[must_use]
pub fn regular_monster_count(index: u32) -> u32 {
    if index <= 1 {
        2
    } else {
        index.saturating_add(1).min(MAX_REGULAR_MONSTERS)
    }
}

/// Check if a wave index gets a boss.
#[must_use]
pub const fn has_boss(index: u32) -> bool {
    index > 1 && index % BOSS_INTERVAL == 0
}

/// Total roster size for a wave index.
#[must_use]
pub fn expected_wave_size(index: u32) -> usize {
    regular_monster_count(index) as usize + usize::from(has_boss(index))
}

/// Clamp a signed stat roll to the stat floor.
fn clamp_stat(value: i64) -> u32 {
    u32::try_from(value.max(STAT_FLOOR)).unwrap_or(u32::MAX)
}

/// Generate the monster roster for `index`.
///
/// # Errors
///
/// Returns [`GameError::InvalidWaveIndex`] for index 0.
pub fn generate_wave<R: Rng + ?Sized>(index: u32, rng: &mut R) -> Result<Wave> {
    if index == 0 {
        return Err(GameError::InvalidWaveIndex(index));
    }

    let monsters = if index == 1 {
        let (health, attack, defense, speed) = FIRST_WAVE_GOBLIN;
        (0..2)
            .map(|_| {
                Monster::new(
                    "Goblin",
                    MonsterKind::Goblin,
                    CombatStats::new(health, attack, defense, speed),
                )
            })
            .collect()
    } else {
        let mut monsters = Vec::with_capacity(expected_wave_size(index));
        let w = i64::from(index);

        for i in 0..regular_monster_count(index) {
            let health = 30 + w * 8 + rng.gen_range(-5..=5);
            let attack = 5 + w * 2 + rng.gen_range(-1..=2);
            let defense = 2 + w / 2;
            let speed = rng.gen_range(3..=7);
            monsters.push(Monster::new(
                format!("Goblin_{}", i + 1),
                MonsterKind::Goblin,
                CombatStats::new(
                    clamp_stat(health),
                    clamp_stat(attack),
                    clamp_stat(defense),
                    clamp_stat(speed),
                ),
            ));
        }

        if has_boss(index) {
            monsters.push(Monster::new(
                BOSS_NAME,
                MonsterKind::Boss,
                CombatStats::new(
                    clamp_stat(80 + w * 10),
                    clamp_stat(14 + w * 2),
                    clamp_stat(6 + w / 2),
                    4,
                ),
            ));
        }
        monsters
    };

    Ok(Wave { index, monsters })
}
