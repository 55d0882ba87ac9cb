//! Combatants: the shared model for players and monsters.
//!
//! Both sides carry a [`CombatStats`] block and get aliveness and damage
//! handling from the [`Combatant`] trait. Aliveness is derived from health;
//! a defeated combatant stays in its roster at zero health.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::materials::Inventory;
use crate::roles::{Role, RoleTemplate};

/// Health and combat attributes shared by every combatant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CombatStats {
    /// Maximum health points.
    pub max_health: u32,
    /// Current health points, never above `max_health`.
    pub health: u32,
    /// Attack rating.
    pub attack: u32,
    /// Defense rating, subtracted from incoming attack.
    pub defense: u32,
    /// Speed, decides turn order within a round.
    pub speed: u32,
}

impl CombatStats {
    /// Create stats at full health.
    #[must_use]
    pub const fn new(max_health: u32, attack: u32, defense: u32, speed: u32) -> Self {
        Self {
            max_health,
            health: max_health,
            attack,
            defense,
            speed,
        }
    }

    /// Check if health is above zero.
    #[must_use]
    pub const fn is_alive(&self) -> bool {
        self.health > 0
    }

    /// Reduce health by `amount`, floored at zero.
    pub fn apply_damage(&mut self, amount: u32) {
        self.health = self.health.saturating_sub(amount);
    }

    /// Restore up to `amount` health, capped at `max_health`.
    ///
    /// Returns the amount actually restored.
    pub fn heal(&mut self, amount: u32) -> u32 {
        let before = self.health;
        self.health = self.health.saturating_add(amount).min(self.max_health);
        self.health - before
    }
}

/// Common capability of players and monsters.
pub trait Combatant {
    /// Display name.
    fn name(&self) -> &str;

    /// Current stats.
    fn stats(&self) -> &CombatStats;

    /// Mutable stats.
    fn stats_mut(&mut self) -> &mut CombatStats;

    /// Check if this combatant can still act and be targeted.
    fn is_alive(&self) -> bool {
        self.stats().is_alive()
    }

    /// Current health.
    fn health(&self) -> u32 {
        self.stats().health
    }

    /// Apply damage, clamping health at zero. Further damage to a defeated
    /// combatant has no effect.
    fn apply_damage(&mut self, amount: u32) {
        let stats = self.stats_mut();
        stats.apply_damage(amount);
        debug_assert!(stats.health <= stats.max_health);
    }
}

/// A party member. Created once from a role template and kept for the
/// whole session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Player {
    /// Player name.
    pub name: String,
    /// Chosen archetype.
    pub role: Role,
    /// Combat attributes, mutated by damage and upgrades.
    pub stats: CombatStats,
    /// Collected materials.
    pub inventory: Inventory,
    /// Blocks placed with the Building Block upgrade. Cosmetic only.
    pub placed_blocks: u32,
}

impl Player {
    /// Create a player from a role's template stats.
    #[must_use]
    pub fn from_role(role: Role, name: impl Into<String>) -> Self {
        let template = role.template();
        Self {
            name: name.into(),
            role,
            stats: CombatStats::new(
                template.health,
                template.attack,
                template.defense,
                template.speed,
            ),
            inventory: Inventory::default(),
            placed_blocks: 0,
        }
    }

    /// Create a player with explicit stats, mainly for scenarios and tests.
    #[must_use]
    pub fn with_stats(role: Role, name: impl Into<String>, stats: CombatStats) -> Self {
        Self {
            name: name.into(),
            role,
            stats,
            inventory: Inventory::default(),
            placed_blocks: 0,
        }
    }

    /// Template data for this player's role (symbol, ability text).
    #[must_use]
    pub fn template(&self) -> &'static RoleTemplate {
        self.role.template()
    }
}

impl Combatant for Player {
    fn name(&self) -> &str {
        &self.name
    }

    fn stats(&self) -> &CombatStats {
        &self.stats
    }

    fn stats_mut(&mut self) -> &mut CombatStats {
        &mut self.stats
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = &self.stats;
        write!(
            f,
            "{} ({}) HP:{}/{} ATK:{} DEF:{} SPD:{}",
            self.name, self.role, s.health, s.max_health, s.attack, s.defense, s.speed
        )
    }
}

/// Monster category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MonsterKind {
    /// Regular wave mob.
    Goblin,
    /// Elite appended to every third wave.
    Boss,
}

/// A wave enemy. Lives for one wave only.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Monster {
    /// Display name.
    pub name: String,
    /// Regular or elite.
    pub kind: MonsterKind,
    /// Combat attributes; only health changes after spawn.
    pub stats: CombatStats,
}

impl Monster {
    /// Create a monster at full health.
    #[must_use]
    pub fn new(name: impl Into<String>, kind: MonsterKind, stats: CombatStats) -> Self {
        Self {
            name: name.into(),
            kind,
            stats,
        }
    }

    /// Check if this is the wave's elite.
    #[must_use]
    pub fn is_boss(&self) -> bool {
        self.kind == MonsterKind::Boss
    }
}

impl Combatant for Monster {
    fn name(&self) -> &str {
        &self.name
    }

    fn stats(&self) -> &CombatStats {
        &self.stats
    }

    fn stats_mut(&mut self) -> &mut CombatStats {
        &mut self.stats
    }
}

impl fmt::Display for Monster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = &self.stats;
        write!(
            f,
            "{} HP:{}/{} ATK:{} DEF:{} SPD:{}",
            self.name, s.health, s.max_health, s.attack, s.defense, s.speed
        )
    }
}

/// Number of living combatants in a roster.
pub fn count_alive<C: Combatant>(roster: &[C]) -> usize {
    roster.iter().filter(|c| c.is_alive()).count()
}

/// Check if any combatant in a roster is still alive.
pub fn any_alive<C: Combatant>(roster: &[C]) -> bool {
    roster.iter().any(Combatant::is_alive)
}
