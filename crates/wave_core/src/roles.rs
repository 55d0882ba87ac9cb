//! Player archetypes and their template stats.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::combatant::Player;
use crate::error::GameError;

/// Selectable player archetype.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// Sturdy front-liner.
    Knight,
    /// Fragile heavy hitter.
    Mage,
    /// Fastest role.
    Rogue,
    /// All-rounder.
    Archer,
}

/// Static catalog entry for a role.
///
/// The ability fields are descriptive only; combat never reads them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoleTemplate {
    /// Role this template belongs to.
    pub role: Role,
    /// Short description shown in selection menus.
    pub description: &'static str,
    /// Single-character map symbol.
    pub symbol: char,
    /// Ability name.
    pub ability: &'static str,
    /// Ability description.
    pub ability_description: &'static str,
    /// Starting and maximum health.
    pub health: u32,
    /// Starting attack.
    pub attack: u32,
    /// Starting defense.
    pub defense: u32,
    /// Speed.
    pub speed: u32,
}

/// The fixed role catalog, in menu order.
pub static ROLE_TEMPLATES: [RoleTemplate; 4] = [
    RoleTemplate {
        role: Role::Knight,
        description: "Strong in defense",
        symbol: 'K',
        ability: "Shield Wall",
        ability_description: "Braces behind the shield to protect allies",
        health: 130,
        attack: 10,
        defense: 10,
        speed: 3,
    },
    RoleTemplate {
        role: Role::Mage,
        description: "Strong spell damage",
        symbol: 'M',
        ability: "Fireball",
        ability_description: "Hurls a ball of fire at every enemy",
        health: 90,
        attack: 16,
        defense: 4,
        speed: 5,
    },
    RoleTemplate {
        role: Role::Rogue,
        description: "High dexterity",
        symbol: 'R',
        ability: "Backstab",
        ability_description: "Strikes a distracted enemy from behind",
        health: 100,
        attack: 12,
        defense: 6,
        speed: 8,
    },
    RoleTemplate {
        role: Role::Archer,
        description: "Good range",
        symbol: 'A',
        ability: "Volley",
        ability_description: "Looses a rain of arrows over the battlefield",
        health: 110,
        attack: 13,
        defense: 7,
        speed: 6,
    },
];

impl Role {
    /// All roles, in menu order.
    pub const ALL: [Role; 4] = [Role::Knight, Role::Mage, Role::Rogue, Role::Archer];

    /// Catalog entry for this role.
    #[must_use]
    pub fn template(self) -> &'static RoleTemplate {
        match self {
            Role::Knight => &ROLE_TEMPLATES[0],
            Role::Mage => &ROLE_TEMPLATES[1],
            Role::Rogue => &ROLE_TEMPLATES[2],
            Role::Archer => &ROLE_TEMPLATES[3],
        }
    }

    /// Role for a 1-based menu key ("1" to "4").
    pub fn from_choice(choice: &str) -> Result<Self, GameError> {
        match choice.trim() {
            "1" => Ok(Role::Knight),
            "2" => Ok(Role::Mage),
            "3" => Ok(Role::Rogue),
            "4" => Ok(Role::Archer),
            other => Err(GameError::UnknownRole(other.to_string())),
        }
    }

    /// Display name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Role::Knight => "Knight",
            Role::Mage => "Mage",
            Role::Rogue => "Rogue",
            Role::Archer => "Archer",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Role {
    type Err = GameError;

    /// Accepts either a menu key or a case-insensitive role name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Role::ALL
            .into_iter()
            .find(|role| role.name().eq_ignore_ascii_case(trimmed))
            .map_or_else(|| Role::from_choice(trimmed), Ok)
    }
}

/// Create a player from the catalog.
///
/// A blank name falls back to `Player{position}`, where `position` is the
/// 1-based seat in the party.
#[must_use]
pub fn create_player(role: Role, name: &str, position: usize) -> Player {
    let name = name.trim();
    if name.is_empty() {
        Player::from_role(role, format!("Player{position}"))
    } else {
        Player::from_role(role, name)
    }
}
