//! Upgrade rules: turning materials into permanent stat changes.
//!
//! | Upgrade        | Cost    | Effect                               |
//! |----------------|---------|--------------------------------------|
//! | Weapon         | 2 wood  | attack +2                            |
//! | Healing Draft  | 1 grass | heal 30, capped at max health        |
//! | Shield         | 2 stone | defense +2                           |
//! | Building Block | 4 wood  | placed blocks +1 (Builder variant)   |
//!
//! Upgrades are all-or-nothing: a rejected request leaves the player
//! exactly as it was.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::combatant::{CombatStats, Player};
use crate::error::{GameError, UpgradeRejection};
use crate::materials::{MaterialCost, MaterialKind};

/// Attack gained from a Weapon.
pub const WEAPON_ATTACK_BONUS: u32 = 2;

/// Defense gained from a Shield.
pub const SHIELD_DEFENSE_BONUS: u32 = 2;

/// Health restored by a Healing Draft.
pub const HEALING_DRAFT_AMOUNT: u32 = 30;

/// Rule set in play. The Builder variant adds the Building Block upgrade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum GameVariant {
    /// Weapons, drafts and shields.
    #[default]
    Classic,
    /// Classic plus building blocks.
    Builder,
}

/// A purchasable upgrade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UpgradeKind {
    /// +2 attack for 2 wood.
    Weapon,
    /// +30 health (capped) for 1 grass.
    HealingDraft,
    /// +2 defense for 2 stone.
    Shield,
    /// +1 placed block for 4 wood. Builder variant only.
    BuildingBlock,
}

impl UpgradeKind {
    /// All upgrades, in menu order.
    pub const ALL: [UpgradeKind; 4] = [
        UpgradeKind::Weapon,
        UpgradeKind::HealingDraft,
        UpgradeKind::Shield,
        UpgradeKind::BuildingBlock,
    ];

    /// Material price.
    #[must_use]
    pub const fn cost(self) -> MaterialCost {
        match self {
            UpgradeKind::Weapon => MaterialCost::single(MaterialKind::Wood, 2),
            UpgradeKind::HealingDraft => MaterialCost::single(MaterialKind::Grass, 1),
            UpgradeKind::Shield => MaterialCost::single(MaterialKind::Stone, 2),
            UpgradeKind::BuildingBlock => MaterialCost::single(MaterialKind::Wood, 4),
        }
    }

    /// Check if the upgrade can be bought under `variant`.
    #[must_use]
    pub const fn available_in(self, variant: GameVariant) -> bool {
        match self {
            UpgradeKind::BuildingBlock => matches!(variant, GameVariant::Builder),
            _ => true,
        }
    }

    /// Upgrades offered under `variant`, in menu order.
    pub fn offered(variant: GameVariant) -> impl Iterator<Item = UpgradeKind> {
        Self::ALL.into_iter().filter(move |u| u.available_in(variant))
    }

    /// Upgrade for a 1-based menu key ("1" to "4").
    pub fn from_choice(choice: &str) -> Result<Self, GameError> {
        match choice.trim() {
            "1" => Ok(UpgradeKind::Weapon),
            "2" => Ok(UpgradeKind::HealingDraft),
            "3" => Ok(UpgradeKind::Shield),
            "4" => Ok(UpgradeKind::BuildingBlock),
            other => Err(GameError::UnknownUpgrade(other.to_string())),
        }
    }

    /// Display name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            UpgradeKind::Weapon => "Weapon",
            UpgradeKind::HealingDraft => "Healing Draft",
            UpgradeKind::Shield => "Shield",
            UpgradeKind::BuildingBlock => "Building Block",
        }
    }
}

impl fmt::Display for UpgradeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for UpgradeKind {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, ' ' | '_' | '-'))
            .collect::<String>()
            .to_ascii_lowercase();
        match normalized.as_str() {
            "weapon" => Ok(UpgradeKind::Weapon),
            "healingdraft" | "draft" | "heal" => Ok(UpgradeKind::HealingDraft),
            "shield" => Ok(UpgradeKind::Shield),
            "buildingblock" | "block" => Ok(UpgradeKind::BuildingBlock),
            _ => UpgradeKind::from_choice(s),
        }
    }
}

/// A successfully applied upgrade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppliedUpgrade {
    /// What was bought.
    pub kind: UpgradeKind,
    /// Materials paid.
    pub paid: MaterialCost,
    /// Stats before the upgrade.
    pub before: CombatStats,
    /// Stats after the upgrade.
    pub after: CombatStats,
}

/// Check whether `player` could buy `kind` right now.
pub fn check_upgrade(
    player: &Player,
    kind: UpgradeKind,
    variant: GameVariant,
) -> Result<(), UpgradeRejection> {
    if !kind.available_in(variant) {
        return Err(UpgradeRejection::UnavailableInVariant);
    }
    if !player.stats.is_alive() {
        return Err(UpgradeRejection::PlayerDefeated);
    }
    if let Some((short, required, available)) = player.inventory.shortfall(&kind.cost()) {
        return Err(UpgradeRejection::InsufficientMaterials {
            kind: short,
            required,
            available,
        });
    }
    Ok(())
}

/// Buy `kind` for `player`: pay the exact cost and apply the effect.
///
/// # Errors
///
/// Returns an [`UpgradeRejection`] (and changes nothing) if the upgrade is
/// not offered in `variant`, the player is defeated, or the player cannot
/// afford it.
pub fn apply_upgrade(
    player: &mut Player,
    kind: UpgradeKind,
    variant: GameVariant,
) -> Result<AppliedUpgrade, UpgradeRejection> {
    if let Err(rejection) = check_upgrade(player, kind, variant) {
        tracing::debug!(player = %player.name, upgrade = %kind, %rejection, "Upgrade rejected");
        return Err(rejection);
    }

    let cost = kind.cost();
    let paid = player.inventory.spend(&cost);
    debug_assert!(paid, "affordability was checked");

    let before = player.stats;
    match kind {
        UpgradeKind::Weapon => {
            player.stats.attack = player.stats.attack.saturating_add(WEAPON_ATTACK_BONUS);
        }
        UpgradeKind::HealingDraft => {
            player.stats.heal(HEALING_DRAFT_AMOUNT);
        }
        UpgradeKind::Shield => {
            player.stats.defense = player.stats.defense.saturating_add(SHIELD_DEFENSE_BONUS);
        }
        UpgradeKind::BuildingBlock => player.placed_blocks = player.placed_blocks.saturating_add(1),
    }

    tracing::debug!(
        player = %player.name,
        upgrade = %kind,
        attack = player.stats.attack,
        defense = player.stats.defense,
        health = player.stats.health,
        "Upgrade applied"
    );

    Ok(AppliedUpgrade {
        kind,
        paid: cost,
        before,
        after: player.stats,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combatant::Combatant;
    use crate::materials::Inventory;
    use crate::roles::Role;

    fn knight_with(inventory: Inventory) -> Player {
        let mut p = Player::from_role(Role::Knight, "Kay");
        p.inventory = inventory;
        p
    }

    #[test]
    fn test_weapon_exactly_once_with_two_wood() {
        let mut p = knight_with(Inventory::new(2, 0, 0));

        let applied = apply_upgrade(&mut p, UpgradeKind::Weapon, GameVariant::Classic).unwrap();
        assert_eq!(applied.after.attack, 12);
        assert_eq!(p.inventory, Inventory::default());

        let second = apply_upgrade(&mut p, UpgradeKind::Weapon, GameVariant::Classic);
        assert_eq!(
            second,
            Err(UpgradeRejection::InsufficientMaterials {
                kind: MaterialKind::Wood,
                required: 2,
                available: 0,
            })
        );
        assert_eq!(p.stats.attack, 12);
    }

    #[test]
    fn test_shield_adds_defense() {
        let mut p = knight_with(Inventory::new(0, 3, 0));
        apply_upgrade(&mut p, UpgradeKind::Shield, GameVariant::Classic).unwrap();
        assert_eq!(p.stats.defense, 12);
        assert_eq!(p.inventory.get(MaterialKind::Stone), 1);
    }

    #[test]
    fn test_stat_upgrades_saturate() {
        let mut p = knight_with(Inventory::new(2, 2, 0));
        p.stats.attack = u32::MAX;
        p.stats.defense = u32::MAX - 1;

        let weapon = apply_upgrade(&mut p, UpgradeKind::Weapon, GameVariant::Classic).unwrap();
        assert_eq!(weapon.after.attack, u32::MAX);
        let shield = apply_upgrade(&mut p, UpgradeKind::Shield, GameVariant::Classic).unwrap();
        assert_eq!(shield.after.defense, u32::MAX);
        assert_eq!(p.inventory, Inventory::EMPTY);
    }

    #[test]
    fn test_healing_draft_caps_at_max() {
        let mut p = knight_with(Inventory::new(0, 0, 2));
        p.apply_damage(10);

        apply_upgrade(&mut p, UpgradeKind::HealingDraft, GameVariant::Classic).unwrap();
        assert_eq!(p.stats.health, 130);

        p.apply_damage(100);
        apply_upgrade(&mut p, UpgradeKind::HealingDraft, GameVariant::Classic).unwrap();
        assert_eq!(p.stats.health, 60);
        assert_eq!(p.inventory.get(MaterialKind::Grass), 0);
    }

    #[test]
    fn test_defeated_player_cannot_upgrade() {
        let mut p = knight_with(Inventory::new(10, 10, 10));
        p.apply_damage(1000);

        let result = apply_upgrade(&mut p, UpgradeKind::HealingDraft, GameVariant::Classic);
        assert_eq!(result, Err(UpgradeRejection::PlayerDefeated));
        assert_eq!(p.stats.health, 0);
        assert_eq!(p.inventory, Inventory::new(10, 10, 10));
    }

    #[test]
    fn test_building_block_only_in_builder_variant() {
        let mut p = knight_with(Inventory::new(8, 0, 0));

        assert_eq!(
            apply_upgrade(&mut p, UpgradeKind::BuildingBlock, GameVariant::Classic),
            Err(UpgradeRejection::UnavailableInVariant)
        );
        assert_eq!(p.inventory.get(MaterialKind::Wood), 8);

        let applied =
            apply_upgrade(&mut p, UpgradeKind::BuildingBlock, GameVariant::Builder).unwrap();
        assert_eq!(applied.before, applied.after);
        assert_eq!(p.placed_blocks, 1);
        assert_eq!(p.inventory.get(MaterialKind::Wood), 4);
    }

    #[test]
    fn test_menu_choices() {
        assert_eq!(UpgradeKind::from_choice("1"), Ok(UpgradeKind::Weapon));
        assert_eq!(UpgradeKind::from_choice("3"), Ok(UpgradeKind::Shield));
        assert_eq!(
            UpgradeKind::from_choice(""),
            Err(GameError::UnknownUpgrade(String::new()))
        );
        assert_eq!("healing_draft".parse::<UpgradeKind>(), Ok(UpgradeKind::HealingDraft));
        assert_eq!("Building Block".parse::<UpgradeKind>(), Ok(UpgradeKind::BuildingBlock));
        assert_eq!("2".parse::<UpgradeKind>(), Ok(UpgradeKind::HealingDraft));
        assert!("armor".parse::<UpgradeKind>().is_err());
    }

    #[test]
    fn test_offered_upgrades_by_variant() {
        assert_eq!(UpgradeKind::offered(GameVariant::Classic).count(), 3);
        assert_eq!(UpgradeKind::offered(GameVariant::Builder).count(), 4);
    }
}
