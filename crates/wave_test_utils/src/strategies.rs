//! Proptest strategies for engine inputs.
//!
//! These strategies generate random but reproducible inputs for
//! property-based tests of combat, economy and sessions.

use proptest::prelude::*;
use wave_core::combatant::{CombatStats, Player};
use wave_core::economy::{GameVariant, UpgradeKind};
use wave_core::materials::Inventory;
use wave_core::roles::{create_player, Role};

/// Any catalog role.
pub fn arb_role() -> impl Strategy<Value = Role> {
    prop::sample::select(Role::ALL.to_vec())
}

/// Any upgrade, including variant-gated ones.
pub fn arb_upgrade_kind() -> impl Strategy<Value = UpgradeKind> {
    prop::sample::select(UpgradeKind::ALL.to_vec())
}

/// Either game variant.
pub fn arb_variant() -> impl Strategy<Value = GameVariant> {
    prop_oneof![Just(GameVariant::Classic), Just(GameVariant::Builder)]
}

/// Wave indices (1-60).
pub fn arb_wave_index() -> impl Strategy<Value = u32> {
    1u32..60
}

/// Health values (1-500).
pub fn arb_health() -> impl Strategy<Value = u32> {
    1u32..500
}

/// Full-health combat stats in a playable range.
pub fn arb_stats() -> impl Strategy<Value = CombatStats> {
    (arb_health(), 1u32..60, 0u32..30, 1u32..12)
        .prop_map(|(health, attack, defense, speed)| CombatStats::new(health, attack, defense, speed))
}

/// Small material stockpiles.
pub fn arb_inventory() -> impl Strategy<Value = Inventory> {
    (0u32..10, 0u32..10, 0u32..10).prop_map(|(w, s, g)| Inventory::new(w, s, g))
}

/// A catalog party of 1 to `max_size` players.
pub fn arb_party(max_size: usize) -> impl Strategy<Value = Vec<Player>> {
    proptest::collection::vec(arb_role(), 1..=max_size.max(1)).prop_map(|roles| {
        roles
            .into_iter()
            .enumerate()
            .map(|(i, role)| create_player(role, "", i + 1))
            .collect()
    })
}

/// A party with arbitrary stats and stockpiles.
pub fn arb_custom_party(max_size: usize) -> impl Strategy<Value = Vec<Player>> {
    proptest::collection::vec((arb_role(), arb_stats(), arb_inventory()), 1..=max_size.max(1))
        .prop_map(|members| {
            members
                .into_iter()
                .enumerate()
                .map(|(i, (role, stats, inventory))| {
                    let mut p = Player::with_stats(role, format!("P{}", i + 1), stats);
                    p.inventory = inventory;
                    p
                })
                .collect()
        })
}
