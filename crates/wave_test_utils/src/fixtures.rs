//! Test fixtures and helpers.
//!
//! Pre-built parties and seeded generators for consistent testing.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use wave_core::combatant::{CombatStats, Player};
use wave_core::economy::GameVariant;
use wave_core::materials::Inventory;
use wave_core::roles::{create_player, Role};
use wave_core::session::Session;

/// Seed used by [`test_rng`].
pub const TEST_SEED: u64 = 12345;

/// Stats of a player strong enough to clear the opening waves.
pub const TANK_STATS: CombatStats = CombatStats::new(200, 20, 20, 5);

/// Create a seeded generator.
#[must_use]
pub fn seeded_rng(seed: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(seed)
}

/// Generator seeded with [`TEST_SEED`].
#[must_use]
pub fn test_rng() -> ChaCha8Rng {
    seeded_rng(TEST_SEED)
}

/// A player with [`TANK_STATS`].
#[must_use]
pub fn tank(name: &str) -> Player {
    Player::with_stats(Role::Knight, name, TANK_STATS)
}

/// `count` tanks named `Tank1..`.
#[must_use]
pub fn tank_party(count: usize) -> Vec<Player> {
    (1..=count).map(|i| tank(&format!("Tank{i}"))).collect()
}

/// Catalog players for `roles`, auto-named by seat.
#[must_use]
pub fn role_party(roles: &[Role]) -> Vec<Player> {
    roles
        .iter()
        .enumerate()
        .map(|(i, &role)| create_player(role, "", i + 1))
        .collect()
}

/// The three-player demo party: Knight, Mage, Rogue.
#[must_use]
pub fn demo_party() -> Vec<Player> {
    role_party(&[Role::Knight, Role::Mage, Role::Rogue])
}

/// Give `player` a starting inventory.
#[must_use]
pub fn stocked(mut player: Player, wood: u32, stone: u32, grass: u32) -> Player {
    player.inventory = Inventory::new(wood, stone, grass);
    player
}

/// A classic-variant session for `party`.
///
/// # Panics
///
/// Panics if `party` is empty.
#[must_use]
pub fn session(party: Vec<Player>, seed: u64) -> Session {
    Session::new(party, seed, GameVariant::Classic).expect("fixture party must not be empty")
}
