//! Wave orchestration: generate, fight to the end, pay out drops.
//!
//! The orchestrator borrows the party for the duration of one wave and
//! hands it back when the wave is decided. On victory every monster in the
//! wave rolls 0-2 of each material; the totals are split evenly between the
//! surviving players and any remainder is discarded.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::combat::{evaluate, run_round};
use crate::combatant::{count_alive, Player};
use crate::error::{GameError, Result};
use crate::events::{NullObserver, RosterSnapshot, RoundOutcome, WaveObserver};
use crate::materials::{Inventory, MaterialKind};
use crate::wave::generate_wave;

/// Largest amount of one material a single monster can drop.
pub const MAX_DROP_PER_MONSTER: u32 = 2;

/// Default cap on rounds per wave.
pub const DEFAULT_ROUND_LIMIT: u32 = 10_000;

/// Tunables for wave resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaveConfig {
    /// Rounds after which an undecided wave is reported as an error.
    pub round_limit: u32,
}

impl Default for WaveConfig {
    fn default() -> Self {
        Self {
            round_limit: DEFAULT_ROUND_LIMIT,
        }
    }
}

/// Outcome of one wave.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaveResult {
    /// Wave index that was fought.
    pub wave_index: u32,
    /// True if the party survived.
    pub players_won: bool,
    /// Rounds it took to decide the wave.
    pub rounds: u32,
    /// Monsters in the wave.
    pub monster_count: usize,
    /// Players still standing at the end.
    pub survivors: usize,
    /// Total materials dropped by the wave (zero on defeat).
    pub material_drops: Inventory,
    /// Amount of each material every survivor received.
    pub share_per_player: Inventory,
    /// Remainder that could not be split evenly.
    pub discarded: Inventory,
}

/// Roll the material drops for a defeated wave.
///
/// For each material in [`MaterialKind::ALL`] order, every monster rolls
/// `0..=MAX_DROP_PER_MONSTER`.
pub fn roll_drops<R: Rng + ?Sized>(monster_count: usize, rng: &mut R) -> Inventory {
    let mut drops = Inventory::default();
    for kind in MaterialKind::ALL {
        let total: u32 = (0..monster_count)
            .map(|_| rng.gen_range(0..=MAX_DROP_PER_MONSTER))
            .sum();
        drops.add(kind, total);
    }
    drops
}

/// Split `drops` evenly between the living players.
///
/// Each survivor gets `total / survivors` of every material. Returns the
/// per-player share and the discarded remainder. With no survivors nothing
/// is handed out and everything is discarded.
pub fn distribute_drops(players: &mut [Player], drops: &Inventory) -> (Inventory, Inventory) {
    let survivors = u32::try_from(count_alive(players)).unwrap_or(u32::MAX);
    if survivors == 0 {
        return (Inventory::default(), *drops);
    }

    let mut share = Inventory::default();
    let mut discarded = Inventory::default();
    for (kind, total) in drops.iter() {
        share.add(kind, total / survivors);
        discarded.add(kind, total % survivors);
    }

    for player in players.iter_mut().filter(|p| p.stats.is_alive()) {
        player.inventory.add_all(&share);
    }
    (share, discarded)
}

/// Run a full wave with the default [`WaveConfig`] and no observer.
pub fn run_wave<R: Rng + ?Sized>(
    players: &mut [Player],
    index: u32,
    rng: &mut R,
) -> Result<WaveResult> {
    run_wave_with(players, index, &WaveConfig::default(), rng, &mut NullObserver)
}

/// Run a full wave.
///
/// Generates the wave, resolves rounds until one side is wiped (reporting
/// each round to `observer`), then distributes drops on victory.
///
/// # Errors
///
/// - [`GameError::EmptyParty`] if `players` is empty.
/// - [`GameError::InvalidWaveIndex`] for index 0.
/// - [`GameError::RoundLimitExceeded`] if the wave is still undecided after
///   `config.round_limit` rounds.
pub fn run_wave_with<R, O>(
    players: &mut [Player],
    index: u32,
    config: &WaveConfig,
    rng: &mut R,
    observer: &mut O,
) -> Result<WaveResult>
where
    R: Rng + ?Sized,
    O: WaveObserver + ?Sized,
{
    if players.is_empty() {
        return Err(GameError::EmptyParty);
    }

    let mut wave = generate_wave(index, rng)?;
    tracing::info!(
        wave = index,
        monsters = wave.len(),
        boss = wave.has_boss(),
        players_alive = count_alive(players),
        "Wave started"
    );
    observer.on_wave_start(&wave);

    let mut rounds = 0;
    let mut outcome = evaluate(players, &wave.monsters);
    while !outcome.is_decisive() {
        if rounds >= config.round_limit {
            tracing::warn!(wave = index, rounds, "Wave exceeded round limit");
            return Err(GameError::RoundLimitExceeded {
                wave: index,
                limit: config.round_limit,
            });
        }
        rounds += 1;
        let report = run_round(players, &mut wave.monsters, rounds, rng);
        outcome = report.outcome;
        observer.on_round(&report, &RosterSnapshot::capture(players, &wave.monsters));
    }

    let players_won = outcome == RoundOutcome::PlayersWon;
    let (material_drops, share_per_player, discarded) = if players_won {
        let drops = roll_drops(wave.len(), rng);
        let (share, discarded) = distribute_drops(players, &drops);
        (drops, share, discarded)
    } else {
        Default::default()
    };

    let result = WaveResult {
        wave_index: index,
        players_won,
        rounds,
        monster_count: wave.len(),
        survivors: count_alive(players),
        material_drops,
        share_per_player,
        discarded,
    };

    tracing::info!(
        wave = index,
        players_won,
        rounds,
        survivors = result.survivors,
        drops = %result.material_drops,
        "Wave finished"
    );
    observer.on_wave_end(&result);
    Ok(result)
}
