//! Progress events for renderers and drivers.
//!
//! The engine reports what happened in every round through a
//! [`WaveObserver`]. Observers only watch; nothing they do feeds back into
//! combat.

use serde::{Deserialize, Serialize};

use crate::combatant::{Combatant, Monster, Player};
use crate::orchestrator::WaveResult;
use crate::wave::Wave;

/// Which side of the fight a combatant is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    /// Party member.
    Player,
    /// Wave monster.
    Monster,
}

/// Position of a combatant in its roster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CombatantRef {
    /// Roster the combatant belongs to.
    pub side: Side,
    /// Index within that roster.
    pub index: usize,
}

impl CombatantRef {
    /// Reference to a player slot.
    #[must_use]
    pub const fn player(index: usize) -> Self {
        Self {
            side: Side::Player,
            index,
        }
    }

    /// Reference to a monster slot.
    #[must_use]
    pub const fn monster(index: usize) -> Self {
        Self {
            side: Side::Monster,
            index,
        }
    }
}

/// A single resolved attack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttackAction {
    /// Who attacked.
    pub attacker: CombatantRef,
    /// Who was hit.
    pub target: CombatantRef,
    /// Damage applied.
    pub damage: u32,
    /// Target health after the hit.
    pub target_health: u32,
    /// Whether this hit defeated the target.
    pub defeated: bool,
}

/// How a round left the fight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoundOutcome {
    /// No monster is left standing.
    PlayersWon,
    /// No player is left standing.
    PlayersLost,
    /// Both sides still have living members.
    Ongoing,
}

impl RoundOutcome {
    /// True if the players have now defeated every monster.
    #[must_use]
    pub const fn players_won(self) -> bool {
        matches!(self, RoundOutcome::PlayersWon)
    }

    /// True if either side has been wiped.
    #[must_use]
    pub const fn is_decisive(self) -> bool {
        !matches!(self, RoundOutcome::Ongoing)
    }
}

/// Everything that happened in one round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundReport {
    /// 1-based round number within the wave.
    pub round: u32,
    /// Attacks in the order they resolved.
    pub actions: Vec<AttackAction>,
    /// State of the fight after the round.
    pub outcome: RoundOutcome,
}

impl RoundReport {
    /// Total damage dealt by one side this round.
    #[must_use]
    pub fn damage_by(&self, side: Side) -> u32 {
        self.actions
            .iter()
            .filter(|a| a.attacker.side == side)
            .fold(0u32, |total, a| total.saturating_add(a.damage))
    }

    /// Number of combatants of `side` defeated this round.
    #[must_use]
    pub fn defeated_on(&self, side: Side) -> usize {
        self.actions
            .iter()
            .filter(|a| a.defeated && a.target.side == side)
            .count()
    }
}

/// Health of one combatant at a point in time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthEntry {
    /// Display name.
    pub name: String,
    /// Current health.
    pub health: u32,
    /// Maximum health.
    pub max_health: u32,
}

impl HealthEntry {
    fn of<C: Combatant>(c: &C) -> Self {
        Self {
            name: c.name().to_string(),
            health: c.health(),
            max_health: c.stats().max_health,
        }
    }
}

/// Health of every combatant after a round, for rendering.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RosterSnapshot {
    /// Players in roster order.
    pub players: Vec<HealthEntry>,
    /// Monsters in roster order.
    pub monsters: Vec<HealthEntry>,
}

impl RosterSnapshot {
    /// Capture the current health of both rosters.
    #[must_use]
    pub fn capture(players: &[Player], monsters: &[Monster]) -> Self {
        Self {
            players: players.iter().map(HealthEntry::of).collect(),
            monsters: monsters.iter().map(HealthEntry::of).collect(),
        }
    }
}

/// Callback interface for wave progress.
///
/// All methods default to no-ops so observers implement only what they
/// render.
pub trait WaveObserver {
    /// A wave has been generated and is about to be fought.
    fn on_wave_start(&mut self, _wave: &Wave) {}

    /// A round has been resolved.
    fn on_round(&mut self, _report: &RoundReport, _snapshot: &RosterSnapshot) {}

    /// The wave has ended and drops (if any) have been distributed.
    fn on_wave_end(&mut self, _result: &WaveResult) {}
}

/// Observer that ignores every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullObserver;

impl WaveObserver for NullObserver {}

/// Observer that keeps every round report, mostly for tests.
#[derive(Debug, Clone, Default)]
pub struct RecordingObserver {
    /// Waves seen, by index.
    pub waves_started: Vec<u32>,
    /// Every round report with its snapshot.
    pub rounds: Vec<(RoundReport, RosterSnapshot)>,
    /// Every wave result.
    pub results: Vec<WaveResult>,
}

impl WaveObserver for RecordingObserver {
    fn on_wave_start(&mut self, wave: &Wave) {
        self.waves_started.push(wave.index);
    }

    fn on_round(&mut self, report: &RoundReport, snapshot: &RosterSnapshot) {
        self.rounds.push((report.clone(), snapshot.clone()));
    }

    fn on_wave_end(&mut self, result: &WaveResult) {
        self.results.push(result.clone());
    }
}
