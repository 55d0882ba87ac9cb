//! Balance testing utilities.
//!
//! Runs many seeded sessions to measure how far parties get, plus a few
//! closed-form helpers for comparing roles against wave monsters.

use std::collections::BTreeMap;
use std::ops::Range;

use wave_core::combatant::{CombatStats, Player};
use wave_core::damage::damage_range;
use wave_core::economy::GameVariant;
use wave_core::roles::Role;
use wave_core::session::Session;
use wave_core::wave::FIRST_WAVE_GOBLIN;

use crate::determinism::advance;

/// Statistics over a set of sessions.
#[derive(Debug, Clone, Default)]
pub struct SurvivalStats {
    /// Sessions run.
    pub sessions: u32,
    /// Sum of waves cleared across sessions.
    pub total_waves_cleared: u64,
    /// Most waves cleared by one session.
    pub best: u32,
    /// Fewest waves cleared by one session.
    pub worst: u32,
    /// Number of sessions per waves-cleared count.
    pub histogram: BTreeMap<u32, u32>,
}

impl SurvivalStats {
    /// Record one finished session.
    pub fn record(&mut self, waves_cleared: u32) {
        if self.sessions == 0 {
            self.worst = waves_cleared;
        }
        self.sessions += 1;
        self.total_waves_cleared += u64::from(waves_cleared);
        self.best = self.best.max(waves_cleared);
        self.worst = self.worst.min(waves_cleared);
        *self.histogram.entry(waves_cleared).or_insert(0) += 1;
    }

    /// Mean waves cleared (0.0 with no sessions).
    pub fn mean_waves_cleared(&self) -> f64 {
        if self.sessions == 0 {
            return 0.0;
        }
        self.total_waves_cleared as f64 / f64::from(self.sessions)
    }

    /// Fraction of sessions that cleared at least `wave` waves.
    pub fn reach_rate(&self, wave: u32) -> f64 {
        if self.sessions == 0 {
            return 0.0;
        }
        let reached: u32 = self.histogram.range(wave..).map(|(_, n)| n).sum();
        f64::from(reached) / f64::from(self.sessions)
    }
}

/// Run one session per seed, each for at most `max_waves` waves.
pub fn run_survival_trials<F>(
    make_party: F,
    seeds: Range<u64>,
    max_waves: u32,
    variant: GameVariant,
) -> SurvivalStats
where
    F: Fn() -> Vec<Player>,
{
    let mut stats = SurvivalStats::default();
    for seed in seeds {
        let Ok(mut session) = Session::new(make_party(), seed, variant) else {
            continue;
        };
        while !session.is_over() && session.next_wave() <= max_waves {
            let before = session.next_wave();
            advance(&mut session);
            if session.next_wave() == before {
                // Wave errored; nothing more to learn from this seed.
                break;
            }
        }
        stats.record(session.waves_cleared());
    }
    stats
}

/// Fewest and most hits `attacker` needs to defeat a full-health `target`.
pub fn hits_to_defeat(attacker: &CombatStats, target: &CombatStats) -> (u32, u32) {
    let (low, high) = damage_range(attacker.attack, target.defense);
    (
        target.max_health.div_ceil(high),
        target.max_health.div_ceil(low),
    )
}

/// Hits each role needs against a wave-1 goblin.
pub fn role_hit_matrix() -> Vec<(Role, (u32, u32))> {
    let (health, attack, defense, speed) = FIRST_WAVE_GOBLIN;
    let goblin = CombatStats::new(health, attack, defense, speed);
    Role::ALL
        .into_iter()
        .map(|role| {
            let t = role.template();
            let stats = CombatStats::new(t.health, t.attack, t.defense, t.speed);
            (role, hits_to_defeat(&stats, &goblin))
        })
        .collect()
}
