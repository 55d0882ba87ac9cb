//! Session metrics collection for balance analysis.
//!
//! A [`MetricsCollector`] watches a session as a [`WaveObserver`] and turns
//! the event stream into a [`SessionMetrics`] record; [`BatchSummary`]
//! aggregates many records.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use wave_core::economy::UpgradeKind;
use wave_core::events::{RosterSnapshot, RoundReport, Side, WaveObserver};
use wave_core::materials::Inventory;
use wave_core::orchestrator::WaveResult;
use wave_core::session::Session;

/// Complete metrics for a single session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionMetrics {
    /// Unique session identifier.
    pub session_id: String,
    /// Scenario name.
    pub scenario: String,
    /// Random seed used.
    pub seed: u64,
    /// Waves won.
    pub waves_cleared: u32,
    /// Last wave fought.
    pub last_wave: u32,
    /// Rounds fought across all waves.
    pub total_rounds: u32,
    /// Damage dealt by the party.
    pub damage_dealt: u64,
    /// Damage taken by the party.
    pub damage_taken: u64,
    /// Monsters defeated.
    pub monsters_defeated: u32,
    /// Materials that reached player inventories.
    pub materials_gathered: Inventory,
    /// Materials lost to uneven splits.
    pub materials_discarded: Inventory,
    /// Upgrades bought, by upgrade name.
    pub upgrades_applied: BTreeMap<String, u32>,
    /// Players alive at the end.
    pub survivors: usize,
    /// Final session state hash (for determinism validation).
    pub final_state_hash: u64,
}

impl SessionMetrics {
    /// Create a new metrics record.
    #[must_use]
    pub fn new(session_id: impl Into<String>, scenario: impl Into<String>, seed: u64) -> Self {
        Self {
            session_id: session_id.into(),
            scenario: scenario.into(),
            seed,
            ..Default::default()
        }
    }

    /// Total upgrades bought.
    #[must_use]
    pub fn total_upgrades(&self) -> u32 {
        self.upgrades_applied.values().sum()
    }
}

/// Observer that builds [`SessionMetrics`] while a session runs.
#[derive(Debug, Clone, Default)]
pub struct MetricsCollector {
    metrics: SessionMetrics,
}

impl MetricsCollector {
    /// Create a collector for a new session.
    #[must_use]
    pub fn new(session_id: &str, scenario: &str, seed: u64) -> Self {
        Self {
            metrics: SessionMetrics::new(session_id, scenario, seed),
        }
    }

    /// Record an intermission purchase.
    pub fn on_upgrade(&mut self, kind: UpgradeKind) {
        *self
            .metrics
            .upgrades_applied
            .entry(kind.name().to_string())
            .or_insert(0) += 1;
    }

    /// Metrics collected so far.
    #[must_use]
    pub fn current(&self) -> &SessionMetrics {
        &self.metrics
    }

    /// Finish with the session's final state.
    #[must_use]
    pub fn finalize(mut self, session: &Session) -> SessionMetrics {
        self.metrics.waves_cleared = session.waves_cleared();
        self.metrics.last_wave = session.history().last().map_or(0, |r| r.wave_index);
        self.metrics.survivors = session
            .players()
            .iter()
            .filter(|p| p.stats.is_alive())
            .count();
        self.metrics.final_state_hash = session.state_hash();
        self.metrics
    }
}

impl WaveObserver for MetricsCollector {
    fn on_round(&mut self, report: &RoundReport, _snapshot: &RosterSnapshot) {
        self.metrics.damage_dealt += u64::from(report.damage_by(Side::Player));
        self.metrics.damage_taken += u64::from(report.damage_by(Side::Monster));
        self.metrics.monsters_defeated +=
            u32::try_from(report.defeated_on(Side::Monster)).unwrap_or(u32::MAX);
    }

    fn on_wave_end(&mut self, result: &WaveResult) {
        self.metrics.total_rounds += result.rounds;
        for _ in 0..result.survivors {
            self.metrics
                .materials_gathered
                .add_all(&result.share_per_player);
        }
        self.metrics.materials_discarded.add_all(&result.discarded);
    }
}

/// Summary statistics across multiple sessions.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchSummary {
    /// Total sessions played.
    pub total_sessions: u32,
    /// Average waves cleared.
    pub mean_waves_cleared: f64,
    /// Fewest waves cleared.
    pub min_waves_cleared: u32,
    /// Most waves cleared.
    pub max_waves_cleared: u32,
    /// Average rounds per session.
    pub mean_rounds: f64,
    /// Average damage dealt per session.
    pub mean_damage_dealt: f64,
    /// Average upgrades bought per session.
    pub mean_upgrades: f64,
    /// Sessions per waves-cleared count.
    pub survival_histogram: BTreeMap<u32, u32>,
}

impl BatchSummary {
    /// Calculate summary from a list of session metrics.
    #[must_use]
    pub fn from_sessions(sessions: &[SessionMetrics]) -> Self {
        if sessions.is_empty() {
            return Self::default();
        }

        let n = sessions.len() as f64;
        let mut summary = Self {
            total_sessions: u32::try_from(sessions.len()).unwrap_or(u32::MAX),
            min_waves_cleared: u32::MAX,
            ..Default::default()
        };

        let mut waves_sum = 0u64;
        let mut rounds_sum = 0u64;
        let mut damage_sum = 0u64;
        let mut upgrades_sum = 0u64;

        for s in sessions {
            waves_sum += u64::from(s.waves_cleared);
            rounds_sum += u64::from(s.total_rounds);
            damage_sum += s.damage_dealt;
            upgrades_sum += u64::from(s.total_upgrades());
            summary.min_waves_cleared = summary.min_waves_cleared.min(s.waves_cleared);
            summary.max_waves_cleared = summary.max_waves_cleared.max(s.waves_cleared);
            *summary
                .survival_histogram
                .entry(s.waves_cleared)
                .or_default() += 1;
        }

        summary.mean_waves_cleared = waves_sum as f64 / n;
        summary.mean_rounds = rounds_sum as f64 / n;
        summary.mean_damage_dealt = damage_sum as f64 / n;
        summary.mean_upgrades = upgrades_sum as f64 / n;
        summary
    }

    /// Fraction of sessions that cleared at least `waves` waves.
    #[must_use]
    pub fn reach_rate(&self, waves: u32) -> f64 {
        if self.total_sessions == 0 {
            return 0.0;
        }
        let reached: u32 = self.survival_histogram.range(waves..).map(|(_, n)| n).sum();
        f64::from(reached) / f64::from(self.total_sessions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wave_test_utils::fixtures::{session, tank_party};

    fn metrics(waves_cleared: u32, rounds: u32) -> SessionMetrics {
        SessionMetrics {
            waves_cleared,
            total_rounds: rounds,
            ..SessionMetrics::new("s", "test", 0)
        }
    }

    #[test]
    fn test_summary_from_sessions() {
        let summary = BatchSummary::from_sessions(&[metrics(2, 10), metrics(4, 20), metrics(4, 30)]);
        assert_eq!(summary.total_sessions, 3);
        assert_eq!(summary.min_waves_cleared, 2);
        assert_eq!(summary.max_waves_cleared, 4);
        assert!((summary.mean_rounds - 20.0).abs() < 1e-9);
        assert_eq!(summary.survival_histogram.get(&4), Some(&2));
        assert!((summary.reach_rate(3) - 2.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_summary() {
        let summary = BatchSummary::from_sessions(&[]);
        assert_eq!(summary.total_sessions, 0);
        assert_eq!(summary.reach_rate(1), 0.0);
    }

    #[test]
    fn test_collector_tracks_session() {
        let mut s = session(tank_party(2), 11);
        let mut collector = MetricsCollector::new("s-11", "tanks", 11);
        let result = s.run_next_wave(&mut collector).unwrap();
        collector.on_upgrade(UpgradeKind::Weapon);

        assert_eq!(collector.current().total_rounds, result.rounds);
        assert_eq!(collector.current().monsters_defeated, 2);
        assert!(collector.current().damage_dealt >= 80);

        let m = collector.finalize(&s);
        assert_eq!(m.waves_cleared, 1);
        assert_eq!(m.last_wave, 1);
        assert_eq!(m.survivors, 2);
        assert_eq!(m.total_upgrades(), 1);
        assert_eq!(m.final_state_hash, s.state_hash());
        let mut expected = Inventory::default();
        expected.add_all(&result.share_per_player);
        expected.add_all(&result.share_per_player);
        assert_eq!(m.materials_gathered, expected);
    }
}
