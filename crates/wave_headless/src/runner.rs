//! Headless session runner.
//!
//! Plays a scenario from its first wave until the party falls (or the wave
//! cap is reached), running the strategy between waves and streaming
//! [`ProgressEvent`]s as JSON lines.

use std::io::{self, Write};

use thiserror::Error;
use wave_core::error::GameError;
use wave_core::events::{RosterSnapshot, RoundReport, WaveObserver};
use wave_core::orchestrator::WaveResult;
use wave_core::wave::Wave;

use crate::metrics::{MetricsCollector, SessionMetrics};
use crate::protocol::ProgressEvent;
use crate::scenario::{Scenario, ScenarioError};
use crate::strategies::{Strategy, StrategyError};

/// Error type for a headless run.
#[derive(Error, Debug)]
pub enum RunError {
    /// Scenario could not be loaded or started.
    #[error(transparent)]
    Scenario(#[from] ScenarioError),
    /// Strategy could not be resolved.
    #[error(transparent)]
    Strategy(#[from] StrategyError),
    /// The engine rejected a call.
    #[error("Engine error: {0}")]
    Engine(#[from] GameError),
    /// Writing progress events failed.
    #[error("Failed to write progress: {0}")]
    Io(#[from] io::Error),
}

/// Runner configuration.
#[derive(Debug, Clone, Default)]
pub struct RunConfig {
    /// Seed override (scenario seed if `None`).
    pub seed: Option<u64>,
    /// Wave cap override (scenario cap if `None`).
    pub max_waves: Option<u32>,
    /// Emit a `round_completed` event for every round.
    pub emit_rounds: bool,
}

/// Observer that streams events and collects metrics at the same time.
struct StreamObserver<'a, W: Write> {
    out: &'a mut W,
    metrics: &'a mut MetricsCollector,
    emit_rounds: bool,
    wave: u32,
    error: Option<io::Error>,
}

impl<W: Write> StreamObserver<'_, W> {
    fn emit(&mut self, event: &ProgressEvent) {
        if self.error.is_some() {
            return;
        }
        if let Err(e) = self.out.write_all(event.to_json_line().as_bytes()) {
            self.error = Some(e);
        }
    }

    fn finish(self) -> io::Result<()> {
        self.error.map_or(Ok(()), Err)
    }
}

impl<W: Write> WaveObserver for StreamObserver<'_, W> {
    fn on_wave_start(&mut self, wave: &Wave) {
        self.wave = wave.index;
        self.metrics.on_wave_start(wave);
        self.emit(&ProgressEvent::wave_started(wave));
    }

    fn on_round(&mut self, report: &RoundReport, snapshot: &RosterSnapshot) {
        self.metrics.on_round(report, snapshot);
        if self.emit_rounds {
            self.emit(&ProgressEvent::round_completed(self.wave, report, snapshot));
        }
    }

    fn on_wave_end(&mut self, result: &WaveResult) {
        self.metrics.on_wave_end(result);
        self.emit(&ProgressEvent::wave_finished(result));
    }
}

/// Runs one scenario with one strategy.
#[derive(Debug, Clone)]
pub struct SessionRunner {
    scenario: Scenario,
    strategy: Strategy,
}

impl SessionRunner {
    /// Create a runner, resolving the scenario's strategy name.
    pub fn new(scenario: Scenario) -> Result<Self, RunError> {
        let strategy = Strategy::resolve(&scenario.strategy)?;
        Ok(Self { scenario, strategy })
    }

    /// Create a runner with an explicit strategy.
    #[must_use]
    pub fn with_strategy(scenario: Scenario, strategy: Strategy) -> Self {
        Self { scenario, strategy }
    }

    /// Scenario being run.
    #[must_use]
    pub fn scenario(&self) -> &Scenario {
        &self.scenario
    }

    /// Strategy used in intermissions.
    #[must_use]
    pub fn strategy(&self) -> &Strategy {
        &self.strategy
    }

    /// Play a full session, writing progress events to `out`.
    pub fn run<W: Write>(&self, config: &RunConfig, out: &mut W) -> Result<SessionMetrics, RunError> {
        let mut session = self.scenario.start_session(config.seed)?;
        let seed = session.seed();
        let max_waves = config.max_waves.or(self.scenario.max_waves);
        let mut collector =
            MetricsCollector::new(&format!("session_{seed}"), &self.scenario.name, seed);

        tracing::info!(
            scenario = %self.scenario.name,
            strategy = %self.strategy.name,
            seed,
            max_waves = ?max_waves,
            "Session starting"
        );

        while !session.is_over() && max_waves.map_or(true, |cap| session.next_wave() <= cap) {
            let mut observer = StreamObserver {
                out: &mut *out,
                metrics: &mut collector,
                emit_rounds: config.emit_rounds,
                wave: session.next_wave(),
                error: None,
            };
            let result = session.run_next_wave(&mut observer)?;
            observer.finish()?;

            if session.is_over() {
                break;
            }

            for purchase in self.strategy.run_intermission(&mut session)? {
                collector.on_upgrade(purchase.applied.kind);
                let player = &session.players()[purchase.player];
                let event = ProgressEvent::UpgradeApplied {
                    wave: result.wave_index,
                    player: player.name.clone(),
                    upgrade: purchase.applied.kind,
                    attack: purchase.applied.after.attack,
                    defense: purchase.applied.after.defense,
                    health: purchase.applied.after.health,
                };
                out.write_all(event.to_json_line().as_bytes())?;
            }
        }

        let metrics = collector.finalize(&session);
        let event = ProgressEvent::SessionOver {
            waves_cleared: metrics.waves_cleared,
            last_wave: metrics.last_wave,
            final_hash: metrics.final_state_hash,
        };
        out.write_all(event.to_json_line().as_bytes())?;
        out.flush()?;

        tracing::info!(
            seed,
            waves_cleared = metrics.waves_cleared,
            rounds = metrics.total_rounds,
            hash = metrics.final_state_hash,
            "Session finished"
        );
        Ok(metrics)
    }

    /// Play a full session without emitting anything.
    pub fn run_silent(&self, seed: u64, max_waves: Option<u32>) -> Result<SessionMetrics, RunError> {
        let config = RunConfig {
            seed: Some(seed),
            max_waves,
            emit_rounds: false,
        };
        self.run(&config, &mut io::sink())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn events(output: &[u8]) -> Vec<ProgressEvent> {
        String::from_utf8_lossy(output)
            .lines()
            .map(|line| ProgressEvent::from_json(line).unwrap())
            .collect()
    }

    #[test]
    fn test_demo_run_emits_protocol() {
        let runner = SessionRunner::new(Scenario::demo()).unwrap();
        let mut out = Vec::new();
        let config = RunConfig {
            seed: Some(3),
            max_waves: Some(4),
            emit_rounds: true,
        };
        let metrics = runner.run(&config, &mut out).unwrap();

        let events = events(&out);
        assert!(matches!(events.first(), Some(ProgressEvent::WaveStarted { wave: 1, .. })));
        assert!(matches!(events.last(), Some(ProgressEvent::SessionOver { .. })));
        let finished = events
            .iter()
            .filter(|e| e.name() == "wave_finished")
            .count();
        assert_eq!(finished as u32, metrics.last_wave);
        assert!(metrics.last_wave <= 4);
        let rounds = events
            .iter()
            .filter(|e| e.name() == "round_completed")
            .count();
        assert_eq!(rounds as u32, metrics.total_rounds);
    }

    #[test]
    fn test_quiet_run_skips_rounds() {
        let runner = SessionRunner::new(Scenario::demo()).unwrap();
        let mut out = Vec::new();
        let config = RunConfig {
            seed: Some(3),
            max_waves: Some(2),
            emit_rounds: false,
        };
        runner.run(&config, &mut out).unwrap();
        assert!(events(&out).iter().all(|e| e.name() != "round_completed"));
    }

    #[test]
    fn test_upgrade_events_match_metrics() {
        let runner = SessionRunner::new(Scenario::demo()).unwrap();
        let mut out = Vec::new();
        let config = RunConfig {
            seed: Some(21),
            max_waves: Some(6),
            emit_rounds: false,
        };
        let metrics = runner.run(&config, &mut out).unwrap();
        let upgrades = events(&out)
            .iter()
            .filter(|e| e.name() == "upgrade_applied")
            .count();
        assert_eq!(upgrades as u32, metrics.total_upgrades());
    }

    #[test]
    fn test_silent_runs_are_repeatable() {
        let runner = SessionRunner::new(Scenario::demo()).unwrap();
        let a = runner.run_silent(77, Some(10)).unwrap();
        let b = runner.run_silent(77, Some(10)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_unknown_strategy_is_reported() {
        let mut scenario = Scenario::demo();
        scenario.strategy = "berserk".to_string();
        assert!(matches!(
            SessionRunner::new(scenario),
            Err(RunError::Strategy(StrategyError::UnknownStrategy(_)))
        ));
    }
}
