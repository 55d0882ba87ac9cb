//! Batch session runner for balance testing.
//!
//! Runs many seeds of one scenario in parallel using rayon. Sessions share
//! nothing; each seed owns its own generator and party.

use std::path::{Path, PathBuf};
use std::time::Instant;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::metrics::{BatchSummary, SessionMetrics};
use crate::runner::{RunError, SessionRunner};
use crate::scenario::Scenario;

/// File name the batch results are saved under.
pub const RESULTS_FILE: &str = "batch_results.json";

/// Configuration for a batch run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Scenario to run
    pub scenario: Scenario,
    /// Number of sessions to run
    pub session_count: u32,
    /// Maximum parallel sessions (0 = use rayon default)
    pub parallel_sessions: u32,
    /// Directory [`RESULTS_FILE`] is written to
    pub output_dir: PathBuf,
    /// Starting seed; session `i` uses `seed_start + i`
    pub seed_start: u64,
    /// Wave cap per session (scenario cap if `None`)
    pub max_waves: Option<u32>,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            scenario: Scenario::demo(),
            session_count: 100,
            parallel_sessions: 0,
            output_dir: PathBuf::from("results"),
            seed_start: 0,
            max_waves: Some(50),
        }
    }
}

impl BatchConfig {
    /// Create config for a specific scenario
    pub fn new(scenario: Scenario, session_count: u32) -> Self {
        Self {
            scenario,
            session_count,
            ..Default::default()
        }
    }

    /// Set output directory
    pub fn with_output(mut self, dir: PathBuf) -> Self {
        self.output_dir = dir;
        self
    }

    /// Set seed start
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed_start = seed;
        self
    }

    /// Set wave cap
    pub fn with_max_waves(mut self, max_waves: Option<u32>) -> Self {
        self.max_waves = max_waves;
        self
    }

    /// Where [`run_batch`] saves its results.
    pub fn results_path(&self) -> PathBuf {
        self.output_dir.join(RESULTS_FILE)
    }
}

/// Results from a batch run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchResults {
    /// Configuration used
    pub config: BatchConfig,
    /// Individual session metrics, in seed order
    pub sessions: Vec<SessionMetrics>,
    /// Aggregate summary
    pub summary: BatchSummary,
    /// Total runtime
    pub duration_seconds: f64,
    /// Errors encountered
    pub errors: Vec<BatchError>,
}

impl BatchResults {
    /// Save results to JSON file
    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(path, json)
    }

    /// Load results from JSON file
    pub fn load(path: &Path) -> std::io::Result<Self> {
        let json = std::fs::read_to_string(path)?;
        serde_json::from_str(&json).map_err(std::io::Error::other)
    }
}

/// Error during batch run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchError {
    /// Session index
    pub session_index: u32,
    /// Seed used
    pub seed: u64,
    /// Error message
    pub message: String,
}

/// Run a batch of sessions and save the results to
/// [`BatchConfig::results_path`].
pub fn run_batch(config: BatchConfig) -> Result<BatchResults, RunError> {
    let start = Instant::now();
    let runner = SessionRunner::new(config.scenario.clone())?;

    info!(
        "Starting batch run: {} sessions of '{}'",
        config.session_count, config.scenario.name
    );

    // Configure thread pool if specified
    if config.parallel_sessions > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(config.parallel_sessions as usize)
            .build_global()
            .ok(); // Ignore if already set
    }

    let results: Vec<Result<SessionMetrics, BatchError>> = (0..config.session_count)
        .into_par_iter()
        .map(|i| {
            let seed = config.seed_start.wrapping_add(u64::from(i));
            match runner.run_silent(seed, config.max_waves) {
                Ok(metrics) => {
                    debug!(seed, waves_cleared = metrics.waves_cleared, "Session complete");
                    Ok(metrics)
                }
                Err(e) => {
                    warn!("Session {} failed: {}", i, e);
                    Err(BatchError {
                        session_index: i,
                        seed,
                        message: e.to_string(),
                    })
                }
            }
        })
        .collect();

    let (sessions, errors): (Vec<_>, Vec<_>) = results.into_iter().partition(Result::is_ok);
    let sessions: Vec<SessionMetrics> = sessions.into_iter().filter_map(Result::ok).collect();
    let errors: Vec<BatchError> = errors.into_iter().filter_map(Result::err).collect();

    let summary = BatchSummary::from_sessions(&sessions);
    let duration_seconds = start.elapsed().as_secs_f64();

    info!(
        "Batch complete: {} sessions in {:.1}s, mean waves cleared {:.2}",
        sessions.len(),
        duration_seconds,
        summary.mean_waves_cleared
    );

    let results = BatchResults {
        config,
        sessions,
        summary,
        duration_seconds,
        errors,
    };
    let path = results.config.results_path();
    results.save(&path)?;
    info!("Results saved to {}", path.display());
    Ok(results)
}

/// Outcome of replaying one seed several times.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifyReport {
    /// Seed replayed.
    pub seed: u64,
    /// Final state hash of each run.
    pub hashes: Vec<u64>,
}

impl VerifyReport {
    /// Check if every run ended in the same state.
    #[must_use]
    pub fn is_deterministic(&self) -> bool {
        self.hashes.windows(2).all(|w| w[0] == w[1])
    }
}

/// Verify determinism by running the same seed multiple times
pub fn verify_determinism(
    scenario: &Scenario,
    seed: u64,
    runs: u32,
    max_waves: Option<u32>,
) -> Result<VerifyReport, RunError> {
    let runner = SessionRunner::new(scenario.clone())?;
    let hashes = (0..runs)
        .map(|_| {
            runner
                .run_silent(seed, max_waves)
                .map(|m| m.final_state_hash)
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(VerifyReport { seed, hashes })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_config_default() {
        let config = BatchConfig::default();
        assert_eq!(config.session_count, 100);
        assert_eq!(config.scenario.name, "Demo");
    }

    #[test]
    fn test_batch_config_builder() {
        let config = BatchConfig::new(Scenario::builder_demo(), 500)
            .with_output(PathBuf::from("/tmp/results"))
            .with_seed(12345)
            .with_max_waves(None);

        assert_eq!(config.scenario.name, "Builder Demo");
        assert_eq!(config.session_count, 500);
        assert_eq!(config.seed_start, 12345);
        assert_eq!(config.max_waves, None);
    }

    #[test]
    fn test_batch_runs_every_seed() {
        let dir = tempfile::tempdir().unwrap();
        let config = BatchConfig::new(Scenario::demo(), 8)
            .with_output(dir.path().to_path_buf())
            .with_seed(100)
            .with_max_waves(Some(5));
        let results = run_batch(config).unwrap();

        assert!(results.errors.is_empty());
        assert_eq!(results.sessions.len(), 8);
        let seeds: Vec<u64> = results.sessions.iter().map(|s| s.seed).collect();
        assert_eq!(seeds, (100..108).collect::<Vec<_>>());
        assert_eq!(results.summary.total_sessions, 8);
        assert!(results.summary.max_waves_cleared <= 5);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let dir = tempfile::tempdir().unwrap();
        let scenario = Scenario::demo();
        let config = BatchConfig::new(scenario.clone(), 4)
            .with_output(dir.path().to_path_buf())
            .with_max_waves(Some(6));
        let results = run_batch(config).unwrap();
        let runner = SessionRunner::new(scenario).unwrap();
        for m in &results.sessions {
            let again = runner.run_silent(m.seed, Some(6)).unwrap();
            assert_eq!(again.final_state_hash, m.final_state_hash);
        }
    }

    #[test]
    fn test_batch_saves_into_output_dir() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("nested");
        let config = BatchConfig::new(Scenario::demo(), 2)
            .with_output(output.clone())
            .with_max_waves(Some(2));
        let results = run_batch(config).unwrap();

        let path = output.join(RESULTS_FILE);
        assert_eq!(results.config.results_path(), path);
        let loaded = BatchResults::load(&path).unwrap();
        assert_eq!(loaded.sessions, results.sessions);
        assert_eq!(loaded.config.scenario, results.config.scenario);
    }

    #[test]
    fn test_unwritable_output_dir_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("taken");
        std::fs::write(&blocker, "not a directory").unwrap();
        let config = BatchConfig::new(Scenario::demo(), 1)
            .with_output(blocker)
            .with_max_waves(Some(1));

        assert!(matches!(run_batch(config), Err(RunError::Io(_))));
    }

    #[test]
    fn test_verify_determinism() {
        let report = verify_determinism(&Scenario::demo(), 12345, 3, Some(8)).unwrap();
        assert_eq!(report.hashes.len(), 3);
        assert!(report.is_deterministic());
    }
}
