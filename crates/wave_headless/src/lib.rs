//! Headless session runner for balance testing and replay verification.
//!
//! This crate plays wave sessions without any user interface. This enables:
//!
//! - **Demo runs**: Watch a scripted party fight through the waves as JSON
//! - **Balance testing**: Run thousands of seeds and compare survival
//! - **Replay verification**: Check that a seed always produces the same state
//!
//! # Protocol
//!
//! Communication uses JSON lines (one JSON object per line):
//!
//! - **stdout**: Progress events (wave started, round completed, ...)
//! - **stderr**: Logs (human-readable)
//!
//! See [`protocol`] module for the event format.
//!
//! # Example
//!
//! ```bash
//! # Run the demo party
//! cargo run -p wave_headless -- run
//!
//! # Run a scenario with a fixed seed
//! cargo run -p wave_headless -- run --scenario crates/wave_headless/scenarios/vanguard.ron --seed 7
//!
//! # Verify determinism
//! cargo run -p wave_headless -- verify --seed 12345 --runs 5
//! ```

pub mod batch;
pub mod metrics;
pub mod protocol;
pub mod runner;
pub mod scenario;
pub mod strategies;

pub use batch::{run_batch, verify_determinism, BatchConfig, BatchResults, VerifyReport};
pub use metrics::{BatchSummary, MetricsCollector, SessionMetrics};
pub use protocol::ProgressEvent;
pub use runner::{RunConfig, RunError, SessionRunner};
pub use scenario::{PartyMember, Scenario, ScenarioError};
pub use strategies::{Strategy, StrategyError};
