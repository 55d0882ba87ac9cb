//! Headless wave session runner.
//!
//! This binary plays sessions without any interface, streaming JSON
//! progress events on stdout. Designed for demos, balance runs and
//! determinism checks.
//!
//! # Usage
//!
//! ```bash
//! # Demo party, default strategy
//! cargo run -p wave_headless -- run
//!
//! # Scenario file with a seed override, waves only
//! cargo run -p wave_headless -- run --scenario scenarios/vanguard.ron --seed 7 --quiet
//!
//! # Batch balance run
//! cargo run -p wave_headless -- batch --count 1000 --output results/
//!
//! # Verify determinism
//! cargo run -p wave_headless -- verify --seed 12345 --runs 5
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use wave_headless::{
    batch::{run_batch, verify_determinism, BatchConfig},
    runner::{RunConfig, SessionRunner},
    scenario::Scenario,
    strategies::Strategy,
};

#[derive(Parser)]
#[command(name = "wave_headless")]
#[command(about = "Headless wave combat runner for demos, balance runs and CI")]
#[command(version)]
struct Cli {
    /// Enable verbose logging to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a single session, streaming progress as JSON lines
    Run {
        /// Scenario file to load (demo party if omitted)
        #[arg(short, long)]
        scenario: Option<PathBuf>,

        /// Seed override
        #[arg(long)]
        seed: Option<u64>,

        /// Strategy override (built-in name or .ron file)
        #[arg(long)]
        strategy: Option<String>,

        /// Stop after this many waves
        #[arg(long)]
        max_waves: Option<u32>,

        /// Suppress per-round events
        #[arg(short, long)]
        quiet: bool,
    },

    /// Run many seeds in parallel for balance testing
    Batch {
        /// Scenario file to load (demo party if omitted)
        #[arg(short, long)]
        scenario: Option<PathBuf>,

        /// Number of sessions to run
        #[arg(short, long, default_value = "100")]
        count: u32,

        /// Maximum parallel sessions (0 = auto)
        #[arg(short, long, default_value = "0")]
        parallel: u32,

        /// Output directory for results
        #[arg(short, long, default_value = "results")]
        output: PathBuf,

        /// Starting seed
        #[arg(long, default_value = "0")]
        seed: u64,

        /// Wave cap per session
        #[arg(long, default_value = "50")]
        max_waves: u32,
    },

    /// Verify determinism by running the same seed multiple times
    Verify {
        /// Scenario file to load (demo party if omitted)
        #[arg(short, long)]
        scenario: Option<PathBuf>,

        /// Seed to verify
        #[arg(long, default_value = "12345")]
        seed: u64,

        /// Number of verification runs
        #[arg(short, long, default_value = "5")]
        runs: u32,

        /// Wave cap per run
        #[arg(long, default_value = "50")]
        max_waves: u32,
    },
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging to stderr (stdout is for protocol)
    let log_level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(true),
        )
        .with(tracing_subscriber::filter::LevelFilter::from_level(
            log_level,
        ))
        .init();

    match cli.command {
        Some(Commands::Run {
            scenario,
            seed,
            strategy,
            max_waves,
            quiet,
        }) => {
            cmd_run(scenario, seed, strategy, max_waves, quiet);
        }
        Some(Commands::Batch {
            scenario,
            count,
            parallel,
            output,
            seed,
            max_waves,
        }) => {
            cmd_batch(scenario, count, parallel, output, seed, max_waves);
        }
        Some(Commands::Verify {
            scenario,
            seed,
            runs,
            max_waves,
        }) => {
            cmd_verify(scenario, seed, runs, max_waves);
        }
        None => {
            // Default: the demo session
            cmd_run(None, None, None, None, false);
        }
    }
}

/// Load a scenario file, or the demo scenario if none was given.
fn load_scenario(path: Option<PathBuf>) -> Scenario {
    let Some(path) = path else {
        return Scenario::demo();
    };
    match Scenario::load(&path) {
        Ok(scenario) => scenario,
        Err(e) => {
            tracing::error!(error = %e, path = %path.display(), "Failed to load scenario");
            std::process::exit(1);
        }
    }
}

/// Play a single session
fn cmd_run(
    scenario: Option<PathBuf>,
    seed: Option<u64>,
    strategy: Option<String>,
    max_waves: Option<u32>,
    quiet: bool,
) {
    let scenario = load_scenario(scenario);

    let runner = match strategy {
        Some(name) => match Strategy::resolve(&name) {
            Ok(strategy) => Ok(SessionRunner::with_strategy(scenario, strategy)),
            Err(e) => Err(e.into()),
        },
        None => SessionRunner::new(scenario),
    };
    let runner = match runner {
        Ok(r) => r,
        Err(e) => {
            tracing::error!(error = %e, "Failed to prepare session");
            std::process::exit(1);
        }
    };

    let config = RunConfig {
        seed,
        max_waves,
        emit_rounds: !quiet,
    };

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    match runner.run(&config, &mut out) {
        Ok(metrics) => {
            eprintln!(
                "Waves cleared: {} (last wave {}, {} rounds, {} upgrades)",
                metrics.waves_cleared,
                metrics.last_wave,
                metrics.total_rounds,
                metrics.total_upgrades()
            );
        }
        Err(e) => {
            tracing::error!(error = %e, "Session failed");
            std::process::exit(1);
        }
    }
}

/// Run a batch of sessions for balance testing
fn cmd_batch(
    scenario: Option<PathBuf>,
    count: u32,
    parallel: u32,
    output: PathBuf,
    seed: u64,
    max_waves: u32,
) {
    let scenario = load_scenario(scenario);

    let config = BatchConfig {
        scenario,
        session_count: count,
        parallel_sessions: parallel,
        output_dir: output,
        seed_start: seed,
        max_waves: Some(max_waves),
    };

    let results = match run_batch(config) {
        Ok(r) => r,
        Err(e) => {
            tracing::error!(error = %e, "Batch failed");
            std::process::exit(1);
        }
    };

    // Print summary
    let summary = &results.summary;
    eprintln!("\n{}", "=".repeat(50));
    eprintln!("BATCH COMPLETE");
    eprintln!("{}", "=".repeat(50));
    eprintln!("Sessions played: {}", results.sessions.len());
    if !results.errors.is_empty() {
        eprintln!("Sessions FAILED: {}", results.errors.len());
    }
    eprintln!("Duration: {:.1}s", results.duration_seconds);
    eprintln!(
        "Waves cleared: mean {:.2}, min {}, max {}",
        summary.mean_waves_cleared, summary.min_waves_cleared, summary.max_waves_cleared
    );
    eprintln!("\nSurvival:");
    for (waves, sessions) in &summary.survival_histogram {
        eprintln!("  {waves:>3} waves: {sessions}");
    }

    for error in results.errors.iter().take(10) {
        eprintln!(
            "  Session {} (seed {}): {}",
            error.session_index, error.seed, error.message
        );
    }

    eprintln!("\nResults saved to: {}", results.config.results_path().display());
}

/// Verify determinism by replaying one seed
fn cmd_verify(scenario: Option<PathBuf>, seed: u64, runs: u32, max_waves: u32) {
    let scenario = load_scenario(scenario);
    tracing::info!(
        "Verifying determinism: {} with seed {} ({} runs)",
        scenario.name,
        seed,
        runs
    );

    match verify_determinism(&scenario, seed, runs, Some(max_waves)) {
        Ok(report) if report.is_deterministic() => {
            eprintln!("PASS: All {runs} runs produced identical results");
            if let Some(hash) = report.hashes.first() {
                eprintln!("  State hash: {hash:016x}");
            }
        }
        Ok(report) => {
            eprintln!("FAIL: Non-determinism detected!");
            eprintln!("  Hashes: {:?}", report.hashes);
            std::process::exit(1);
        }
        Err(e) => {
            tracing::error!(error = %e, "Verification failed");
            std::process::exit(1);
        }
    }
}
