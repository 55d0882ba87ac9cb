//! Wave resolution benchmarks for wave_core.
//!
//! Run with: `cargo bench -p wave_core`

// Benchmark binaries don't need docs on macro-generated functions
#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use wave_core::combatant::{CombatStats, Player};
use wave_core::economy::GameVariant;
use wave_core::events::NullObserver;
use wave_core::orchestrator::run_wave;
use wave_core::roles::Role;
use wave_core::session::Session;
use wave_core::wave::generate_wave;

fn tank_party(size: usize) -> Vec<Player> {
    (0..size)
        .map(|i| Player::with_stats(Role::Knight, format!("T{i}"), CombatStats::new(400, 30, 15, 5)))
        .collect()
}

/// Generating rosters of increasing index.
pub fn generation_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("generate_wave");
    for index in [1u32, 3, 12] {
        group.bench_with_input(BenchmarkId::from_parameter(index), &index, |b, &index| {
            let mut rng = ChaCha8Rng::seed_from_u64(1);
            b.iter(|| generate_wave(black_box(index), &mut rng));
        });
    }
    group.finish();
}

/// Resolving a single wave to completion.
pub fn wave_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("run_wave");
    for index in [1u32, 6, 12] {
        group.bench_with_input(BenchmarkId::from_parameter(index), &index, |b, &index| {
            let mut rng = ChaCha8Rng::seed_from_u64(7);
            b.iter(|| {
                let mut party = tank_party(4);
                run_wave(&mut party, black_box(index), &mut rng)
            });
        });
    }
    group.finish();
}

/// A full session played until the party falls or 20 waves pass.
pub fn session_benchmark(c: &mut Criterion) {
    c.bench_function("session_20_waves", |b| {
        b.iter(|| {
            let Ok(mut session) = Session::new(tank_party(4), black_box(42), GameVariant::Classic)
            else {
                return 0;
            };
            while !session.is_over() && session.next_wave() <= 20 {
                if session.run_next_wave(&mut NullObserver).is_err() {
                    break;
                }
            }
            session.state_hash()
        });
    });
}

criterion_group!(benches, generation_benchmark, wave_benchmark, session_benchmark);
criterion_main!(benches);
