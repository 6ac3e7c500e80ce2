//! Benchmarks for the voxpaint search engine.

use std::time::Duration;

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};

use voxpaint::{
    schema::SearchConfig,
    search::{Command, SearchEngine, VoxelGrid},
};

/// Deterministic pseudo-random target: scattered boxes of two block types.
fn scattered_target(size: usize) -> VoxelGrid {
    let mut target = VoxelGrid::new(size);
    let edge = size as i32;
    let mut state = 0x9e3779b97f4a7c15u64;
    for i in 0..(size / 2) {
        state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        let x = ((state >> 33) % size as u64) as i32;
        let y = ((state >> 17) % size as u64) as i32;
        let z = (state % size as u64) as i32;
        let block = 1 + (i as u8 % 2);
        let ext = 1 + ((state >> 40) % 4) as i32;
        target.fill_box(
            [x, y, z],
            [
                (x + ext).min(edge - 1),
                (y + ext).min(edge - 1),
                (z + ext).min(edge - 1),
            ],
            block,
        );
    }
    target
}

fn bench_fitness_scoring(c: &mut Criterion) {
    let mut group = c.benchmark_group("fitness_scoring");

    let target = scattered_target(64);
    let current = VoxelGrid::new(64);

    for extent in [1i32, 4, 16, 48] {
        let cmd = Command::new(0, 1, [8, 8, 8], [8 + extent, 8 + extent, 8 + extent]);
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("volume_{}", cmd.volume())),
            &extent,
            |b, _| {
                b.iter(|| black_box(&cmd).score(black_box(&current), black_box(&target)));
            },
        );
    }

    group.finish();
}

fn bench_generation_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("generation_step");

    for size in [16usize, 32, 64] {
        let target = scattered_target(size);
        // Stops pushed out of reach so every iteration measures a live generation.
        let config = SearchConfig {
            random_seed: Some(42),
            stop_time_budget: 1e9,
            likeness_check_interval: u32::MAX,
            max_stalled_episodes: u32::MAX,
            ..Default::default()
        };
        let mut engine = SearchEngine::from_target(config, target).expect("valid engine");

        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{size}^3")),
            &size,
            |b, _| {
                // A zero-length slice still runs exactly one whole generation.
                b.iter(|| engine.step_for(black_box(Duration::ZERO)));
            },
        );
    }

    group.finish();
}

fn bench_likeness(c: &mut Criterion) {
    let mut group = c.benchmark_group("likeness");

    for size in [32usize, 64, 128] {
        let target = scattered_target(size);
        let current = VoxelGrid::new(size);

        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{size}^3")),
            &size,
            |b, _| {
                b.iter(|| black_box(&current).likeness(black_box(&target)));
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_fitness_scoring,
    bench_generation_step,
    bench_likeness
);
criterion_main!(benches);
