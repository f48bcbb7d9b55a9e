//! Benchmark: homography solve and the CPU adjustment pipeline.
//!
//! Run with: `cargo bench -p gxr-core --bench solver_bench`
//!
//! The solver runs on every corner-drag event; the pipeline runs over every
//! pixel of an exported image.

use std::hint::black_box;

use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use gxr_core::adjustment::{AdjustmentKey, AdjustmentState};
use gxr_core::geometry::{Point, UNIT_SQUARE};
use gxr_core::homography::HomographySolver;
use gxr_core::pipeline::AdjustmentPipeline;

fn bench_solve(c: &mut Criterion) {
    let dst = [
        Point::new(10.0, 20.0),
        Point::new(310.0, 5.0),
        Point::new(280.0, 260.0),
        Point::new(30.0, 230.0),
    ];
    c.bench_function("homography/solve_unit_square", |b| {
        b.iter(|| HomographySolver::solve(black_box(&UNIT_SQUARE), black_box(&dst)))
    });
}

fn bench_pipeline(c: &mut Criterion) {
    let adjustments = AdjustmentState::NEUTRAL
        .set(AdjustmentKey::Saturation, 0.6)
        .and_then(|a| a.set(AdjustmentKey::Contrast, 1.3))
        .and_then(|a| a.set(AdjustmentKey::Brightness, 0.05))
        .unwrap_or_default();
    let pipeline = AdjustmentPipeline::new(&adjustments);
    let mut pixels = vec![128u8; 512 * 512 * 4];

    let mut group = c.benchmark_group("pipeline");
    group.throughput(Throughput::Bytes(pixels.len() as u64));
    group.bench_function("apply_rgba8_512x512", |b| {
        b.iter(|| pipeline.apply_rgba8(black_box(&mut pixels)))
    });
    group.finish();
}

criterion_group!(benches, bench_solve, bench_pipeline);
criterion_main!(benches);
