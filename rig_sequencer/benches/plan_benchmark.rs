//! Planner benchmark - measure one decision step across piston-group sizes.
//!
//! The step body must stay a fast, non-blocking poll so the tick cadence
//! never backs up; this tracks the pure decision cost as the piston group
//! grows.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};

use rig_common::config::Setpoints;
use rig_common::state::DrillPhase;
use rig_sequencer::sequencer::{Readings, pistons_at_position, plan};

fn bench_plan(c: &mut Criterion) {
    let setpoints = Setpoints::default();

    let mut group = c.benchmark_group("plan_wait_extended");
    for pistons in [1usize, 4, 16, 64] {
        let readings = Readings {
            piston_positions: vec![setpoints.extended_position; pistons],
            top_merge_docked: false,
            bottom_merge_docked: false,
        };
        group.bench_with_input(
            BenchmarkId::from_parameter(pistons),
            &readings,
            |b, readings| {
                b.iter(|| {
                    plan(
                        black_box(DrillPhase::WaitExtended),
                        black_box(readings),
                        &setpoints,
                    )
                })
            },
        );
    }
    group.finish();

    c.bench_function("pistons_at_position_64", |b| {
        let positions = vec![setpoints.extended_position; 64];
        b.iter(|| pistons_at_position(black_box(&positions), setpoints.extended_position))
    });
}

criterion_group!(benches, bench_plan);
criterion_main!(benches);
