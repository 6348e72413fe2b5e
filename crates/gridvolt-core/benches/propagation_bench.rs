//! Criterion benchmarks for the Gridvolt simulation engine.
//!
//! Two benchmark groups:
//! - `long_line`: a single emitter driving a long wire run -- measures raw
//!   breadth-first traversal cost.
//! - `dense_field`: a grid filled with wire and scattered emitters,
//!   stepped through the scheduler -- measures whole-tick cost.

use criterion::{Criterion, criterion_group, criterion_main};
use gridvolt_core::controller::SimulationController;
use gridvolt_core::geometry::Direction;
use gridvolt_core::grid::Grid;
use gridvolt_core::propagate::SignalPropagator;
use gridvolt_core::test_utils::*;
use gridvolt_core::time::secs;

// ===========================================================================
// Circuit builders
// ===========================================================================

/// One switch driving a 256-wire run. Decay kills the signal after 15
/// hops; the traversal still has to visit the dead remainder once.
fn build_long_line() -> Grid {
    let mut grid = Grid::bounded(260, 1).unwrap();
    place(&mut grid, switch_on(Direction::East), 0, 0);
    place_wire_run(&mut grid, 1, 0, 256);
    grid
}

/// A 32x32 field of wire with an emitter every eighth cell in both axes.
fn build_dense_field() -> SimulationController {
    let mut grid = Grid::bounded(32, 32).unwrap();
    for y in 0..32 {
        for x in 0..32 {
            if x % 8 == 0 && y % 8 == 0 {
                place(&mut grid, switch_on(Direction::East), x, y);
            } else {
                place(&mut grid, wire(), x, y);
            }
        }
    }
    let mut controller = SimulationController::new(grid, secs(20.0));
    controller.start();
    controller
}

// ===========================================================================
// Benchmarks
// ===========================================================================

fn bench_long_line(c: &mut Criterion) {
    c.bench_function("long_line_propagate", |b| {
        let mut grid = build_long_line();
        let mut propagator = SignalPropagator::new();
        b.iter(|| propagator.propagate(&mut grid, pos(0, 0)));
    });
}

fn bench_dense_field(c: &mut Criterion) {
    c.bench_function("dense_field_step", |b| {
        let mut controller = build_dense_field();
        b.iter(|| controller.step());
    });
}

criterion_group!(benches, bench_long_line, bench_dense_field);
criterion_main!(benches);
