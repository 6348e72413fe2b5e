//! Breadth-first signal propagation.
//!
//! One pass starts from a single seed position and walks every component
//! reachable through compatible edges. Each component reached is updated
//! through its signal-intake contract with the strongest power reported by
//! its enabled, compatible neighbors -- never a sum or average -- and wires
//! subtract one per hop (see [`Component::apply_signal`]).
//!
//! A component whose power actually changed has its cell re-queued in the
//! grid's dirty set, so the next tick relaxes the neighborhood further.
//! Steady circuits produce no changes and therefore no new seeds; signal
//! loss (a released button, a removed wire) drains over a handful of ticks
//! the same way signal gain spreads.
//!
//! Passes are independent: the work queue and visited set reset at the
//! start of every call, so a pass is idempotent given unchanged grid state.
//!
//! An edge `(pos, dir)` is traversable iff the component at `pos` exposes
//! `dir` and the neighbor exposes `opposite(dir)`. Each position is
//! expanded at most once per pass, which bounds the traversal.

use crate::component::Component;
use crate::geometry::{Direction, GridPosition};
use crate::grid::Grid;
use std::collections::{BTreeSet, VecDeque};

/// The strongest power offered to `pos` by its enabled, compatible
/// neighbors. This is the `maxIncomingPower` of the wire decay rule.
fn incoming_power(grid: &Grid, pos: GridPosition, component: &Component) -> u8 {
    let mut strongest = 0;
    for dir in Direction::CARDINALS {
        if !component.can_connect(dir) {
            continue;
        }
        let Some(neighbor) = grid.component_at(pos.offset(dir)) else {
            continue;
        };
        if !neighbor.can_connect(dir.opposite()) {
            continue;
        }
        strongest = strongest.max(neighbor.power_output(dir.opposite()));
    }
    strongest
}

/// Walks connected components from a seed, updating power levels.
///
/// Holds its traversal storage across calls so repeated passes reuse the
/// allocations.
#[derive(Debug, Default)]
pub struct SignalPropagator {
    /// Work queue of (position, direction-to-explore) pairs.
    queue: VecDeque<(GridPosition, Direction)>,
    /// Positions already expanded this pass.
    visited: BTreeSet<GridPosition>,
}

impl SignalPropagator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run one propagation pass from `seed`. Returns the number of
    /// components whose power level changed; each of those cells is
    /// re-queued in the grid's dirty set.
    ///
    /// A seed with no component is a no-op: seeds come from the dirty set,
    /// and removal legitimately queues now-empty neighbors.
    pub fn propagate(&mut self, grid: &mut Grid, seed: GridPosition) -> usize {
        self.queue.clear();
        self.visited.clear();

        let mut changed = 0;

        // The seed re-reads its own neighborhood before walking outward: a
        // cell whose feeder vanished drains here. Emitters ignore the
        // write. The seed has no incoming edge, so the direction argument
        // is immaterial.
        let strongest = {
            let Some(seed_component) = grid.component_at(seed) else {
                return 0;
            };
            incoming_power(grid, seed, seed_component)
        };
        if grid.apply_signal(seed, Direction::North, strongest) {
            changed += 1;
            grid.mark_cell_for_update(seed);
        }

        let Some(seed_component) = grid.component_at(seed) else {
            return changed;
        };
        for dir in Direction::CARDINALS {
            if seed_component.can_connect(dir) {
                self.queue.push_back((seed, dir));
            }
        }
        self.visited.insert(seed);
        while let Some((pos, dir)) = self.queue.pop_front() {
            let neighbor_pos = pos.offset(dir);

            let Some(current) = grid.component_at(pos) else {
                continue;
            };
            if !current.can_connect(dir) {
                continue;
            }
            let Some(neighbor) = grid.component_at(neighbor_pos) else {
                continue;
            };
            let back = dir.opposite();
            if !neighbor.can_connect(back) {
                continue;
            }

            let strongest = incoming_power(grid, neighbor_pos, neighbor);
            if grid.apply_signal(neighbor_pos, back, strongest) {
                changed += 1;
                // Changed cells seed the next tick's relaxation.
                grid.mark_cell_for_update(neighbor_pos);
            }

            if self.visited.insert(neighbor_pos) {
                // Explore onward, excluding the edge just traversed.
                for next in Direction::CARDINALS {
                    if next != back {
                        self.queue.push_back((neighbor_pos, next));
                    }
                }
            }
        }
        changed
    }

    /// Convenience: one pass per seed, in order. Returns the total number
    /// of power changes.
    pub fn propagate_all(
        &mut self,
        grid: &mut Grid,
        seeds: impl IntoIterator<Item = GridPosition>,
    ) -> usize {
        seeds
            .into_iter()
            .map(|seed| self.propagate(grid, seed))
            .sum()
    }
}

// ===========================================================================
// Tests
// ===========================================================================
