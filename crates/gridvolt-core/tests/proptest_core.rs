//! Property-based tests for the Gridvolt core.
//!
//! Uses proptest to generate random circuits and mutation sequences, then
//! verify the structural invariants hold: power stays in range, decay is
//! exactly one per hop, toggles are involutions, and propagation is
//! idempotent.

use gridvolt_core::component::{Component, POWER_MAX};
use gridvolt_core::controller::SimulationController;
use gridvolt_core::geometry::{Direction, GridPosition, SideSet};
use gridvolt_core::grid::Grid;
use gridvolt_core::propagate::SignalPropagator;
use gridvolt_core::test_utils::*;
use gridvolt_core::time::secs;
use proptest::prelude::*;

// ===========================================================================
// Generators
// ===========================================================================

fn arb_direction() -> impl Strategy<Value = Direction> {
    prop_oneof![
        Just(Direction::North),
        Just(Direction::East),
        Just(Direction::South),
        Just(Direction::West),
    ]
}

fn arb_component() -> impl Strategy<Value = Component> {
    prop_oneof![
        Just(wire()),
        arb_direction().prop_map(switch),
        arb_direction().prop_map(switch_on),
        arb_direction().prop_map(|d| button(d, 0.5)),
        arb_direction().prop_map(pressed_button),
        (0..=POWER_MAX).prop_map(probe_with_power),
    ]
}

/// A random bounded grid sprinkled with random components.
fn arb_grid(side: i32) -> impl Strategy<Value = Grid> {
    let cells = proptest::collection::vec(
        ((0..side, 0..side), arb_component()),
        0..(side * side) as usize,
    );
    cells.prop_map(move |entries| {
        let mut grid = Grid::bounded(side as u32, side as u32).unwrap();
        for ((x, y), component) in entries {
            // Collisions simply refuse; that is part of the contract.
            let _ = grid.place_component(component, GridPosition::new(x, y));
        }
        grid
    })
}

/// Run propagation rounds until quiescence.
fn settle(grid: &mut Grid) {
    let mut propagator = SignalPropagator::new();
    for _ in 0..256 {
        let seeds: Vec<GridPosition> = grid.cells_to_update().iter().copied().collect();
        grid.clear_update_queue();
        if seeds.is_empty() {
            return;
        }
        propagator.propagate_all(grid, seeds);
    }
    panic!("random circuit did not settle");
}

// ===========================================================================
// Properties
// ===========================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Invariant: 0 <= power <= 15 for every component, always.
    #[test]
    fn power_stays_in_range(mut grid in arb_grid(6)) {
        settle(&mut grid);
        for (position, component) in grid.components() {
            let power = component.power_level();
            prop_assert!(power <= POWER_MAX, "power {power} at {position:?}");
        }
    }

    /// Decay law: a settled wire fed by its strongest compatible neighbor
    /// at power p carries exactly max(p - 1, 0).
    #[test]
    fn settled_wires_obey_the_decay_law(mut grid in arb_grid(6)) {
        settle(&mut grid);
        let wires: Vec<GridPosition> = grid
            .components()
            .filter(|(_, c)| matches!(c, Component::Wire(_)))
            .map(|(p, _)| p)
            .collect();
        for position in wires {
            let component = grid.component_at(position).unwrap();
            let mut strongest = 0u8;
            for dir in Direction::CARDINALS {
                if !component.can_connect(dir) {
                    continue;
                }
                if let Some(neighbor) = grid.component_at(position.offset(dir))
                    && neighbor.can_connect(dir.opposite())
                {
                    strongest = strongest.max(neighbor.power_output(dir.opposite()));
                }
            }
            prop_assert_eq!(
                component.power_level(),
                strongest.saturating_sub(1),
                "wire at {:?} with strongest input {}",
                position,
                strongest
            );
        }
    }

    /// Idempotence: once settled, another pass from any seed changes
    /// nothing.
    #[test]
    fn settled_propagation_is_idempotent(mut grid in arb_grid(6)) {
        settle(&mut grid);
        let hash = grid.state_hash();

        let seeds = grid.component_positions();
        let mut propagator = SignalPropagator::new();
        for seed in seeds {
            propagator.propagate(&mut grid, seed);
        }
        prop_assert_eq!(grid.state_hash(), hash);
    }

    /// Toggle involution: flipping a wire side twice restores the set.
    #[test]
    fn side_toggle_is_an_involution(dir in arb_direction(), initial in any::<[bool; 4]>()) {
        let mut sides = SideSet::none();
        for (i, d) in Direction::CARDINALS.into_iter().enumerate() {
            sides.set(d, initial[i]);
        }
        let before = sides;
        sides.toggle(dir);
        sides.toggle(dir);
        prop_assert_eq!(sides, before);
    }

    /// Switch toggle involution at the grid level.
    #[test]
    fn switch_double_toggle_restores_state(facing in arb_direction(), on in any::<bool>()) {
        let mut grid = Grid::bounded(3, 3).unwrap();
        let start = if on { switch_on(facing) } else { switch(facing) };
        grid.place_component(start, GridPosition::new(1, 1)).unwrap();
        let before = grid.state_hash();

        grid.toggle_switch(GridPosition::new(1, 1));
        grid.toggle_switch(GridPosition::new(1, 1));
        prop_assert_eq!(grid.state_hash(), before);
    }

    /// Determinism: the same circuit driven twice produces identical
    /// hashes tick by tick.
    #[test]
    fn replayed_circuits_hash_identically(grid_seed in arb_grid(5), steps in 1usize..8) {
        let data = gridvolt_core::serialize::grid_to_data(&grid_seed);
        let registry = gridvolt_core::registry::ComponentRegistry::with_builtins();

        let rebuild = || {
            gridvolt_core::serialize::grid_from_data(&data, &registry).unwrap()
        };
        let mut a = SimulationController::new(rebuild(), secs(10.0));
        let mut b = SimulationController::new(rebuild(), secs(10.0));

        for _ in 0..steps {
            a.step();
            b.step();
            prop_assert_eq!(a.state_hash(), b.state_hash());
        }
    }

    /// Bounds rejection: every coordinate outside a bounded grid is
    /// rejected for placement and removal.
    #[test]
    fn out_of_bounds_coordinates_always_rejected(
        w in 1u32..10,
        h in 1u32..10,
        x in -20i32..20,
        y in -20i32..20,
    ) {
        let mut grid = Grid::bounded(w, h).unwrap();
        let inside = x >= 0 && y >= 0 && (x as u32) < w && (y as u32) < h;
        let position = GridPosition::new(x, y);

        prop_assert_eq!(grid.is_within_bounds(position), inside);
        if !inside {
            prop_assert!(grid.place_component(wire(), position).is_err());
            prop_assert!(grid.remove_component(position).is_err());
        }
    }
}
