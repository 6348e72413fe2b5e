//! Minimal circuit example: a switch driving a run of wire.
//!
//! Places a switch and four wires, flips the switch through the command
//! queue, and prints the power gradient after each tick.
//!
//! Run with: `cargo run -p gridvolt-core --example minimal_circuit`

use gridvolt_core::command::Command;
use gridvolt_core::component::{Switch, Wire};
use gridvolt_core::controller::SimulationController;
use gridvolt_core::geometry::{Direction, GridPosition};
use gridvolt_core::grid::Grid;
use gridvolt_core::time::secs;

fn main() {
    let mut grid = Grid::bounded(8, 1).expect("valid dimensions");

    // A switch at the west end, facing into the wire run.
    grid.place_component(
        Switch::new(Direction::East).into(),
        GridPosition::new(0, 0),
    )
    .expect("in bounds");
    for x in 1..5 {
        grid.place_component(Wire::new().into(), GridPosition::new(x, 0))
            .expect("in bounds");
    }

    // 10 ticks per second.
    let mut controller = SimulationController::new(grid, secs(10.0));

    // Flip the switch at the next tick boundary.
    controller.submit(Command::ToggleSwitch {
        position: GridPosition::new(0, 0),
    });

    for _ in 0..4 {
        controller.step();
        let levels: Vec<u8> = (0..5)
            .map(|x| {
                controller
                    .grid()
                    .component_at(GridPosition::new(x, 0))
                    .map(|c| c.power_level())
                    .unwrap_or(0)
            })
            .collect();
        println!("tick {}: {:?}", controller.current_tick(), levels);
    }
}
