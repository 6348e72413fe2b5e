//! Event and snapshot example: the two ways a host observes the circuit.
//!
//! Registers listeners for placement and tick events, presses a button,
//! and polls a render snapshot as the pulse travels and fades.
//!
//! Run with: `cargo run -p gridvolt-core --example events_and_snapshots`

use gridvolt_core::command::Command;
use gridvolt_core::component::{Button, Wire};
use gridvolt_core::controller::SimulationController;
use gridvolt_core::event::{Event, EventKind};
use gridvolt_core::geometry::{Direction, GridPosition};
use gridvolt_core::grid::Grid;
use gridvolt_core::query::grid_snapshot;
use gridvolt_core::time::secs;

fn main() {
    let mut controller = SimulationController::new(Grid::bounded(8, 1).unwrap(), secs(4.0));

    // Listeners fire after each tick, in registration order.
    controller.grid_mut().events_mut().on(
        EventKind::ComponentPlaced,
        Box::new(|event| {
            if let Event::ComponentPlaced { position, kind } = event {
                println!("placed {kind:?} at ({}, {})", position.x, position.y);
            }
        }),
    );
    controller.grid_mut().events_mut().on(
        EventKind::TickCompleted,
        Box::new(|event| {
            if let Event::TickCompleted { tick } = event {
                println!("-- tick {tick} done --");
            }
        }),
    );

    // Build through commands: a half-second button and three wires.
    controller.submit(Command::Place {
        position: GridPosition::new(0, 0),
        component: Button::new(Direction::East, secs(0.5)).into(),
    });
    for x in 1..4 {
        controller.submit(Command::Place {
            position: GridPosition::new(x, 0),
            component: Wire::new().into(),
        });
    }
    controller.submit(Command::PressButton {
        position: GridPosition::new(0, 0),
    });

    // At 4 ticks/second the pulse lives for two ticks, then fades.
    for _ in 0..6 {
        controller.step();
        for cell in grid_snapshot(controller.grid()) {
            print!(
                "({},{})={:<2} ",
                cell.position.x, cell.position.y, cell.power
            );
        }
        println!();
    }
}
