//! Shared test helpers for integration tests and benchmarks.
//!
//! Gated behind `#[cfg(any(test, feature = "test-utils"))]` so these helpers
//! are available in unit tests, integration tests, and benchmarks (via the
//! `test-utils` feature).

use crate::component::{Button, Component, Probe, Switch, Wire};
use crate::geometry::{Direction, GridPosition};
use crate::grid::Grid;
use crate::time::{Seconds, secs};

// ===========================================================================
// Geometry
// ===========================================================================

pub fn pos(x: i32, y: i32) -> GridPosition {
    GridPosition::new(x, y)
}

// ===========================================================================
// Component constructors
// ===========================================================================

/// A dead wire with all sides enabled.
pub fn wire() -> Component {
    Wire::new().into()
}

/// A wire with the given sides disabled.
pub fn wire_without(sides: &[Direction]) -> Component {
    let mut w = Wire::new();
    for &dir in sides {
        w.toggle_side(dir);
    }
    w.into()
}

/// A switch in the off state.
pub fn switch(facing: Direction) -> Component {
    Switch::new(facing).into()
}

/// A switch already turned on.
pub fn switch_on(facing: Direction) -> Component {
    let mut s = Switch::new(facing);
    s.set_state(true);
    s.into()
}

/// An idle button with the given activation duration in seconds.
pub fn button(facing: Direction, duration: f64) -> Component {
    Button::new(facing, secs(duration)).into()
}

/// A button mid-pulse with a 0.5s activation duration.
pub fn pressed_button(facing: Direction) -> Component {
    let mut b = Button::new(facing, secs(0.5));
    b.press();
    b.into()
}

/// A probe holding the given power level.
pub fn probe_with_power(power: u8) -> Component {
    let mut p = Probe::new();
    p.power = power;
    p.into()
}

// ===========================================================================
// Grid helpers
// ===========================================================================

/// Place a component, panicking on refusal. Test setup only.
pub fn place(grid: &mut Grid, component: Component, x: i32, y: i32) {
    let placed = grid
        .place_component(component, pos(x, y))
        .expect("placement in bounds");
    assert!(placed, "cell ({x}, {y}) already occupied");
}

/// Place a horizontal run of wires starting at `(x, y)`, extending east.
pub fn place_wire_run(grid: &mut Grid, x: i32, y: i32, count: usize) {
    for i in 0..count {
        place(grid, wire(), x + i as i32, y);
    }
}

/// The power level of the component at `(x, y)`. Panics when empty.
pub fn power_at(grid: &Grid, x: i32, y: i32) -> u8 {
    grid.component_at(pos(x, y))
        .unwrap_or_else(|| panic!("no component at ({x}, {y})"))
        .power_level()
}

/// One tick interval at the given rate, for driving `update` by hand.
pub fn interval(ticks_per_second: f64) -> Seconds {
    Seconds::ONE / secs(ticks_per_second)
}
