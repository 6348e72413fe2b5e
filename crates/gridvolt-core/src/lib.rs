//! Gridvolt Core -- a deterministic simulation engine for grid-based
//! digital-logic circuits.
//!
//! Power sources, wires with per-hop signal decay, and switchable inputs
//! interact on a 2D lattice, advanced in fixed ticks. The crate is a
//! reusable simulation core: rendering, input handling, and persistence
//! belong to the host.
//!
//! # Four-Phase Tick Pipeline
//!
//! Each tick of [`controller::SimulationController`] runs:
//!
//! 1. **Commands** -- apply externally-queued mutations (placement,
//!    toggles, presses, resizes).
//! 2. **Component update** -- advance per-component timers; an expiring
//!    button queues its cell for re-propagation.
//! 3. **Propagation** -- snapshot and clear the dirty set, then run one
//!    breadth-first pass per seed; changed cells seed the next tick.
//! 4. **Delivery** -- emit `TickCompleted` and flush buffered events to
//!    listeners.
//!
//! # Driving the simulation
//!
//! ```rust,ignore
//! let mut controller = SimulationController::new(Grid::bounded(32, 32)?, secs(20.0));
//! controller.submit(Command::Place { position, component: Wire::new().into() });
//! controller.start();
//! loop {
//!     controller.update(frame_dt); // accumulates; runs whole ticks
//! }
//! ```
//!
//! # Key Types
//!
//! - [`controller::SimulationController`] -- fixed-tick scheduler and
//!   pipeline orchestrator.
//! - [`grid::Grid`] -- coordinate-keyed cell storage, optional bounds,
//!   dirty-set bookkeeping.
//! - [`component::Component`] -- closed enum of circuit elements (wire,
//!   switch, button, probe) behind one capability surface.
//! - [`propagate::SignalPropagator`] -- breadth-first signal propagation
//!   with max-then-decay combining.
//! - [`command::CommandQueue`] -- tick-boundary mutation queue keeping the
//!   loop single-threaded and deterministic.
//! - [`event::EventBus`] -- per-kind ring buffers with batch post-tick
//!   delivery.
//! - [`registry::ComponentRegistry`] -- explicit factory from type names
//!   to constructors.
//! - [`time::Seconds`] -- Q32.32 fixed-point time for bit-exact tick math.

pub mod cell;
pub mod command;
pub mod component;
pub mod controller;
#[cfg(feature = "data-loader")]
pub mod data_loader;
pub mod error;
pub mod event;
pub mod geometry;
pub mod grid;
pub mod hash;
pub mod profiling;
pub mod propagate;
pub mod query;
pub mod registry;
pub mod serialize;
pub mod time;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
