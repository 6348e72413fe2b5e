//! The fixed-tick scheduler driving the simulation pipeline.
//!
//! The controller owns the grid, the propagator, and the command queue, and
//! advances them through a four-phase tick:
//!
//! 1. **Commands** -- drain externally-submitted mutations and apply them.
//! 2. **Component update** -- advance every placed component's timers;
//!    components are independent here and never read sibling state.
//! 3. **Propagation** -- snapshot and clear the dirty set, then run one
//!    breadth-first pass per seed, in coordinate order.
//! 4. **Delivery** -- emit `TickCompleted` and deliver all buffered events.
//!
//! Time accumulates in Q32.32 seconds: `update(dt)` runs as many fixed
//! ticks as fit and carries the remainder forward, so a large `dt` catches
//! up with several whole ticks rather than one distorted partial tick.

use crate::command::{Command, CommandOutcome, CommandQueue};
use crate::event::Event;
use crate::grid::Grid;
use crate::propagate::SignalPropagator;
use crate::time::{Seconds, Ticks};

/// Lower clamp for the tick rate, in ticks per second. Prevents the tick
/// interval `1 / tick_rate` from blowing up.
pub const MIN_TICK_RATE: Seconds = Seconds::from_bits(1 << 26); // 1/64

// ---------------------------------------------------------------------------
// AdvanceResult
// ---------------------------------------------------------------------------

/// Result of a [`SimulationController::update`] or `step` call.
#[derive(Debug, Default)]
pub struct AdvanceResult {
    /// Number of whole ticks actually executed.
    pub ticks_run: u64,
    /// Per-command outcomes from every tick's command phase, in
    /// submission order.
    pub command_results: Vec<(Command, CommandOutcome)>,
}

// ---------------------------------------------------------------------------
// SimulationController
// ---------------------------------------------------------------------------

/// Fixed-tick scheduler over a [`Grid`].
#[derive(Debug)]
pub struct SimulationController {
    grid: Grid,
    propagator: SignalPropagator,
    commands: CommandQueue,
    running: bool,
    /// Ticks per second, clamped to [`MIN_TICK_RATE`].
    tick_rate: Seconds,
    /// Accumulated time not yet consumed by whole ticks.
    accumulator: Seconds,
    /// Current tick counter.
    tick: Ticks,
    #[cfg(feature = "profiling")]
    last_profile: Option<crate::profiling::TickProfile>,
}

impl SimulationController {
    /// Create a controller over the given grid. The controller starts
    /// paused; call [`start`](Self::start) or drive it with
    /// [`step`](Self::step).
    pub fn new(grid: Grid, tick_rate: Seconds) -> Self {
        Self {
            grid,
            propagator: SignalPropagator::new(),
            commands: CommandQueue::new(),
            running: false,
            tick_rate: tick_rate.max(MIN_TICK_RATE),
            accumulator: Seconds::ZERO,
            tick: 0,
            #[cfg(feature = "profiling")]
            last_profile: None,
        }
    }

    /// Use a command queue with history tracking (replay/debugging).
    pub fn with_command_history(mut self, max_history: usize) -> Self {
        self.commands = CommandQueue::with_max_history(max_history);
        self
    }

    // -----------------------------------------------------------------------
    // Access
    // -----------------------------------------------------------------------

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Direct mutable grid access. Intended for setup and for hosts that
    /// drive the tick loop themselves; once ticking, submit mutations as
    /// commands instead.
    pub fn grid_mut(&mut self) -> &mut Grid {
        &mut self.grid
    }

    pub fn command_queue(&self) -> &CommandQueue {
        &self.commands
    }

    /// Queue a mutation for the start of the next tick.
    pub fn submit(&mut self, command: Command) {
        self.commands.push(command);
    }

    /// Queue several mutations at once.
    pub fn submit_batch(&mut self, commands: impl IntoIterator<Item = Command>) {
        self.commands.push_batch(commands);
    }

    // -----------------------------------------------------------------------
    // Run state
    // -----------------------------------------------------------------------

    pub fn start(&mut self) {
        self.running = true;
    }

    pub fn pause(&mut self) {
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Ticks per second.
    pub fn tick_rate(&self) -> Seconds {
        self.tick_rate
    }

    /// Set the tick rate, clamped to [`MIN_TICK_RATE`].
    pub fn set_tick_rate(&mut self, rate: Seconds) {
        self.tick_rate = rate.max(MIN_TICK_RATE);
    }

    /// Duration of one tick, `1 / tick_rate`.
    pub fn tick_interval(&self) -> Seconds {
        Seconds::ONE / self.tick_rate
    }

    /// The current tick counter.
    pub fn current_tick(&self) -> Ticks {
        self.tick
    }

    /// Deterministic hash of the grid's durable state.
    pub fn state_hash(&self) -> u64 {
        self.grid.state_hash()
    }

    /// Timing breakdown of the most recent tick.
    #[cfg(feature = "profiling")]
    pub fn last_profile(&self) -> Option<&crate::profiling::TickProfile> {
        self.last_profile.as_ref()
    }

    // -----------------------------------------------------------------------
    // Advancing
    // -----------------------------------------------------------------------

    /// Accumulate elapsed time and run as many whole ticks as fit.
    /// A paused controller accumulates nothing and runs nothing.
    pub fn update(&mut self, dt: Seconds) -> AdvanceResult {
        let mut result = AdvanceResult::default();
        if !self.running {
            return result;
        }
        self.accumulator += dt;
        let interval = self.tick_interval();
        while self.accumulator >= interval {
            self.accumulator -= interval;
            self.tick_internal(&mut result);
        }
        result
    }

    /// Force exactly one tick, regardless of the run state. The
    /// accumulator is untouched.
    pub fn step(&mut self) -> AdvanceResult {
        let mut result = AdvanceResult::default();
        self.tick_internal(&mut result);
        result
    }

    // -----------------------------------------------------------------------
    // Internal: single tick
    // -----------------------------------------------------------------------

    fn tick_internal(&mut self, result: &mut AdvanceResult) {
        #[cfg(feature = "profiling")]
        let tick_start = std::time::Instant::now();

        // Phase 1: Commands -- apply queued external mutations.
        #[cfg(feature = "profiling")]
        let phase_start = std::time::Instant::now();
        for command in self.commands.drain(self.tick) {
            let outcome = apply_command(&mut self.grid, &command);
            result.command_results.push((command, outcome));
        }
        #[cfg(feature = "profiling")]
        let commands_dur = phase_start.elapsed();

        // Phase 2: Component update -- advance timers on every placed
        // component; expiries re-queue their cell for propagation.
        #[cfg(feature = "profiling")]
        let phase_start = std::time::Instant::now();
        let interval = self.tick_interval();
        let mut expired = Vec::new();
        for pos in self.grid.component_positions() {
            if let Some(cell) = self.grid.cell_at_mut(pos)
                && cell.update(interval)
            {
                expired.push(pos);
            }
        }
        for pos in expired {
            self.grid.mark_cell_for_update(pos);
        }
        #[cfg(feature = "profiling")]
        let update_dur = phase_start.elapsed();

        // Phase 3: Propagation -- one pass per dirty seed, in coordinate
        // order.
        #[cfg(feature = "profiling")]
        let phase_start = std::time::Instant::now();
        let seeds = self.grid.take_dirty();
        self.propagator.propagate_all(&mut self.grid, seeds);
        #[cfg(feature = "profiling")]
        let propagation_dur = phase_start.elapsed();

        // Phase 4: Delivery -- close the tick and flush notifications.
        #[cfg(feature = "profiling")]
        let phase_start = std::time::Instant::now();
        self.tick += 1;
        self.grid
            .events_mut()
            .emit(Event::TickCompleted { tick: self.tick });
        self.grid.events_mut().deliver();
        #[cfg(feature = "profiling")]
        let delivery_dur = phase_start.elapsed();

        result.ticks_run += 1;

        #[cfg(feature = "profiling")]
        {
            self.last_profile = Some(crate::profiling::TickProfile {
                commands: commands_dur,
                component_update: update_dur,
                propagation: propagation_dur,
                delivery: delivery_dur,
                total: tick_start.elapsed(),
                tick: self.tick,
            });
        }
    }
}

// ---------------------------------------------------------------------------
// Command application
// ---------------------------------------------------------------------------

fn apply_command(grid: &mut Grid, command: &Command) -> CommandOutcome {
    match command {
        Command::Place {
            position,
            component,
        } => match grid.place_component(component.clone(), *position) {
            Ok(true) => CommandOutcome::Applied,
            Ok(false) => CommandOutcome::Refused,
            Err(e) => CommandOutcome::Failed(e),
        },
        Command::Remove { position } => match grid.remove_component(*position) {
            Ok(Some(_)) => CommandOutcome::Applied,
            Ok(None) => CommandOutcome::Refused,
            Err(e) => CommandOutcome::Failed(e),
        },
        Command::ToggleSwitch { position } => refusable(grid.toggle_switch(*position)),
        Command::SetSwitch { position, on } => refusable(grid.set_switch(*position, *on)),
        Command::PressButton { position } => refusable(grid.press_button(*position)),
        Command::ToggleWireSide { position, side } => {
            refusable(grid.toggle_wire_side(*position, *side))
        }
        Command::ResetWireSides { position } => refusable(grid.reset_wire_sides(*position)),
        Command::Resize { width, height } => match grid.resize(*width, *height) {
            Ok(()) => CommandOutcome::Applied,
            Err(e) => CommandOutcome::Failed(e),
        },
        Command::MakeUnbounded => {
            grid.make_unbounded();
            CommandOutcome::Applied
        }
        Command::Clear => {
            grid.clear();
            CommandOutcome::Applied
        }
    }
}

fn refusable(applied: bool) -> CommandOutcome {
    if applied {
        CommandOutcome::Applied
    } else {
        CommandOutcome::Refused
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::{Button, Switch, Wire, POWER_MAX};
    use crate::event::EventKind;
    use crate::geometry::{Direction, GridPosition};
    use crate::time::secs;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn pos(x: i32, y: i32) -> GridPosition {
        GridPosition::new(x, y)
    }

    fn controller(ticks_per_second: f64) -> SimulationController {
        SimulationController::new(Grid::bounded(8, 8).unwrap(), secs(ticks_per_second))
    }

    fn power_at(c: &SimulationController, x: i32, y: i32) -> u8 {
        c.grid().component_at(pos(x, y)).unwrap().power_level()
    }

    // -----------------------------------------------------------------------
    // Accumulator behavior
    // -----------------------------------------------------------------------

    #[test]
    fn paused_controller_runs_nothing() {
        let mut c = controller(10.0);
        let result = c.update(secs(5.0));
        assert_eq!(result.ticks_run, 0);
        assert_eq!(c.current_tick(), 0);
    }

    #[test]
    fn accumulator_runs_whole_ticks_and_keeps_remainder() {
        let mut c = controller(10.0); // interval 0.1
        c.start();

        let result = c.update(secs(0.25));
        assert_eq!(result.ticks_run, 2);

        // 0.05 remains; another 0.05 crosses the next boundary.
        let result = c.update(secs(0.05));
        assert_eq!(result.ticks_run, 1);
        assert_eq!(c.current_tick(), 3);
    }

    #[test]
    fn large_dt_catches_up_with_many_ticks() {
        let mut c = controller(60.0);
        c.start();
        let result = c.update(secs(1.0));
        assert_eq!(result.ticks_run, 60);
    }

    #[test]
    fn sub_interval_updates_accumulate() {
        let mut c = controller(10.0);
        c.start();
        assert_eq!(c.update(secs(0.04)).ticks_run, 0);
        assert_eq!(c.update(secs(0.04)).ticks_run, 0);
        assert_eq!(c.update(secs(0.04)).ticks_run, 1);
    }

    #[test]
    fn step_forces_one_tick_while_paused() {
        let mut c = controller(10.0);
        assert!(!c.is_running());
        let result = c.step();
        assert_eq!(result.ticks_run, 1);
        assert_eq!(c.current_tick(), 1);
    }

    #[test]
    fn start_pause_toggles_running() {
        let mut c = controller(10.0);
        c.start();
        assert!(c.is_running());
        c.pause();
        assert!(!c.is_running());
        assert_eq!(c.update(secs(1.0)).ticks_run, 0);
    }

    #[test]
    fn tick_rate_clamped_to_minimum() {
        let mut c = controller(10.0);
        c.set_tick_rate(Seconds::ZERO);
        assert_eq!(c.tick_rate(), MIN_TICK_RATE);

        let c = SimulationController::new(Grid::unbounded(), secs(0.0001));
        assert_eq!(c.tick_rate(), MIN_TICK_RATE);
    }

    #[test]
    fn tick_interval_is_reciprocal_of_rate() {
        // Fixed-point division truncates, so allow one ulp.
        let c = controller(20.0);
        let difference = c.tick_interval() - secs(0.05);
        assert!(difference.abs() <= Seconds::DELTA, "got {difference}");
    }

    // -----------------------------------------------------------------------
    // Tick pipeline
    // -----------------------------------------------------------------------

    #[test]
    fn commands_apply_before_propagation_in_the_same_tick() {
        let mut c = controller(10.0);
        let mut button = Button::new(Direction::East, secs(10.0));
        button.press();
        c.submit_batch(vec![
            Command::Place {
                position: pos(0, 0),
                component: button.into(),
            },
            Command::Place {
                position: pos(1, 0),
                component: Wire::new().into(),
            },
        ]);

        let result = c.step();
        assert_eq!(result.command_results.len(), 2);
        assert!(
            result
                .command_results
                .iter()
                .all(|(_, outcome)| *outcome == CommandOutcome::Applied)
        );
        // Placement marked the cells dirty; the same tick's propagation
        // phase already powered the wire.
        assert_eq!(power_at(&c, 1, 0), POWER_MAX - 1);
    }

    #[test]
    fn button_expiry_releases_and_drains_in_later_ticks() {
        // interval 0.25s, duration 0.5s: powered for ticks 1-2, released
        // at tick 2's update phase... pressed at tick 1, remaining hits
        // zero during tick 2.
        let mut c = controller(4.0);
        c.grid_mut()
            .place_component(Button::new(Direction::East, secs(0.5)).into(), pos(0, 0))
            .unwrap();
        c.grid_mut()
            .place_component(Wire::new().into(), pos(1, 0))
            .unwrap();
        c.submit(Command::PressButton { position: pos(0, 0) });

        c.step();
        assert_eq!(power_at(&c, 1, 0), POWER_MAX - 1);

        c.step();
        // remaining reached zero: released, re-marked, re-propagated.
        assert_eq!(power_at(&c, 0, 0), 0);
        assert_eq!(power_at(&c, 1, 0), 0);
    }

    #[test]
    fn switch_toggle_command_drives_the_circuit() {
        let mut c = controller(10.0);
        c.grid_mut()
            .place_component(Switch::new(Direction::East).into(), pos(0, 0))
            .unwrap();
        c.grid_mut()
            .place_component(Wire::new().into(), pos(1, 0))
            .unwrap();
        c.step();
        assert_eq!(power_at(&c, 1, 0), 0);

        c.submit(Command::ToggleSwitch { position: pos(0, 0) });
        c.step();
        assert_eq!(power_at(&c, 1, 0), POWER_MAX - 1);

        c.submit(Command::ToggleSwitch { position: pos(0, 0) });
        c.step();
        assert_eq!(power_at(&c, 1, 0), 0);
    }

    #[test]
    fn rejected_commands_are_reported_not_panicked() {
        let mut c = controller(10.0);
        c.submit(Command::Place {
            position: pos(100, 100),
            component: Wire::new().into(),
        });
        c.submit(Command::PressButton { position: pos(0, 0) });

        let result = c.step();
        assert!(matches!(
            result.command_results[0].1,
            CommandOutcome::Failed(_)
        ));
        assert_eq!(result.command_results[1].1, CommandOutcome::Refused);
    }

    #[test]
    fn dirty_set_is_clear_after_a_tick() {
        let mut c = controller(10.0);
        c.grid_mut()
            .place_component(Wire::new().into(), pos(3, 3))
            .unwrap();
        assert!(!c.grid().cells_to_update().is_empty());

        c.step();
        assert!(c.grid().cells_to_update().is_empty());
    }

    #[test]
    fn tick_completed_event_delivered_each_tick() {
        let mut c = controller(10.0);
        let ticks_seen = Rc::new(RefCell::new(Vec::new()));
        let seen = ticks_seen.clone();
        c.grid_mut().events_mut().on(
            EventKind::TickCompleted,
            Box::new(move |event| {
                if let Event::TickCompleted { tick } = event {
                    seen.borrow_mut().push(*tick);
                }
            }),
        );

        c.step();
        c.step();
        c.step();

        assert_eq!(*ticks_seen.borrow(), vec![1, 2, 3]);
    }

    #[test]
    fn steady_state_reaches_quiescence() {
        let mut c = controller(10.0);
        let mut switch = Switch::new(Direction::East);
        switch.set_state(true);
        c.grid_mut()
            .place_component(switch.into(), pos(0, 0))
            .unwrap();
        for x in 1..5 {
            c.grid_mut()
                .place_component(Wire::new().into(), pos(x, 0))
                .unwrap();
        }

        c.step();
        let settled = c.state_hash();

        // No new mutations: further ticks do not disturb the state.
        c.step();
        c.step();
        assert_eq!(c.state_hash(), settled);
        assert!(c.grid().cells_to_update().is_empty());
    }

    #[test]
    fn command_history_records_executed_ticks() {
        let mut c = controller(10.0).with_command_history(16);
        c.submit(Command::Clear);
        c.step();
        c.submit(Command::MakeUnbounded);
        c.step();

        let history = c.command_queue().history();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].0, 0);
        assert_eq!(history[1].0, 1);
    }
}
