//! Input command queue for externally-submitted circuit mutations.
//!
//! Commands are queued by the host (UI, scripting, network) and executed at
//! the start of the next tick, which keeps the tick loop single-threaded
//! and the simulation deterministic: no mutation ever lands mid-pipeline.
//! Each command represents a single atomic operation on the grid.

use crate::component::Component;
use crate::error::GridError;
use crate::geometry::{Direction, GridPosition};
use crate::time::Ticks;

// ---------------------------------------------------------------------------
// Command enum
// ---------------------------------------------------------------------------

/// A single mutation that can be submitted to the simulation.
#[derive(Debug, Clone)]
pub enum Command {
    /// Place a component at a position.
    Place {
        position: GridPosition,
        component: Component,
    },
    /// Remove the component at a position.
    Remove { position: GridPosition },
    /// Flip the switch at a position.
    ToggleSwitch { position: GridPosition },
    /// Set the switch at a position directly.
    SetSwitch { position: GridPosition, on: bool },
    /// Press the button at a position.
    PressButton { position: GridPosition },
    /// Flip one side of the wire at a position.
    ToggleWireSide {
        position: GridPosition,
        side: Direction,
    },
    /// Re-enable all four sides of the wire at a position.
    ResetWireSides { position: GridPosition },
    /// Resize the grid, evicting components outside the new bounds.
    Resize { width: u32, height: u32 },
    /// Convert the grid to unbounded.
    MakeUnbounded,
    /// Remove every component from the grid.
    Clear,
}

/// What happened when a command was applied at the tick boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    /// The mutation took effect.
    Applied,
    /// The target refused the mutation without error (occupied cell,
    /// wrong component kind at the position, no component present).
    Refused,
    /// The mutation violated a grid invariant.
    Failed(GridError),
}

// ---------------------------------------------------------------------------
// CommandQueue
// ---------------------------------------------------------------------------

/// A queue of commands waiting to be executed at the next tick boundary.
///
/// Supports optional history tracking for replay and debugging.
#[derive(Debug)]
pub struct CommandQueue {
    /// Commands waiting to be executed.
    pending: Vec<Command>,
    /// History of executed commands: (tick, command).
    history: Vec<(Ticks, Command)>,
    /// Maximum history entries to retain. 0 = no history.
    max_history: usize,
}

impl Default for CommandQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandQueue {
    /// Create a new empty command queue with no history tracking.
    pub fn new() -> Self {
        Self {
            pending: Vec::new(),
            history: Vec::new(),
            max_history: 0,
        }
    }

    /// Create a new command queue that retains up to `max_history` entries.
    pub fn with_max_history(max_history: usize) -> Self {
        Self {
            pending: Vec::new(),
            history: Vec::new(),
            max_history,
        }
    }

    /// Push a single command onto the queue.
    pub fn push(&mut self, command: Command) {
        self.pending.push(command);
    }

    /// Push multiple commands onto the queue at once.
    pub fn push_batch(&mut self, commands: impl IntoIterator<Item = Command>) {
        self.pending.extend(commands);
    }

    /// Drain all pending commands, moving them to history with the given
    /// tick. Returns the drained commands in submission order.
    pub fn drain(&mut self, tick: Ticks) -> Vec<Command> {
        let commands: Vec<Command> = self.pending.drain(..).collect();

        if self.max_history > 0 {
            for cmd in &commands {
                self.history.push((tick, cmd.clone()));
            }
            let excess = self.history.len().saturating_sub(self.max_history);
            if excess > 0 {
                self.history.drain(..excess);
            }
        }

        commands
    }

    /// Number of commands waiting to be executed.
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Whether the queue has no pending commands.
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Get the command history (tick, command) pairs.
    pub fn history(&self) -> &[(Ticks, Command)] {
        &self.history
    }

    /// Clear all history entries.
    pub fn clear_history(&mut self) {
        self.history.clear();
    }
}

// ===========================================================================
// Tests
// ===========================================================================
