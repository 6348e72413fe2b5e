//! Profiling instrumentation for the tick pipeline.
//!
//! [`TickProfile`] captures per-phase timing from the most recent tick.
//! Only available when the `profiling` feature is enabled.

use crate::time::Ticks;
use std::time::Duration;

/// Per-phase timing from the most recent tick.
#[derive(Debug, Clone, Default)]
pub struct TickProfile {
    /// Draining and applying queued commands.
    pub commands: Duration,
    /// Per-component timer updates.
    pub component_update: Duration,
    /// All propagation passes for the tick.
    pub propagation: Duration,
    /// Event batch delivery.
    pub delivery: Duration,
    pub total: Duration,
    pub tick: Ticks,
}

impl TickProfile {
    /// Returns the name and duration of the slowest phase.
    pub fn bottleneck_phase(&self) -> (&'static str, Duration) {
        let phases = [
            ("commands", self.commands),
            ("component_update", self.component_update),
            ("propagation", self.propagation),
            ("delivery", self.delivery),
        ];
        phases.into_iter().max_by_key(|(_, d)| *d).unwrap()
    }
}
