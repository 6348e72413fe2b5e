//! The circuit component model: a closed set of element variants behind one
//! capability surface.
//!
//! Variants dispatch via enum match (no trait objects):
//!
//! - [`Wire`] -- passive conductor; carries decayed signal on its enabled sides.
//! - [`Switch`] -- bistable emitter; full power on its facing side while on.
//! - [`Button`] -- momentary emitter; full power on its facing side while its
//!   activation timer runs.
//! - [`Probe`] -- test/placeholder variant exercising the capability surface;
//!   connects on every side and emits its host-set power without decay.
//!
//! Components never reference their owning cell. Mutators report whether
//! state changed through their return value, and the grid performs the
//! dirty-marking at every mutation point.

use crate::geometry::{Direction, SideSet};
use crate::hash::StateHash;
use crate::time::Seconds;
use serde::{Deserialize, Serialize};

/// Maximum signal strength a component can carry. Every power write is
/// clamped to `0..=POWER_MAX`.
pub const POWER_MAX: u8 = 15;

// ---------------------------------------------------------------------------
// Variant structs
// ---------------------------------------------------------------------------

/// Passive conductor with per-side sculpting and one-per-hop decay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wire {
    /// Current signal strength, `0..=POWER_MAX`.
    pub power: u8,
    /// Orientation is carried for hosts (sprite selection); it does not
    /// affect wire connectivity.
    pub facing: Direction,
    /// Which cardinal sides may carry signal.
    pub sides: SideSet,
}

impl Wire {
    /// A dead wire with all four sides enabled.
    pub fn new() -> Self {
        Self {
            power: 0,
            facing: Direction::North,
            sides: SideSet::all(),
        }
    }

    /// Flip the enabled flag for one side. No-op for diagonals.
    pub fn toggle_side(&mut self, dir: Direction) {
        self.sides.toggle(dir);
    }

    /// Re-enable all four sides.
    pub fn reset_sides(&mut self) {
        self.sides = SideSet::all();
    }
}

impl Default for Wire {
    fn default() -> Self {
        Self::new()
    }
}

/// Bistable emitter: off (power 0) or on (power 15).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Switch {
    pub on: bool,
    pub facing: Direction,
}

impl Switch {
    pub fn new(facing: Direction) -> Self {
        Self { on: false, facing }
    }

    /// Flip between on and off.
    pub fn toggle(&mut self) {
        self.on = !self.on;
    }

    /// Set the state directly. Returns true if the state changed.
    pub fn set_state(&mut self, on: bool) -> bool {
        let changed = self.on != on;
        self.on = on;
        changed
    }
}

/// Momentary emitter: pressing arms a countdown timer; power is 15 while
/// the timer runs and 0 otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Button {
    pub pressed: bool,
    /// Time left until release. Meaningful only while pressed.
    pub remaining: Seconds,
    /// Activation duration applied on every press.
    pub duration: Seconds,
    pub facing: Direction,
}

impl Button {
    pub fn new(facing: Direction, duration: Seconds) -> Self {
        Self {
            pressed: false,
            remaining: Seconds::ZERO,
            duration,
            facing,
        }
    }

    /// Press the button. Re-arms the timer; presses do not stack.
    pub fn press(&mut self) {
        self.pressed = true;
        self.remaining = self.duration;
    }

    /// Advance the timer. Returns true when the button releases this call.
    pub fn tick_timer(&mut self, dt: Seconds) -> bool {
        if !self.pressed {
            return false;
        }
        self.remaining -= dt;
        if self.remaining <= Seconds::ZERO {
            self.pressed = false;
            self.remaining = Seconds::ZERO;
            return true;
        }
        false
    }
}

/// Test/placeholder variant for the capability surface. Connects on every
/// side and emits whatever power the host set (clamped, no decay); doubles
/// as an omnidirectional emitter in tests. The `placeable` flag lets tests
/// exercise placement refusal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Probe {
    pub power: u8,
    pub facing: Direction,
    pub placeable: bool,
}

impl Probe {
    pub fn new() -> Self {
        Self {
            power: 0,
            facing: Direction::North,
            placeable: true,
        }
    }
}

impl Default for Probe {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// ComponentKind
// ---------------------------------------------------------------------------

/// Discriminant tag for component variants, used for kind searches and the
/// factory boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComponentKind {
    Wire,
    Switch,
    Button,
    Probe,
}

impl ComponentKind {
    /// Canonical type name used by the factory registry and DTOs.
    pub fn type_name(self) -> &'static str {
        match self {
            ComponentKind::Wire => "wire",
            ComponentKind::Switch => "switch",
            ComponentKind::Button => "button",
            ComponentKind::Probe => "probe",
        }
    }
}

// ---------------------------------------------------------------------------
// Component
// ---------------------------------------------------------------------------

/// A circuit element occupying one grid cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Component {
    Wire(Wire),
    Switch(Switch),
    Button(Button),
    Probe(Probe),
}

impl Component {
    /// Get the discriminant kind for this component.
    pub fn kind(&self) -> ComponentKind {
        match self {
            Component::Wire(_) => ComponentKind::Wire,
            Component::Switch(_) => ComponentKind::Switch,
            Component::Button(_) => ComponentKind::Button,
            Component::Probe(_) => ComponentKind::Probe,
        }
    }

    /// Canonical type name, matching the factory registry.
    pub fn type_name(&self) -> &'static str {
        self.kind().type_name()
    }

    // -----------------------------------------------------------------------
    // Power
    // -----------------------------------------------------------------------

    /// Current signal strength. Emitters derive it from their own state.
    pub fn power_level(&self) -> u8 {
        match self {
            Component::Wire(w) => w.power,
            Component::Switch(s) => {
                if s.on {
                    POWER_MAX
                } else {
                    0
                }
            }
            Component::Button(b) => {
                if b.pressed {
                    POWER_MAX
                } else {
                    0
                }
            }
            Component::Probe(p) => p.power,
        }
    }

    /// Write the power level, clamped to `0..=POWER_MAX`. Emitters ignore
    /// the write: their power is driven by their own state machine.
    pub fn set_power_level(&mut self, power: u8) {
        let power = power.min(POWER_MAX);
        match self {
            Component::Wire(w) => w.power = power,
            Component::Probe(p) => p.power = power,
            Component::Switch(_) | Component::Button(_) => {}
        }
    }

    // -----------------------------------------------------------------------
    // Orientation
    // -----------------------------------------------------------------------

    /// The direction this component faces. Default North.
    pub fn orientation(&self) -> Direction {
        match self {
            Component::Wire(w) => w.facing,
            Component::Switch(s) => s.facing,
            Component::Button(b) => b.facing,
            Component::Probe(p) => p.facing,
        }
    }

    pub fn set_orientation(&mut self, facing: Direction) {
        match self {
            Component::Wire(w) => w.facing = facing,
            Component::Switch(s) => s.facing = facing,
            Component::Button(b) => b.facing = facing,
            Component::Probe(p) => p.facing = facing,
        }
    }

    // -----------------------------------------------------------------------
    // Connectivity
    // -----------------------------------------------------------------------

    /// The cardinal sides that may carry signal. Directional emitters expose
    /// exactly their orientation; wires expose their enabled sides; probes
    /// expose all four.
    pub fn connected_sides(&self) -> Vec<Direction> {
        match self {
            Component::Wire(w) => w.sides.directions(),
            Component::Switch(s) => vec![s.facing],
            Component::Button(b) => vec![b.facing],
            Component::Probe(_) => Direction::CARDINALS.to_vec(),
        }
    }

    /// Whether signal may cross the given side of this component.
    pub fn can_connect(&self, dir: Direction) -> bool {
        match self {
            Component::Wire(w) => w.sides.enabled(dir),
            Component::Switch(s) => dir == s.facing,
            Component::Button(b) => dir == b.facing,
            Component::Probe(_) => true,
        }
    }

    /// The power this component drives onto the given side.
    pub fn power_output(&self, dir: Direction) -> u8 {
        match self {
            Component::Wire(w) => {
                if w.sides.enabled(dir) {
                    w.power
                } else {
                    0
                }
            }
            Component::Switch(s) => {
                if s.on && dir == s.facing {
                    POWER_MAX
                } else {
                    0
                }
            }
            Component::Button(b) => {
                if b.pressed && dir == b.facing {
                    POWER_MAX
                } else {
                    0
                }
            }
            Component::Probe(p) => p.power,
        }
    }

    // -----------------------------------------------------------------------
    // Per-tick update
    // -----------------------------------------------------------------------

    /// Advance variant timers by one tick interval. Returns true when the
    /// component's observable state changed (the owning cell must be queued
    /// for re-propagation).
    pub fn update(&mut self, dt: Seconds) -> bool {
        match self {
            Component::Button(b) => b.tick_timer(dt),
            Component::Wire(_) | Component::Switch(_) | Component::Probe(_) => false,
        }
    }

    // -----------------------------------------------------------------------
    // Signal intake
    // -----------------------------------------------------------------------

    /// Apply incoming signal during a propagation pass. `power` is the
    /// strongest output reported by the component's enabled, compatible
    /// neighbors; wires store `power - 1` (floored at zero). Everything
    /// else drives its power from its own state and ignores the write.
    /// Returns true if the stored power changed.
    pub fn apply_signal(&mut self, _incoming: Direction, power: u8) -> bool {
        match self {
            Component::Wire(w) => {
                let next = power.min(POWER_MAX).saturating_sub(1);
                let changed = w.power != next;
                w.power = next;
                changed
            }
            Component::Switch(_) | Component::Button(_) | Component::Probe(_) => false,
        }
    }

    // -----------------------------------------------------------------------
    // Lifecycle
    // -----------------------------------------------------------------------

    /// Whether this component agrees to occupy a cell. Defaults to true;
    /// only the probe's test flag can refuse.
    pub fn can_be_placed(&self) -> bool {
        match self {
            Component::Probe(p) => p.placeable,
            _ => true,
        }
    }

    // -----------------------------------------------------------------------
    // Hashing
    // -----------------------------------------------------------------------

    /// Feed all observable state into a [`StateHash`].
    pub fn write_state(&self, hash: &mut StateHash) {
        hash.write_u8(self.kind() as u8);
        hash.write_u8(self.power_level());
        hash.write_u8(self.orientation() as u8);
        match self {
            Component::Wire(w) => hash.write_u8(w.sides.bits()),
            Component::Switch(s) => hash.write_u8(s.on as u8),
            Component::Button(b) => {
                hash.write_u8(b.pressed as u8);
                hash.write_i64(b.remaining.to_bits());
                hash.write_i64(b.duration.to_bits());
            }
            Component::Probe(p) => hash.write_u8(p.placeable as u8),
        }
    }
}

impl From<Wire> for Component {
    fn from(w: Wire) -> Self {
        Component::Wire(w)
    }
}

impl From<Switch> for Component {
    fn from(s: Switch) -> Self {
        Component::Switch(s)
    }
}

impl From<Button> for Component {
    fn from(b: Button) -> Self {
        Component::Button(b)
    }
}

impl From<Probe> for Component {
    fn from(p: Probe) -> Self {
        Component::Probe(p)
    }
}

// ===========================================================================
// Tests
// ===========================================================================
