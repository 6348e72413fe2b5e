//! The component factory registry.
//!
//! Maps a type name to a constructor turning [`ComponentData`] back into a
//! live [`Component`]. The registry is an explicit value built once at
//! startup and passed by reference to deserialization call sites; tests can
//! build alternate registries with extra or replacement constructors.

use crate::component::{Button, Component, Probe, Switch, Wire};
use crate::geometry::Direction;
use crate::serialize::ComponentData;
use crate::time::Seconds;
use std::collections::HashMap;

/// A constructor turning a snapshot into a live component.
pub type Constructor = fn(&ComponentData) -> Result<Component, RegistryError>;

/// Errors from the factory boundary.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("unknown component type: {0:?}")]
    UnknownComponentType(String),
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

/// Registry of component constructors, keyed by type name.
#[derive(Debug, Default)]
pub struct ComponentRegistry {
    constructors: HashMap<String, Constructor>,
}

impl ComponentRegistry {
    /// An empty registry with no constructors.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with the built-in circuit components registered:
    /// "wire", "switch", "button", and "probe".
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register("wire", build_wire);
        registry.register("switch", build_switch);
        registry.register("button", build_button);
        registry.register("probe", build_probe);
        registry
    }

    /// Register a constructor, replacing any existing one for the name.
    pub fn register(&mut self, type_name: &str, constructor: Constructor) {
        self.constructors.insert(type_name.to_string(), constructor);
    }

    /// Whether a constructor is registered for the name.
    pub fn contains(&self, type_name: &str) -> bool {
        self.constructors.contains_key(type_name)
    }

    /// Construct a component from its snapshot.
    pub fn create(&self, data: &ComponentData) -> Result<Component, RegistryError> {
        if data.kind.trim().is_empty() {
            return Err(RegistryError::InvalidArgument(
                "component type name is empty".to_string(),
            ));
        }
        let constructor = self
            .constructors
            .get(&data.kind)
            .ok_or_else(|| RegistryError::UnknownComponentType(data.kind.clone()))?;
        constructor(data)
    }
}

// ---------------------------------------------------------------------------
// Built-in constructors
// ---------------------------------------------------------------------------

/// Read the shared "facing" property. Missing means North; an
/// unrecognized name is an error rather than a silent default.
fn read_facing(data: &ComponentData) -> Result<Direction, RegistryError> {
    match data.get_text("facing") {
        None => Ok(Direction::North),
        Some(name) => Direction::from_name(name).ok_or_else(|| {
            RegistryError::InvalidArgument(format!("unknown facing direction {name:?}"))
        }),
    }
}

fn read_power(data: &ComponentData) -> u8 {
    data.get_int("power").unwrap_or(0).clamp(0, u8::MAX as i64) as u8
}

fn build_wire(data: &ComponentData) -> Result<Component, RegistryError> {
    let mut wire = Wire::new();
    wire.power = read_power(data).min(crate::component::POWER_MAX);
    wire.facing = read_facing(data)?;
    for dir in Direction::CARDINALS {
        if let Some(enabled) = data.get_bool(dir.name()) {
            wire.sides.set(dir, enabled);
        }
    }
    Ok(wire.into())
}

fn build_switch(data: &ComponentData) -> Result<Component, RegistryError> {
    let mut switch = Switch::new(read_facing(data)?);
    switch.set_state(data.get_bool("on").unwrap_or(false));
    Ok(switch.into())
}

fn build_button(data: &ComponentData) -> Result<Component, RegistryError> {
    let duration = data.get_seconds("duration").unwrap_or(Seconds::ZERO);
    let mut button = Button::new(read_facing(data)?, duration);
    button.pressed = data.get_bool("pressed").unwrap_or(false);
    button.remaining = data.get_seconds("remaining").unwrap_or(Seconds::ZERO);
    Ok(button.into())
}

fn build_probe(data: &ComponentData) -> Result<Component, RegistryError> {
    let mut probe = Probe::new();
    probe.power = read_power(data).min(crate::component::POWER_MAX);
    probe.facing = read_facing(data)?;
    probe.placeable = data.get_bool("placeable").unwrap_or(true);
    Ok(probe.into())
}

// ===========================================================================
// Tests
// ===========================================================================
