//! Serialization DTOs: the abstract data-transfer shape of a circuit.
//!
//! The core does not own a wire format. [`ComponentData`], [`CellData`],
//! and [`GridData`] are plain serde types the host encodes however it
//! likes; the `data-loader` feature ships a JSON binding on top of them.
//!
//! Round-tripping a component through [`Component::to_data`] and the
//! factory registry reproduces power level, orientation, and all
//! variant-specific state exactly: wire side maps, the button's pressed
//! flag and remaining timer, the switch's on/off state.

use crate::component::Component;
use crate::error::GridError;
use crate::geometry::{Direction, GridPosition};
use crate::grid::Grid;
use crate::registry::{ComponentRegistry, RegistryError};
use crate::time::Seconds;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ---------------------------------------------------------------------------
// Property values
// ---------------------------------------------------------------------------

/// A single typed property in a [`ComponentData`] snapshot.
///
/// `Seconds` keeps fixed-point durations exact across a round trip;
/// converting timers through a float would not.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PropertyValue {
    Bool(bool),
    Int(i64),
    Seconds(Seconds),
    Text(String),
}

// ---------------------------------------------------------------------------
// ComponentData
// ---------------------------------------------------------------------------

/// Snapshot of one component: its factory type name plus an ordered map of
/// variant-specific properties.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentData {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub properties: BTreeMap<String, PropertyValue>,
}

impl ComponentData {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            properties: BTreeMap::new(),
        }
    }

    /// Builder-style property insertion.
    pub fn with(mut self, name: impl Into<String>, value: PropertyValue) -> Self {
        self.properties.insert(name.into(), value);
        self
    }

    pub fn get_bool(&self, name: &str) -> Option<bool> {
        match self.properties.get(name) {
            Some(PropertyValue::Bool(v)) => Some(*v),
            _ => None,
        }
    }

    pub fn get_int(&self, name: &str) -> Option<i64> {
        match self.properties.get(name) {
            Some(PropertyValue::Int(v)) => Some(*v),
            _ => None,
        }
    }

    pub fn get_seconds(&self, name: &str) -> Option<Seconds> {
        match self.properties.get(name) {
            Some(PropertyValue::Seconds(v)) => Some(*v),
            _ => None,
        }
    }

    pub fn get_text(&self, name: &str) -> Option<&str> {
        match self.properties.get(name) {
            Some(PropertyValue::Text(v)) => Some(v.as_str()),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Component -> ComponentData
// ---------------------------------------------------------------------------

impl Component {
    /// Snapshot every field needed to reconstruct this component exactly.
    pub fn to_data(&self) -> ComponentData {
        let mut data = ComponentData::new(self.type_name())
            .with("facing", PropertyValue::Text(self.orientation().name().into()));
        match self {
            Component::Wire(w) => {
                data = data.with("power", PropertyValue::Int(w.power as i64));
                for dir in Direction::CARDINALS {
                    data = data.with(dir.name(), PropertyValue::Bool(w.sides.enabled(dir)));
                }
            }
            Component::Switch(s) => {
                data = data.with("on", PropertyValue::Bool(s.on));
            }
            Component::Button(b) => {
                data = data
                    .with("pressed", PropertyValue::Bool(b.pressed))
                    .with("remaining", PropertyValue::Seconds(b.remaining))
                    .with("duration", PropertyValue::Seconds(b.duration));
            }
            Component::Probe(p) => {
                data = data
                    .with("power", PropertyValue::Int(p.power as i64))
                    .with("placeable", PropertyValue::Bool(p.placeable));
            }
        }
        data
    }
}

// ---------------------------------------------------------------------------
// Cell and grid shapes
// ---------------------------------------------------------------------------

/// Snapshot of one occupied cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellData {
    pub x: i32,
    pub y: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component: Option<ComponentData>,
}

/// Snapshot of a whole grid. Empty cells are implied by the bounds and not
/// listed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridData {
    /// `(width, height)` for bounded grids, `None` for unbounded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounds: Option<(u32, u32)>,
    #[serde(default)]
    pub cells: Vec<CellData>,
}

/// Errors from rebuilding a grid out of a [`GridData`] snapshot.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("factory error: {0}")]
    Registry(#[from] RegistryError),
    #[error("grid error: {0}")]
    Grid(#[from] GridError),
    #[error("placement rejected at ({x}, {y}): duplicate or refused")]
    RejectedPlacement { x: i32, y: i32 },
}

/// Snapshot every occupied cell of a grid, in coordinate order.
pub fn grid_to_data(grid: &Grid) -> GridData {
    GridData {
        bounds: grid.bounds().map(|b| (b.width, b.height)),
        cells: grid
            .components()
            .map(|(pos, component)| CellData {
                x: pos.x,
                y: pos.y,
                component: Some(component.to_data()),
            })
            .collect(),
    }
}

/// Rebuild a grid from a snapshot, constructing components through the
/// given registry.
pub fn grid_from_data(
    data: &GridData,
    registry: &ComponentRegistry,
) -> Result<Grid, SnapshotError> {
    let mut grid = match data.bounds {
        Some((width, height)) => Grid::bounded(width, height)?,
        None => Grid::unbounded(),
    };
    for cell in &data.cells {
        let Some(component_data) = &cell.component else {
            continue;
        };
        let component = registry.create(component_data)?;
        let placed = grid.place_component(component, GridPosition::new(cell.x, cell.y))?;
        if !placed {
            return Err(SnapshotError::RejectedPlacement {
                x: cell.x,
                y: cell.y,
            });
        }
    }
    Ok(grid)
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::{Button, Probe, Switch, Wire};
    use crate::time::secs;

    fn registry() -> ComponentRegistry {
        ComponentRegistry::with_builtins()
    }

    fn round_trip(component: Component) -> Component {
        registry().create(&component.to_data()).unwrap()
    }

    #[test]
    fn wire_round_trips_exactly() {
        let mut wire = Wire::new();
        wire.power = 7;
        wire.toggle_side(Direction::North);
        wire.toggle_side(Direction::West);
        wire.facing = Direction::East;
        let original = Component::Wire(wire);

        assert_eq!(round_trip(original.clone()), original);
    }

    #[test]
    fn switch_round_trips_exactly() {
        let mut switch = Switch::new(Direction::South);
        switch.set_state(true);
        let original = Component::Switch(switch);

        assert_eq!(round_trip(original.clone()), original);
    }

    #[test]
    fn button_round_trips_mid_countdown() {
        let mut button = Button::new(Direction::West, secs(0.75));
        button.press();
        button.tick_timer(secs(0.25));
        let original = Component::Button(button);

        let restored = round_trip(original.clone());
        assert_eq!(restored, original);
        if let Component::Button(b) = restored {
            // The remaining timer survives exactly, not rounded.
            assert_eq!(b.remaining, secs(0.5));
        } else {
            panic!("expected a button");
        }
    }

    #[test]
    fn probe_round_trips_exactly() {
        let mut probe = Probe::new();
        probe.power = 9;
        probe.placeable = false;
        let original = Component::Probe(probe);

        assert_eq!(round_trip(original.clone()), original);
    }

    #[test]
    fn component_data_carries_type_name() {
        let data = Component::Wire(Wire::new()).to_data();
        assert_eq!(data.kind, "wire");
        assert_eq!(data.get_int("power"), Some(0));
        assert_eq!(data.get_bool("north"), Some(true));
        assert_eq!(data.get_text("facing"), Some("north"));
    }

    #[test]
    fn typed_getters_reject_mismatched_types() {
        let data = ComponentData::new("wire").with("power", PropertyValue::Text("high".into()));
        assert_eq!(data.get_int("power"), None);
        assert_eq!(data.get_text("power"), Some("high"));
        assert_eq!(data.get_bool("missing"), None);
    }

    #[test]
    fn grid_round_trips_through_data() {
        let mut grid = Grid::bounded(6, 6).unwrap();
        let mut switch = Switch::new(Direction::East);
        switch.set_state(true);
        grid.place_component(switch.into(), GridPosition::new(0, 0))
            .unwrap();
        let mut wire = Wire::new();
        wire.power = 14;
        grid.place_component(wire.into(), GridPosition::new(1, 0))
            .unwrap();

        let data = grid_to_data(&grid);
        assert_eq!(data.bounds, Some((6, 6)));
        assert_eq!(data.cells.len(), 2);

        let rebuilt = grid_from_data(&data, &registry()).unwrap();
        assert_eq!(rebuilt.state_hash(), grid.state_hash());
    }

    #[test]
    fn unbounded_grid_snapshot_has_no_bounds() {
        let mut grid = Grid::unbounded();
        grid.place_component(Wire::new().into(), GridPosition::new(-5, 40))
            .unwrap();

        let data = grid_to_data(&grid);
        assert_eq!(data.bounds, None);

        let rebuilt = grid_from_data(&data, &registry()).unwrap();
        assert!(!rebuilt.is_bounded());
        assert!(
            rebuilt
                .component_at(GridPosition::new(-5, 40))
                .is_some()
        );
    }

    #[test]
    fn duplicate_cells_in_snapshot_are_rejected() {
        let data = GridData {
            bounds: Some((4, 4)),
            cells: vec![
                CellData {
                    x: 1,
                    y: 1,
                    component: Some(Component::Wire(Wire::new()).to_data()),
                },
                CellData {
                    x: 1,
                    y: 1,
                    component: Some(Component::Wire(Wire::new()).to_data()),
                },
            ],
        };
        assert!(matches!(
            grid_from_data(&data, &registry()),
            Err(SnapshotError::RejectedPlacement { x: 1, y: 1 })
        ));
    }

    #[test]
    fn out_of_bounds_snapshot_cell_is_an_error() {
        let data = GridData {
            bounds: Some((2, 2)),
            cells: vec![CellData {
                x: 5,
                y: 0,
                component: Some(Component::Wire(Wire::new()).to_data()),
            }],
        };
        assert!(matches!(
            grid_from_data(&data, &registry()),
            Err(SnapshotError::Grid(GridError::OutOfBounds { .. }))
        ));
    }
}
