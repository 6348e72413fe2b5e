//! Read-only snapshots for hosts that poll instead of listening to events.

use crate::component::ComponentKind;
use crate::geometry::{Direction, GridPosition};
use crate::grid::Grid;

/// Flat, copyable view of one occupied cell, enough for a render layer to
/// draw it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellSnapshot {
    pub position: GridPosition,
    pub kind: ComponentKind,
    pub power: u8,
    pub orientation: Direction,
    /// Whether the cell is flagged as changed since its last update.
    pub dirty: bool,
}

/// Snapshot every occupied cell, in coordinate order.
pub fn grid_snapshot(grid: &Grid) -> Vec<CellSnapshot> {
    grid.cells()
        .filter_map(|cell| {
            cell.component().map(|component| CellSnapshot {
                position: cell.position(),
                kind: component.kind(),
                power: component.power_level(),
                orientation: component.orientation(),
                dirty: cell.is_dirty(),
            })
        })
        .collect()
}
