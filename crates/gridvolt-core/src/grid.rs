//! The spatial container: coordinates to cells, optional bounds, and the
//! dirty set of propagation seeds.
//!
//! Cells are stored in a `BTreeMap` keyed by [`GridPosition`] so iteration
//! order -- and therefore propagation seed order and state hashing -- is
//! deterministic. Bounded grids materialize every in-bounds cell eagerly
//! and reject out-of-bounds coordinates; unbounded grids create cells on
//! demand and never reject a coordinate.
//!
//! Every mutation that can change signal flow (placement, removal, toggles,
//! presses) marks the affected cell and its cardinal neighbors in the dirty
//! set; the scheduler drains that set once per tick and runs one
//! propagation pass per seed.

use crate::cell::Cell;
use crate::component::{Component, ComponentKind};
use crate::error::GridError;
use crate::event::{Event, EventBus};
use crate::geometry::{Bounds, Direction, GridPosition};
use crate::hash::StateHash;
use crate::time::Seconds;
use std::collections::{BTreeMap, BTreeSet};

/// A 2D lattice of cells, the circuit's world.
#[derive(Debug)]
pub struct Grid {
    cells: BTreeMap<GridPosition, Cell>,
    bounds: Option<Bounds>,
    /// Positions queued as seeds for the next propagation phase.
    dirty: BTreeSet<GridPosition>,
    events: EventBus,
}

impl Grid {
    // -----------------------------------------------------------------------
    // Construction
    // -----------------------------------------------------------------------

    /// Create a bounded grid with every in-bounds cell materialized.
    pub fn bounded(width: u32, height: u32) -> Result<Self, GridError> {
        if width < 1 || height < 1 {
            return Err(GridError::InvalidDimension { width, height });
        }
        let bounds = Bounds::new(width, height);
        let cells = bounds.positions().map(|p| (p, Cell::new(p))).collect();
        Ok(Self {
            cells,
            bounds: Some(bounds),
            dirty: BTreeSet::new(),
            events: EventBus::default(),
        })
    }

    /// Create an unbounded grid. Cells come into existence on first use.
    pub fn unbounded() -> Self {
        Self {
            cells: BTreeMap::new(),
            bounds: None,
            dirty: BTreeSet::new(),
            events: EventBus::default(),
        }
    }

    // -----------------------------------------------------------------------
    // Bounds
    // -----------------------------------------------------------------------

    pub fn bounds(&self) -> Option<Bounds> {
        self.bounds
    }

    pub fn is_bounded(&self) -> bool {
        self.bounds.is_some()
    }

    /// Whether the position is addressable. Always true for unbounded grids.
    pub fn is_within_bounds(&self, pos: GridPosition) -> bool {
        match self.bounds {
            Some(b) => b.contains(pos),
            None => true,
        }
    }

    fn check_bounds(&self, pos: GridPosition) -> Result<(), GridError> {
        match self.bounds {
            Some(bounds) if !bounds.contains(pos) => Err(GridError::OutOfBounds {
                position: pos,
                bounds,
            }),
            _ => Ok(()),
        }
    }

    /// Resize to new bounds. Components outside the new bounds are evicted
    /// (with a removal notification each); cells newly in bounds are
    /// created. Also bounds a previously unbounded grid.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), GridError> {
        if width < 1 || height < 1 {
            return Err(GridError::InvalidDimension { width, height });
        }
        let old = self.bounds;
        let new = Bounds::new(width, height);

        // Evict everything that falls outside the new bounds.
        let evicted: Vec<GridPosition> = self
            .cells
            .keys()
            .filter(|p| !new.contains(**p))
            .copied()
            .collect();
        for pos in evicted {
            if let Some(cell) = self.cells.get_mut(&pos)
                && let Some(component) = cell.take_component()
            {
                self.events.emit(Event::ComponentRemoved {
                    position: pos,
                    kind: component.kind(),
                });
                self.mark_neighbors(pos);
            }
            self.cells.remove(&pos);
            self.dirty.remove(&pos);
        }

        // Materialize every newly in-bounds cell.
        for pos in new.positions() {
            self.cells.entry(pos).or_insert_with(|| Cell::new(pos));
        }

        self.bounds = Some(new);
        self.events.emit(Event::GridResized { old, new });
        Ok(())
    }

    /// Convert to an unbounded grid, preserving every existing cell.
    pub fn make_unbounded(&mut self) {
        self.bounds = None;
    }

    // -----------------------------------------------------------------------
    // Cell access
    // -----------------------------------------------------------------------

    /// The cell at a position, if it has been materialized. Bounded grids
    /// have every in-bounds cell materialized at all times.
    pub fn cell_at(&self, pos: GridPosition) -> Option<&Cell> {
        self.cells.get(&pos)
    }

    /// Mutable cell access. Unbounded grids lazily materialize the cell;
    /// bounded grids return `None` outside their bounds.
    pub fn cell_at_mut(&mut self, pos: GridPosition) -> Option<&mut Cell> {
        if !self.is_within_bounds(pos) {
            return None;
        }
        if self.bounds.is_none() {
            return Some(self.cells.entry(pos).or_insert_with(|| Cell::new(pos)));
        }
        self.cells.get_mut(&pos)
    }

    pub fn component_at(&self, pos: GridPosition) -> Option<&Component> {
        self.cells.get(&pos).and_then(|c| c.component())
    }

    pub fn component_at_mut(&mut self, pos: GridPosition) -> Option<&mut Component> {
        self.cells.get_mut(&pos).and_then(|c| c.component_mut())
    }

    /// The four cardinal neighbor cells. Bounded grids omit out-of-bounds
    /// sides; unbounded grids always return four (materializing as needed).
    pub fn neighbor_cells(&mut self, pos: GridPosition) -> Vec<(Direction, &Cell)> {
        if self.bounds.is_none() {
            for dir in Direction::CARDINALS {
                let npos = pos.offset(dir);
                self.cells.entry(npos).or_insert_with(|| Cell::new(npos));
            }
        }
        Direction::CARDINALS
            .into_iter()
            .filter_map(|dir| self.cells.get(&pos.offset(dir)).map(|cell| (dir, cell)))
            .collect()
    }

    /// The components in the four cardinal neighbor cells.
    pub fn neighbor_components(&self, pos: GridPosition) -> Vec<(Direction, &Component)> {
        Direction::CARDINALS
            .into_iter()
            .filter_map(|dir| self.component_at(pos.offset(dir)).map(|c| (dir, c)))
            .collect()
    }

    // -----------------------------------------------------------------------
    // Placement
    // -----------------------------------------------------------------------

    /// Non-throwing placement predicate for hot paths.
    pub fn can_place_component_at(&self, component: &Component, pos: GridPosition) -> bool {
        self.is_within_bounds(pos)
            && component.can_be_placed()
            && self.cells.get(&pos).is_none_or(|c| c.is_empty())
    }

    /// Attach a component at a position.
    ///
    /// Fails with [`GridError::OutOfBounds`] on a bounded grid. Returns
    /// `Ok(false)` without mutation when the cell is occupied or the
    /// component refuses placement. On success, the position and its four
    /// cardinal neighbors are queued for propagation.
    pub fn place_component(
        &mut self,
        component: Component,
        pos: GridPosition,
    ) -> Result<bool, GridError> {
        self.check_bounds(pos)?;
        if !component.can_be_placed() {
            return Ok(false);
        }
        let kind = component.kind();
        let cell = self
            .cells
            .entry(pos)
            .or_insert_with(|| Cell::new(pos));
        if !cell.is_empty() {
            return Ok(false);
        }
        cell.set_component(component)?;

        self.events.emit(Event::ComponentPlaced {
            position: pos,
            kind,
        });
        self.mark_cell_for_update(pos);
        self.mark_neighbors(pos);
        Ok(true)
    }

    /// Detach and return the component at a position, queueing the cardinal
    /// neighbors for propagation.
    pub fn remove_component(&mut self, pos: GridPosition) -> Result<Option<Component>, GridError> {
        self.check_bounds(pos)?;
        let Some(cell) = self.cells.get_mut(&pos) else {
            return Ok(None);
        };
        let Some(component) = cell.take_component() else {
            return Ok(None);
        };
        self.events.emit(Event::ComponentRemoved {
            position: pos,
            kind: component.kind(),
        });
        self.mark_neighbors(pos);
        Ok(Some(component))
    }

    /// Remove every component, destroy all cells, and empty the dirty set.
    /// Bounded grids re-materialize their in-bounds cells.
    pub fn clear(&mut self) {
        let mut removed = 0;
        let occupied: Vec<GridPosition> = self
            .cells
            .iter()
            .filter(|(_, cell)| !cell.is_empty())
            .map(|(pos, _)| *pos)
            .collect();
        for pos in occupied {
            if let Some(component) = self.cells.get_mut(&pos).and_then(|c| c.take_component()) {
                removed += 1;
                self.events.emit(Event::ComponentRemoved {
                    position: pos,
                    kind: component.kind(),
                });
            }
        }
        self.cells.clear();
        if let Some(bounds) = self.bounds {
            self.cells = bounds.positions().map(|p| (p, Cell::new(p))).collect();
        }
        self.dirty.clear();
        self.events.emit(Event::GridCleared { removed });
    }

    // -----------------------------------------------------------------------
    // Interaction
    // -----------------------------------------------------------------------

    /// Toggle the switch at a position. Returns false when the position
    /// holds no switch.
    pub fn toggle_switch(&mut self, pos: GridPosition) -> bool {
        match self.component_at_mut(pos) {
            Some(Component::Switch(s)) => {
                s.toggle();
                self.mark_with_neighbors(pos);
                true
            }
            _ => false,
        }
    }

    /// Set the switch at a position directly. Idempotent; always re-queues
    /// propagation.
    pub fn set_switch(&mut self, pos: GridPosition, on: bool) -> bool {
        match self.component_at_mut(pos) {
            Some(Component::Switch(s)) => {
                s.set_state(on);
                self.mark_with_neighbors(pos);
                true
            }
            _ => false,
        }
    }

    /// Press the button at a position, re-arming its timer.
    pub fn press_button(&mut self, pos: GridPosition) -> bool {
        match self.component_at_mut(pos) {
            Some(Component::Button(b)) => {
                b.press();
                self.mark_with_neighbors(pos);
                true
            }
            _ => false,
        }
    }

    /// Flip one side of the wire at a position.
    pub fn toggle_wire_side(&mut self, pos: GridPosition, side: Direction) -> bool {
        match self.component_at_mut(pos) {
            Some(Component::Wire(w)) => {
                w.toggle_side(side);
                self.mark_with_neighbors(pos);
                true
            }
            _ => false,
        }
    }

    /// Re-enable all four sides of the wire at a position.
    pub fn reset_wire_sides(&mut self, pos: GridPosition) -> bool {
        match self.component_at_mut(pos) {
            Some(Component::Wire(w)) => {
                w.reset_sides();
                self.mark_with_neighbors(pos);
                true
            }
            _ => false,
        }
    }

    // -----------------------------------------------------------------------
    // Dirty set
    // -----------------------------------------------------------------------

    /// Queue a cell as a propagation seed. Returns false if the position
    /// has no materialized cell.
    pub fn mark_cell_for_update(&mut self, pos: GridPosition) -> bool {
        let Some(cell) = self.cells.get_mut(&pos) else {
            return false;
        };
        cell.mark_for_update();
        self.dirty.insert(pos);
        self.events.emit(Event::CellMarked { position: pos });
        true
    }

    fn mark_neighbors(&mut self, pos: GridPosition) {
        for dir in Direction::CARDINALS {
            self.mark_cell_for_update(pos.offset(dir));
        }
    }

    fn mark_with_neighbors(&mut self, pos: GridPosition) {
        self.mark_cell_for_update(pos);
        self.mark_neighbors(pos);
    }

    /// The positions queued for the next propagation phase.
    pub fn cells_to_update(&self) -> &BTreeSet<GridPosition> {
        &self.dirty
    }

    /// Drop every queued position without processing it.
    pub fn clear_update_queue(&mut self) {
        self.dirty.clear();
    }

    /// Snapshot and clear the queued positions.
    pub(crate) fn take_dirty(&mut self) -> BTreeSet<GridPosition> {
        std::mem::take(&mut self.dirty)
    }

    /// Drain the queued positions and run one component update on each,
    /// re-queueing any whose state changed. Returns the count processed.
    pub fn update_marked_cells(&mut self, dt: Seconds) -> usize {
        let pending = self.take_dirty();
        let mut processed = 0;
        for pos in pending {
            let Some(cell) = self.cells.get_mut(&pos) else {
                continue;
            };
            processed += 1;
            if cell.update(dt) {
                self.mark_cell_for_update(pos);
            }
        }
        processed
    }

    /// Apply an incoming signal to the component at a position during a
    /// propagation pass. Returns true if the stored power changed; the
    /// propagator re-queues changed cells itself.
    pub(crate) fn apply_signal(
        &mut self,
        pos: GridPosition,
        incoming: Direction,
        power: u8,
    ) -> bool {
        match self.component_at_mut(pos) {
            Some(component) => component.apply_signal(incoming, power),
            None => false,
        }
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// Linear scan for every position holding a component of the given
    /// kind. No index is maintained; propagation, not kind search, is the
    /// hot path.
    pub fn find_components_of_kind(&self, kind: ComponentKind) -> Vec<GridPosition> {
        self.cells
            .iter()
            .filter(|(_, cell)| cell.component().is_some_and(|c| c.kind() == kind))
            .map(|(pos, _)| *pos)
            .collect()
    }

    /// Iterate every placed component with its position, in coordinate order.
    pub fn components(&self) -> impl Iterator<Item = (GridPosition, &Component)> {
        self.cells
            .iter()
            .filter_map(|(pos, cell)| cell.component().map(|c| (*pos, c)))
    }

    /// Positions of every placed component, in coordinate order.
    pub fn component_positions(&self) -> Vec<GridPosition> {
        self.components().map(|(pos, _)| pos).collect()
    }

    /// Iterate every materialized cell, in coordinate order.
    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.cells.values()
    }

    /// Number of placed components.
    pub fn component_count(&self) -> usize {
        self.components().count()
    }

    /// Number of materialized cells.
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    // -----------------------------------------------------------------------
    // Events
    // -----------------------------------------------------------------------

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn events_mut(&mut self) -> &mut EventBus {
        &mut self.events
    }

    // -----------------------------------------------------------------------
    // State hash
    // -----------------------------------------------------------------------

    /// Deterministic hash of the durable circuit state: bounds plus every
    /// placed component. Transient dirty flags are excluded so idempotent
    /// re-propagation hashes equal.
    pub fn state_hash(&self) -> u64 {
        let mut hash = StateHash::new();
        match self.bounds {
            Some(b) => {
                hash.write_u8(1);
                hash.write_u64(b.width as u64);
                hash.write_u64(b.height as u64);
            }
            None => hash.write_u8(0),
        }
        for (pos, component) in self.components() {
            hash.write_i32(pos.x);
            hash.write_i32(pos.y);
            component.write_state(&mut hash);
        }
        hash.finish()
    }
}

// ===========================================================================
// Tests
// ===========================================================================
