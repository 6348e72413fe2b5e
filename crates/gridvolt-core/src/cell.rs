//! A single addressable grid slot.
//!
//! A cell owns at most one component and a "needs update" flag. Identity is
//! the coordinate: cells hash and compare by position only, so they can key
//! maps and sets regardless of their contents.

use crate::component::Component;
use crate::error::GridError;
use crate::geometry::GridPosition;
use crate::time::Seconds;

/// One slot on the grid.
#[derive(Debug, Clone)]
pub struct Cell {
    position: GridPosition,
    component: Option<Component>,
    dirty: bool,
}

impl Cell {
    /// Create an empty cell at the given position.
    pub fn new(position: GridPosition) -> Self {
        Self {
            position,
            component: None,
            dirty: false,
        }
    }

    pub fn position(&self) -> GridPosition {
        self.position
    }

    pub fn component(&self) -> Option<&Component> {
        self.component.as_ref()
    }

    pub fn component_mut(&mut self) -> Option<&mut Component> {
        self.component.as_mut()
    }

    pub fn is_empty(&self) -> bool {
        self.component.is_none()
    }

    /// Whether this cell is flagged as needing an update.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Flag this cell as needing an update. The owning grid mirrors the
    /// flag into its pending set.
    pub fn mark_for_update(&mut self) {
        self.dirty = true;
    }

    /// Attach a component, detaching and returning any previous occupant.
    ///
    /// Fails with [`GridError::InvalidPlacement`] if the component refuses
    /// this cell; the cell is left untouched in that case.
    pub fn set_component(&mut self, component: Component) -> Result<Option<Component>, GridError> {
        if !component.can_be_placed() {
            return Err(GridError::InvalidPlacement {
                position: self.position,
            });
        }
        Ok(self.component.replace(component))
    }

    /// Detach and return the component, if any.
    pub fn take_component(&mut self) -> Option<Component> {
        self.component.take()
    }

    /// Forward one tick to the component and clear the dirty flag.
    /// Returns true when the component's observable state changed.
    pub fn update(&mut self, dt: Seconds) -> bool {
        self.dirty = false;
        match &mut self.component {
            Some(c) => c.update(dt),
            None => false,
        }
    }
}

// Identity is the coordinate.
impl PartialEq for Cell {
    fn eq(&self, other: &Self) -> bool {
        self.position == other.position
    }
}

impl Eq for Cell {}

impl std::hash::Hash for Cell {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.position.hash(state);
    }
}

// ===========================================================================
// Tests
// ===========================================================================
