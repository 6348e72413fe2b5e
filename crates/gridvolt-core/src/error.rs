//! Error taxonomy for grid mutations.
//!
//! Mutations validate eagerly and fail synchronously; nothing is retried
//! internally. Hot paths should pre-check with the non-throwing predicates
//! (`Grid::is_within_bounds`, `Grid::can_place_component_at`) instead of
//! driving control flow through these errors.

use crate::geometry::{Bounds, GridPosition};

/// Errors from grid and cell mutations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GridError {
    /// The component refused placement (`can_be_placed_in` returned false).
    #[error("component refused placement at ({}, {})", .position.x, .position.y)]
    InvalidPlacement { position: GridPosition },

    /// The coordinate lies outside a bounded grid's dimensions.
    #[error("position ({}, {}) outside {}x{} grid", .position.x, .position.y, .bounds.width, .bounds.height)]
    OutOfBounds { position: GridPosition, bounds: Bounds },

    /// Grid construction or resize with a dimension below 1.
    #[error("invalid grid dimensions {width}x{height}: both must be >= 1")]
    InvalidDimension { width: u32, height: u32 },
}
