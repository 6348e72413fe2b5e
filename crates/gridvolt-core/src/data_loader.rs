//! Data-driven circuit loading from JSON.
//!
//! Feature-gated behind `data-loader`. Provides a JSON binding over the
//! [`GridData`](crate::serialize::GridData) shape so hosts and tests can
//! keep circuit layouts in data files.

use crate::grid::Grid;
use crate::registry::ComponentRegistry;
use crate::serialize::{GridData, SnapshotError, grid_from_data, grid_to_data};

/// Errors that can occur while loading a circuit from JSON.
#[derive(Debug, thiserror::Error)]
pub enum DataLoadError {
    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),
    #[error("snapshot error: {0}")]
    Snapshot(#[from] SnapshotError),
}

/// Parse a JSON circuit description into a populated grid.
pub fn grid_from_json(json: &str, registry: &ComponentRegistry) -> Result<Grid, DataLoadError> {
    let data: GridData = serde_json::from_str(json)?;
    Ok(grid_from_data(&data, registry)?)
}

/// Serialize a grid to a pretty-printed JSON circuit description.
pub fn grid_to_json(grid: &Grid) -> Result<String, DataLoadError> {
    Ok(serde_json::to_string_pretty(&grid_to_data(grid))?)
}

// ===========================================================================
// Tests
// ===========================================================================
