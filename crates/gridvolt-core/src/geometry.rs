//! Grid geometry: positions, directions, bounds, and wire side sets.
//!
//! Everything here is pure data with pure operations. Connectivity between
//! components only ever uses the four cardinal directions; the diagonal
//! directions exist for presentation layers (selection halos, adjacency
//! highlighting) and never carry signal.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// GridPosition
// ---------------------------------------------------------------------------

/// A position on the 2D grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridPosition {
    pub x: i32,
    pub y: i32,
}

impl GridPosition {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The adjacent position one step in the given direction.
    pub fn offset(&self, dir: Direction) -> GridPosition {
        let (dx, dy) = dir.offset();
        GridPosition::new(self.x + dx, self.y + dy)
    }

    /// Manhattan distance to another position.
    pub fn manhattan_distance(&self, other: &GridPosition) -> u32 {
        (self.x - other.x).unsigned_abs() + (self.y - other.y).unsigned_abs()
    }

    /// Chebyshev (chessboard) distance to another position.
    pub fn chebyshev_distance(&self, other: &GridPosition) -> u32 {
        (self.x - other.x)
            .unsigned_abs()
            .max((self.y - other.y).unsigned_abs())
    }
}

// ---------------------------------------------------------------------------
// Direction
// ---------------------------------------------------------------------------

/// Eight-way direction. Signal connectivity uses only the cardinal subset
/// ([`Direction::CARDINALS`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Direction {
    North,
    NorthEast,
    East,
    SouthEast,
    South,
    SouthWest,
    West,
    NorthWest,
}

impl Direction {
    /// The four cardinal directions, in clockwise order from North.
    pub const CARDINALS: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    /// All eight directions, in clockwise order from North.
    pub fn all() -> [Direction; 8] {
        [
            Direction::North,
            Direction::NorthEast,
            Direction::East,
            Direction::SouthEast,
            Direction::South,
            Direction::SouthWest,
            Direction::West,
            Direction::NorthWest,
        ]
    }

    /// Whether this is one of the four cardinal directions.
    pub fn is_cardinal(self) -> bool {
        matches!(
            self,
            Direction::North | Direction::East | Direction::South | Direction::West
        )
    }

    /// The opposite direction (180 degrees).
    pub fn opposite(self) -> Direction {
        match self {
            Direction::North => Direction::South,
            Direction::NorthEast => Direction::SouthWest,
            Direction::East => Direction::West,
            Direction::SouthEast => Direction::NorthWest,
            Direction::South => Direction::North,
            Direction::SouthWest => Direction::NorthEast,
            Direction::West => Direction::East,
            Direction::NorthWest => Direction::SouthEast,
        }
    }

    /// Rotate one step (45 degrees) clockwise.
    pub fn rotate_cw(self) -> Direction {
        match self {
            Direction::North => Direction::NorthEast,
            Direction::NorthEast => Direction::East,
            Direction::East => Direction::SouthEast,
            Direction::SouthEast => Direction::South,
            Direction::South => Direction::SouthWest,
            Direction::SouthWest => Direction::West,
            Direction::West => Direction::NorthWest,
            Direction::NorthWest => Direction::North,
        }
    }

    /// Rotate one step (45 degrees) counter-clockwise.
    pub fn rotate_ccw(self) -> Direction {
        match self {
            Direction::North => Direction::NorthWest,
            Direction::NorthWest => Direction::West,
            Direction::West => Direction::SouthWest,
            Direction::SouthWest => Direction::South,
            Direction::South => Direction::SouthEast,
            Direction::SouthEast => Direction::East,
            Direction::East => Direction::NorthEast,
            Direction::NorthEast => Direction::North,
        }
    }

    /// Unit-vector offset for this direction. North is negative y.
    pub fn offset(&self) -> (i32, i32) {
        match self {
            Direction::North => (0, -1),
            Direction::NorthEast => (1, -1),
            Direction::East => (1, 0),
            Direction::SouthEast => (1, 1),
            Direction::South => (0, 1),
            Direction::SouthWest => (-1, 1),
            Direction::West => (-1, 0),
            Direction::NorthWest => (-1, -1),
        }
    }

    /// Stable lowercase name, used by the serialization DTOs.
    pub fn name(&self) -> &'static str {
        match self {
            Direction::North => "north",
            Direction::NorthEast => "northeast",
            Direction::East => "east",
            Direction::SouthEast => "southeast",
            Direction::South => "south",
            Direction::SouthWest => "southwest",
            Direction::West => "west",
            Direction::NorthWest => "northwest",
        }
    }

    /// Parse a direction from its stable name.
    pub fn from_name(name: &str) -> Option<Direction> {
        Direction::all().into_iter().find(|d| d.name() == name)
    }
}

// ---------------------------------------------------------------------------
// Bounds
// ---------------------------------------------------------------------------

/// Dimensions of a bounded grid. Valid coordinates are
/// `0 <= x < width, 0 <= y < height`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bounds {
    pub width: u32,
    pub height: u32,
}

impl Bounds {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Whether the position lies inside these bounds.
    pub fn contains(&self, pos: GridPosition) -> bool {
        pos.x >= 0 && pos.y >= 0 && (pos.x as u32) < self.width && (pos.y as u32) < self.height
    }

    /// Iterate over every position inside the bounds, row-major.
    pub fn positions(&self) -> impl Iterator<Item = GridPosition> {
        let w = self.width as i32;
        let h = self.height as i32;
        (0..h).flat_map(move |y| (0..w).map(move |x| GridPosition::new(x, y)))
    }
}

// ---------------------------------------------------------------------------
// SideSet
// ---------------------------------------------------------------------------

/// A per-cardinal-direction enabled map, used by wires to sculpt which
/// sides may carry signal. Diagonal directions are never members.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SideSet {
    north: bool,
    east: bool,
    south: bool,
    west: bool,
}

impl SideSet {
    /// All four sides enabled.
    pub fn all() -> Self {
        Self {
            north: true,
            east: true,
            south: true,
            west: true,
        }
    }

    /// No sides enabled.
    pub fn none() -> Self {
        Self {
            north: false,
            east: false,
            south: false,
            west: false,
        }
    }

    /// Whether the given side is enabled. Diagonals are always disabled.
    pub fn enabled(&self, dir: Direction) -> bool {
        match dir {
            Direction::North => self.north,
            Direction::East => self.east,
            Direction::South => self.south,
            Direction::West => self.west,
            _ => false,
        }
    }

    /// Enable or disable a side. No-op for diagonals.
    pub fn set(&mut self, dir: Direction, enabled: bool) {
        match dir {
            Direction::North => self.north = enabled,
            Direction::East => self.east = enabled,
            Direction::South => self.south = enabled,
            Direction::West => self.west = enabled,
            _ => {}
        }
    }

    /// Flip a side. No-op for diagonals.
    pub fn toggle(&mut self, dir: Direction) {
        if dir.is_cardinal() {
            self.set(dir, !self.enabled(dir));
        }
    }

    /// The enabled sides, in the order of [`Direction::CARDINALS`].
    pub fn directions(&self) -> Vec<Direction> {
        Direction::CARDINALS
            .into_iter()
            .filter(|&d| self.enabled(d))
            .collect()
    }

    /// Packed representation for hashing: one bit per cardinal.
    pub fn bits(&self) -> u8 {
        (self.north as u8) | (self.east as u8) << 1 | (self.south as u8) << 2 | (self.west as u8) << 3
    }
}

impl Default for SideSet {
    fn default() -> Self {
        Self::all()
    }
}

// ===========================================================================
// Tests
// ===========================================================================
