use serde::{Deserialize, Serialize};

pub mod conditions;
pub mod config;
pub mod error;
pub mod loader;
pub mod map;
pub mod movement;
pub mod placement;
pub mod player;
pub mod session;
pub mod tile;

pub use conditions::{Condition, Conditions, InventoryMatch};
pub use config::{LoaderConfig, RulesConfig};
pub use error::{CatalogError, LoadError, MapError, PlacementError, SessionError};
pub use loader::{LoadedMap, MapLoader, SymbolDocument, SymbolSpec};
pub use map::{Grid, LabyrinthMap};
pub use movement::MoveOutcome;
pub use player::{Inventory, PlayerState};
pub use session::{MapCell, Outcome, Session};
pub use tile::{Tile, TileCatalog, TileType};

/// Represents a zero-based (row, column) coordinate, counted from the top-left
/// corner of the source map text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Applies a delta to this position.
    ///
    /// Stepping above row 0 or left of column 0 wraps to a huge index, which every
    /// bounds check rejects.
    #[inline]
    pub fn offset(self, delta: Delta) -> Position {
        Position {
            row: self.row.wrapping_add_signed(delta.row),
            col: self.col.wrapping_add_signed(delta.col),
        }
    }
}

/// The four cardinal directions a player can move in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Unit delta for this direction.
    pub const fn delta(self) -> Delta {
        match self {
            Direction::Up => Delta { row: -1, col: 0 },
            Direction::Down => Delta { row: 1, col: 0 },
            Direction::Left => Delta { row: 0, col: -1 },
            Direction::Right => Delta { row: 0, col: 1 },
        }
    }
}

/// A signed row/column step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Delta {
    pub row: isize,
    pub col: isize,
}

impl Delta {
    pub const ZERO: Delta = Delta { row: 0, col: 0 };

    pub fn is_zero(self) -> bool {
        self == Delta::ZERO
    }
}

/// Represents actions a driving collaborator can request for one turn.
///
/// Input that does not map to a direction should become [`Action::Wait`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    Wait,
    Move(Direction),
}

impl From<Option<Direction>> for Action {
    fn from(direction: Option<Direction>) -> Self {
        direction.map_or(Action::Wait, Action::Move)
    }
}
