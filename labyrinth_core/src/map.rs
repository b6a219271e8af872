use std::{
    collections::BTreeSet,
    ops::Index,
};

use serde::{Deserialize, Serialize};

use crate::{Position, error::MapError, tile::Tile};

/// A generic 2D grid structure.
///
/// Stores elements of type `T` in a flat vector using row-major order.
/// Provides methods for accessing and modifying elements via [`Position`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid<T> {
    width: usize,
    height: usize,
    cells: Vec<T>,
}

impl<T> Grid<T> {
    /// Creates a new grid with the specified dimensions, filled by a generator function.
    ///
    /// The generator function `f` takes a [`Position`] and returns the value for that cell.
    ///
    /// # Panics
    ///
    /// Panics if `width * height` overflows `usize`.
    pub fn from_generator<F>(width: usize, height: usize, mut f: F) -> Self
    where
        F: FnMut(Position) -> T,
    {
        let size = width.checked_mul(height).expect("Grid size overflow");
        let mut cells = Vec::with_capacity(size);
        for row in 0..height {
            for col in 0..width {
                cells.push(f(Position { row, col }));
            }
        }
        Grid {
            width,
            height,
            cells,
        }
    }

    /// Returns the number of columns.
    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the number of rows.
    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Converts a position to a flat vector index.
    ///
    /// Returns `None` if the position is out of bounds.
    #[inline]
    pub fn position_to_index(&self, position: Position) -> Option<usize> {
        if self.is_valid(position) {
            Some(position.row * self.width + position.col)
        } else {
            None
        }
    }

    /// Checks if the given position is within the grid boundaries.
    #[inline]
    pub fn is_valid(&self, position: Position) -> bool {
        position.col < self.width && position.row < self.height
    }

    /// Gets an immutable reference to the cell at the given position.
    ///
    /// Returns `None` if the position is out of bounds.
    pub fn get(&self, position: Position) -> Option<&T> {
        let index = self.position_to_index(position)?;
        self.cells.get(index)
    }

    /// Gets a mutable reference to the cell at the given position.
    ///
    /// Returns `None` if the position is out of bounds.
    pub fn get_mut(&mut self, position: Position) -> Option<&mut T> {
        let index = self.position_to_index(position)?;
        self.cells.get_mut(index)
    }

    /// Returns an iterator that yields `(Position, &T)` for each cell in row-major order.
    pub fn enumerate(&self) -> impl Iterator<Item = (Position, &T)> {
        let width = self.width;
        self.cells.iter().enumerate().map(move |(index, cell)| {
            let position = Position {
                row: index / width,
                col: index % width,
            };
            (position, cell)
        })
    }
}

impl<T> Index<Position> for Grid<T> {
    type Output = T;

    #[inline]
    fn index(&self, position: Position) -> &Self::Output {
        match self.position_to_index(position) {
            Some(idx) => &self.cells[idx],
            None => panic!(
                "Grid index ({}, {}) out of bounds for grid size ({}, {})",
                position.row, position.col, self.height, self.width
            ),
        }
    }
}

/// The tiles of one labyrinth, indexed by position.
///
/// Rows shorter than the widest row leave empty slots at their end; those slots
/// are inside the bounds but hold no tile, and behave like walls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabyrinthMap {
    tiles: Grid<Option<Tile>>,
}

impl LabyrinthMap {
    /// Builds a map from parsed rows of tiles.
    pub fn from_rows(rows: Vec<Vec<Tile>>) -> Self {
        let height = rows.len();
        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        let mut rows: Vec<_> = rows.into_iter().map(Vec::into_iter).collect();
        let tiles = Grid::from_generator(width, height, |position| rows[position.row].next());
        LabyrinthMap { tiles }
    }

    /// Index of the last row, 0 for an empty map.
    pub fn max_row_index(&self) -> usize {
        self.tiles.height().saturating_sub(1)
    }

    pub fn row_count(&self) -> usize {
        self.tiles.height()
    }

    /// Width of the widest row, i.e. one past the last tile column.
    ///
    /// This is the slot a row's line break occupied in the source text, so valid
    /// columns are strictly below it.
    pub fn max_col_index(&self) -> usize {
        self.tiles.width()
    }

    pub fn is_on_map(&self, position: Position) -> bool {
        self.tiles.is_valid(position)
    }

    pub fn tile(&self, position: Position) -> Option<&Tile> {
        self.tiles.get(position)?.as_ref()
    }

    /// Puts `tile` at `position`, returning the tile it replaced.
    ///
    /// Positions outside the map are left untouched and yield `None`.
    pub fn replace(&mut self, position: Position, tile: Tile) -> Option<Tile> {
        self.tiles.get_mut(position)?.replace(tile)
    }

    pub fn is_walkable(&self, position: Position) -> bool {
        self.tile(position).is_some_and(Tile::is_walkable)
    }

    pub fn is_pickable(&self, position: Position) -> bool {
        self.tile(position).is_some_and(Tile::is_pickable)
    }

    pub fn is_exit(&self, position: Position) -> bool {
        self.tile(position).is_some_and(Tile::is_exit)
    }

    /// Iterates over every tile with its position, in row-major order.
    pub fn tiles(&self) -> impl Iterator<Item = (Position, &Tile)> {
        self.tiles
            .enumerate()
            .filter_map(|(position, tile)| tile.as_ref().map(|tile| (position, tile)))
    }

    fn positions_where(&self, predicate: impl Fn(&Tile) -> bool) -> Vec<Position> {
        self.tiles()
            .filter(|&(_, tile)| predicate(tile))
            .map(|(position, _)| position)
            .collect()
    }

    /// The unique start position.
    pub fn start_position(&self) -> Result<Position, MapError> {
        match self.positions_where(Tile::is_start).as_slice() {
            [] => Err(MapError::MissingStart),
            [start] => Ok(*start),
            starts => Err(MapError::MultipleStarts(starts.len())),
        }
    }

    /// Every exit position, in row-major order.
    pub fn exit_positions(&self) -> Result<Vec<Position>, MapError> {
        let exits = self.positions_where(Tile::is_exit);
        if exits.is_empty() {
            return Err(MapError::MissingExit);
        }
        Ok(exits)
    }

    pub fn pickable_tile_positions(&self) -> Vec<Position> {
        self.positions_where(Tile::is_pickable)
    }

    /// Positions eligible for random placement: walkable, neither start nor
    /// exit, and not already holding an item.
    pub fn free_positions(&self) -> Vec<Position> {
        self.positions_where(|tile| {
            tile.is_walkable() && !tile.is_special() && !tile.is_pickable()
        })
    }

    /// Every symbol currently displayed on the map.
    pub fn used_symbols(&self) -> BTreeSet<char> {
        self.tiles().map(|(_, tile)| tile.symbol).collect()
    }

    /// Checks the structural invariants: exactly one start, at least one exit.
    pub fn validate(&self) -> Result<(), MapError> {
        self.start_position()?;
        self.exit_positions()?;
        Ok(())
    }
}
