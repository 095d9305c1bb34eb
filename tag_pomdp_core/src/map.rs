use std::ops::{Index, RangeInclusive};
use std::str::FromStr;

use log::debug;

use crate::{
    CellIndex, Position,
    action::{Action, Direction},
    error::{IndexKind, TagError},
};

/// A generic 2D grid structure.
///
/// Stores elements of type `T` in a flat vector using row-major order.
/// Elements are addressed by `(row, col)` through [`Position`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid<T> {
    rows: usize,
    cols: usize,
    cells: Vec<T>,
}

impl<T> Grid<T> {
    /// Creates a new grid with the specified dimensions, filled by a generator function.
    ///
    /// The generator is called once per cell in row-major order with `(row, col)`.
    pub fn from_generator<F>(rows: usize, cols: usize, mut f: F) -> Self
    where
        F: FnMut(usize, usize) -> T,
    {
        let mut cells = Vec::with_capacity(rows * cols);
        for row in 0..rows {
            for col in 0..cols {
                cells.push(f(row, col));
            }
        }
        Grid { rows, cols, cells }
    }

    /// Returns the number of rows of the grid.
    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Returns the number of columns of the grid.
    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Converts a position to a flat vector index.
    ///
    /// Returns `None` if the position is out of bounds.
    #[inline]
    pub fn position_to_index(&self, position: Position) -> Option<usize> {
        if self.is_valid(position) {
            Some(position.row * self.cols + position.col)
        } else {
            None
        }
    }

    /// Checks if the given position lies within the grid boundaries.
    #[inline]
    pub fn is_valid(&self, position: Position) -> bool {
        position.row < self.rows && position.col < self.cols
    }

    /// Gets a reference to the cell at the given position.
    ///
    /// Returns `None` if the position is out of bounds.
    pub fn get(&self, position: Position) -> Option<&T> {
        self.position_to_index(position)
            .and_then(|index| self.cells.get(index))
    }

    /// Returns an iterator that yields `(Position, &T)` for each cell in row-major order.
    pub fn enumerate(&self) -> impl Iterator<Item = (Position, &T)> {
        let cols = self.cols;
        self.cells.iter().enumerate().map(move |(index, cell)| {
            (
                Position {
                    row: index / cols,
                    col: index % cols,
                },
                cell,
            )
        })
    }
}

/// Indexing using Position coordinates for access
impl<T> Index<Position> for Grid<T> {
    type Output = T;

    #[inline]
    fn index(&self, position: Position) -> &Self::Output {
        match self.position_to_index(position) {
            Some(idx) => &self.cells[idx],
            None => panic!(
                "Grid index ({}, {}) out of bounds for grid size ({}, {})",
                position.row, position.col, self.rows, self.cols
            ),
        }
    }
}

/// The navigable graph of open cells parsed from an ASCII map.
///
/// Open cells are numbered `1..=N` in row-major order. Every cell stores up to
/// four outgoing edges, one per [`Direction`], present only when the adjacent
/// grid square in that direction is open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapGraph {
    /// Coordinate to cell index table; walls map to `None`.
    lookup: Grid<Option<CellIndex>>,
    /// Cell index to coordinate table, offset by one.
    positions: Vec<Position>,
    /// Outgoing edges per cell, slotted by direction.
    edges: Vec<[Option<CellIndex>; 4]>,
}

impl MapGraph {
    /// Parses a map of `x` (wall) and `o` (open) characters.
    ///
    /// Leading and trailing whitespace is trimmed from the whole string and from
    /// each row before validation.
    pub fn build(map_str: &str) -> Result<Self, TagError> {
        let lines: Vec<&str> = map_str.trim().lines().map(str::trim).collect();
        let Some(first) = lines.first() else {
            return Err(TagError::EmptyMap);
        };

        let rows = lines.len();
        let cols = first.chars().count();
        let mut open = Vec::with_capacity(rows * cols);

        for (row, line) in lines.iter().enumerate() {
            let found = line.chars().count();
            if found != cols {
                return Err(TagError::MalformedRowWidth {
                    row,
                    expected: cols,
                    found,
                });
            }
            for (col, ch) in line.chars().enumerate() {
                match ch {
                    'o' => open.push(true),
                    'x' => open.push(false),
                    found => return Err(TagError::MalformedCharacter { row, col, found }),
                }
            }
        }

        let mut positions = Vec::new();
        let lookup = Grid::from_generator(rows, cols, |row, col| {
            if open[row * cols + col] {
                positions.push(Position { row, col });
                Some(positions.len())
            } else {
                None
            }
        });

        if positions.is_empty() {
            return Err(TagError::EmptyMap);
        }

        let edges = positions
            .iter()
            .map(|&position| {
                let mut slots = [None; 4];
                for direction in Direction::ALL {
                    slots[direction.slot()] = position
                        .step(direction)
                        .and_then(|next| lookup.get(next).copied().flatten());
                }
                slots
            })
            .collect();

        debug!(
            "Parsed {}x{} map with {} open cells",
            rows,
            cols,
            positions.len()
        );

        Ok(MapGraph {
            lookup,
            positions,
            edges,
        })
    }

    /// Returns the number of open cells, `N`.
    #[inline]
    pub fn num_cells(&self) -> usize {
        self.positions.len()
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.lookup.rows()
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.lookup.cols()
    }

    /// Iterates over every cell index.
    pub fn cells(&self) -> RangeInclusive<CellIndex> {
        1..=self.num_cells()
    }

    #[inline]
    pub fn contains(&self, cell: CellIndex) -> bool {
        (1..=self.num_cells()).contains(&cell)
    }

    /// Fails with `IndexOutOfRange` unless `cell` names an open cell.
    pub fn check_cell(&self, cell: CellIndex) -> Result<(), TagError> {
        if self.contains(cell) {
            Ok(())
        } else {
            Err(TagError::IndexOutOfRange {
                kind: IndexKind::Cell,
                index: cell,
                max: self.num_cells(),
            })
        }
    }

    /// Returns the grid coordinates of a cell.
    pub fn position(&self, cell: CellIndex) -> Option<Position> {
        cell.checked_sub(1)
            .and_then(|slot| self.positions.get(slot))
            .copied()
    }

    /// Returns the cell at the given coordinates, or `None` for walls and
    /// out-of-bounds positions.
    pub fn index_at(&self, position: Position) -> Option<CellIndex> {
        self.lookup.get(position).copied().flatten()
    }

    /// Follows the edge labeled `direction` out of `cell`.
    pub fn neighbor(&self, cell: CellIndex, direction: Direction) -> Option<CellIndex> {
        cell.checked_sub(1)
            .and_then(|slot| self.edges.get(slot))
            .and_then(|slots| slots[direction.slot()])
    }

    /// Returns every outgoing edge of `cell` with its direction label.
    pub fn neighbors(&self, cell: CellIndex) -> impl Iterator<Item = (Direction, CellIndex)> + '_ {
        Direction::ALL
            .into_iter()
            .filter_map(move |direction| Some((direction, self.neighbor(cell, direction)?)))
    }

    /// Applies a deterministic agent move.
    ///
    /// Moving into a wall or off the grid leaves the agent in place, and `Tag`
    /// never changes position.
    pub fn move_from(&self, cell: CellIndex, action: Action) -> CellIndex {
        action
            .direction()
            .and_then(|direction| self.neighbor(cell, direction))
            .unwrap_or(cell)
    }

    /// Regenerates the ASCII map from the coordinate tables.
    ///
    /// Mapped coordinates render as `o`, everything else as `x`. Rows are
    /// separated by `\n` with no trailing newline.
    pub fn render(&self) -> String {
        let mut out = String::with_capacity(self.rows() * (self.cols() + 1));
        for (position, cell) in self.lookup.enumerate() {
            if position.col == 0 && position.row > 0 {
                out.push('\n');
            }
            out.push(if cell.is_some() { 'o' } else { 'x' });
        }
        out
    }
}

impl FromStr for MapGraph {
    type Err = TagError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MapGraph::build(s)
    }
}
