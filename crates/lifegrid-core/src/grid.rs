//! The toroidal binary grid.
//!
//! A [`Grid`] is a square `N x N` matrix of [`Cell`] values stored in
//! row-major order. Adjacency wraps in both dimensions, so row/column 0
//! neighbors row/column `N - 1`. The grid is replaced wholesale each step;
//! nothing in this crate writes to a grid that is also being read.

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Largest supported side length. Keeps `N * N` and every derived count
/// comfortably inside `u32`.
pub const MAX_GRID_SIZE: usize = 4096;

/// Errors that can occur when building or addressing a grid.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GridError {
    /// The side length is zero or above [`MAX_GRID_SIZE`].
    #[error("invalid grid size {size}: must be in 1..={max}")]
    InvalidSize {
        /// The rejected side length.
        size: usize,
        /// The largest accepted side length.
        max: usize,
    },

    /// The flat cell buffer does not hold `size * size` cells.
    #[error("cell count mismatch: expected {expected}, got {actual}")]
    CellCountMismatch {
        /// Number of cells a square grid of this size needs.
        expected: usize,
        /// Number of cells supplied.
        actual: usize,
    },

    /// A row passed to [`Grid::from_rows`] has the wrong length.
    #[error("row {row} has {len} cells, expected {expected}")]
    NotSquare {
        /// Index of the offending row.
        row: usize,
        /// Its length.
        len: usize,
        /// The required length (number of rows).
        expected: usize,
    },

    /// A raw cell value other than 0 or 1.
    #[error("cell ({row}, {col}) has value {value}, expected 0 or 1")]
    InvalidCellValue {
        /// Row of the offending cell.
        row: usize,
        /// Column of the offending cell.
        col: usize,
        /// The rejected value.
        value: u8,
    },

    /// Coordinates outside the grid.
    #[error("cell ({row}, {col}) is outside a {size}x{size} grid")]
    OutOfBounds {
        /// Requested row.
        row: usize,
        /// Requested column.
        col: usize,
        /// Grid side length.
        size: usize,
    },
}

/// State of a single cell.
///
/// Serializes as the bit `0` or `1` so snapshots stay compact for
/// renderers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Cell {
    /// Dead (0).
    #[default]
    Dead,
    /// Alive (1).
    Alive,
}

impl Cell {
    /// Convert a raw bit into a cell. Returns `None` for anything but 0 or 1.
    pub const fn from_bit(bit: u8) -> Option<Self> {
        match bit {
            0 => Some(Self::Dead),
            1 => Some(Self::Alive),
            _ => None,
        }
    }

    /// The cell as a bit (`0` dead, `1` alive).
    pub const fn as_u8(self) -> u8 {
        match self {
            Self::Dead => 0,
            Self::Alive => 1,
        }
    }

    /// Whether the cell is alive.
    pub const fn is_alive(self) -> bool {
        matches!(self, Self::Alive)
    }

    /// `1 - self`.
    #[must_use]
    pub const fn complement(self) -> Self {
        match self {
            Self::Dead => Self::Alive,
            Self::Alive => Self::Dead,
        }
    }
}

impl From<Cell> for u8 {
    fn from(cell: Cell) -> Self {
        cell.as_u8()
    }
}

impl TryFrom<u8> for Cell {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::from_bit(value).ok_or_else(|| format!("cell value {value} is not 0 or 1"))
    }
}

/// Serialized form of a grid, validated on the way in.
#[derive(Deserialize)]
struct RawGrid {
    size: usize,
    cells: Vec<Cell>,
}

impl TryFrom<RawGrid> for Grid {
    type Error = GridError;

    fn try_from(raw: RawGrid) -> Result<Self, Self::Error> {
        Self::from_cells(raw.size, raw.cells)
    }
}

/// A square toroidal grid of cells in row-major order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawGrid")]
pub struct Grid {
    /// Side length `N`.
    size: usize,
    /// `N * N` cells, row-major.
    cells: Vec<Cell>,
}

impl Grid {
    /// An all-dead grid.
    pub fn dead(size: usize) -> Result<Self, GridError> {
        Self::filled(size, Cell::Dead)
    }

    /// A grid with every cell set to `cell`.
    pub fn filled(size: usize, cell: Cell) -> Result<Self, GridError> {
        let count = cell_count(size)?;
        Ok(Self {
            size,
            cells: vec![cell; count],
        })
    }

    /// Build a grid from a flat row-major buffer.
    pub fn from_cells(size: usize, cells: Vec<Cell>) -> Result<Self, GridError> {
        let expected = cell_count(size)?;
        if cells.len() != expected {
            return Err(GridError::CellCountMismatch {
                expected,
                actual: cells.len(),
            });
        }
        Ok(Self { size, cells })
    }

    /// Build a grid from rows of raw bits (`0` or `1`).
    ///
    /// The number of rows sets the side length; every row must have the
    /// same length.
    pub fn from_rows<R: AsRef<[u8]>>(rows: &[R]) -> Result<Self, GridError> {
        let size = rows.len();
        let expected = cell_count(size)?;
        let mut cells = Vec::with_capacity(expected);

        for (row, bits) in rows.iter().enumerate() {
            let bits = bits.as_ref();
            if bits.len() != size {
                return Err(GridError::NotSquare {
                    row,
                    len: bits.len(),
                    expected: size,
                });
            }
            for (col, &value) in bits.iter().enumerate() {
                let cell =
                    Cell::from_bit(value).ok_or(GridError::InvalidCellValue { row, col, value })?;
                cells.push(cell);
            }
        }

        Ok(Self { size, cells })
    }

    /// Sample a grid where each cell is independently alive with
    /// probability `live_probability`.
    ///
    /// Exactly one uniform draw is taken per cell, in raster order.
    pub fn random<R: Rng>(
        size: usize,
        live_probability: f64,
        rng: &mut R,
    ) -> Result<Self, GridError> {
        let count = cell_count(size)?;
        let cells = (0..count)
            .map(|_| {
                if rng.random::<f64>() < live_probability {
                    Cell::Alive
                } else {
                    Cell::Dead
                }
            })
            .collect();
        Ok(Self { size, cells })
    }

    /// Side length `N`.
    pub const fn size(&self) -> usize {
        self.size
    }

    /// Total number of cells (`N * N`).
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// All cells, row-major.
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub(crate) fn cells_mut(&mut self) -> &mut [Cell] {
        &mut self.cells
    }

    /// The cell at `(row, col)`, or `None` when out of bounds.
    pub fn get(&self, row: usize, col: usize) -> Option<Cell> {
        let idx = self.index_of(row, col)?;
        self.cells.get(idx).copied()
    }

    /// The cell at signed coordinates, wrapped onto the torus.
    pub fn get_wrapped(&self, row: i64, col: i64) -> Cell {
        let Ok(n) = i64::try_from(self.size) else {
            return Cell::Dead;
        };
        let wrap = |v: i64| {
            v.checked_rem_euclid(n)
                .and_then(|w| usize::try_from(w).ok())
                .unwrap_or(0)
        };
        self.get(wrap(row), wrap(col)).unwrap_or_default()
    }

    /// Overwrite the cell at `(row, col)`.
    pub fn set(&mut self, row: usize, col: usize, cell: Cell) -> Result<(), GridError> {
        let size = self.size;
        let slot = self
            .index_of(row, col)
            .and_then(|idx| self.cells.get_mut(idx))
            .ok_or(GridError::OutOfBounds { row, col, size })?;
        *slot = cell;
        Ok(())
    }

    /// One row as a slice, or `None` when out of bounds.
    pub fn row(&self, row: usize) -> Option<&[Cell]> {
        self.rows().nth(row)
    }

    /// Iterate over rows.
    pub fn rows(&self) -> std::slice::ChunksExact<'_, Cell> {
        self.cells.chunks_exact(self.size.max(1))
    }

    /// Number of live cells.
    pub fn population(&self) -> usize {
        self.cells.iter().filter(|c| c.is_alive()).count()
    }

    /// Fraction of cells that are alive, in `[0, 1]`.
    pub fn density(&self) -> f64 {
        let total = self.cells.len();
        if total == 0 {
            return 0.0;
        }
        // Both counts are bounded by MAX_GRID_SIZE^2 and exact in f64.
        #[allow(clippy::cast_precision_loss)]
        let ratio = self.population() as f64 / total as f64;
        ratio
    }

    /// Row-major index of `(row, col)`, or `None` when out of bounds.
    fn index_of(&self, row: usize, col: usize) -> Option<usize> {
        if row >= self.size || col >= self.size {
            return None;
        }
        row.checked_mul(self.size)?.checked_add(col)
    }
}

/// `size * size`, validating the side length.
pub(crate) fn cell_count(size: usize) -> Result<usize, GridError> {
    if size == 0 || size > MAX_GRID_SIZE {
        return Err(GridError::InvalidSize {
            size,
            max: MAX_GRID_SIZE,
        });
    }
    size.checked_mul(size).ok_or(GridError::InvalidSize {
        size,
        max: MAX_GRID_SIZE,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;

    #[test]
    fn dead_grid_has_zero_population() {
        let grid = Grid::dead(5).unwrap();
        assert_eq!(grid.size(), 5);
        assert_eq!(grid.cell_count(), 25);
        assert_eq!(grid.population(), 0);
    }

    #[test]
    fn zero_and_oversized_grids_are_rejected() {
        assert_eq!(
            Grid::dead(0),
            Err(GridError::InvalidSize {
                size: 0,
                max: MAX_GRID_SIZE
            })
        );
        assert!(Grid::dead(MAX_GRID_SIZE + 1).is_err());
    }

    #[test]
    fn from_rows_reads_row_major() {
        let grid = Grid::from_rows(&[[0u8, 1], [1, 1]]).unwrap();
        assert_eq!(grid.get(0, 0), Some(Cell::Dead));
        assert_eq!(grid.get(0, 1), Some(Cell::Alive));
        assert_eq!(grid.get(1, 0), Some(Cell::Alive));
        assert_eq!(grid.population(), 3);
    }

    #[test]
    fn from_rows_rejects_ragged_and_non_binary_input() {
        let ragged: Vec<Vec<u8>> = vec![vec![0, 1], vec![1]];
        assert_eq!(
            Grid::from_rows(&ragged),
            Err(GridError::NotSquare {
                row: 1,
                len: 1,
                expected: 2
            })
        );

        let bad = Grid::from_rows(&[[0u8, 2], [0, 0]]);
        assert_eq!(
            bad,
            Err(GridError::InvalidCellValue {
                row: 0,
                col: 1,
                value: 2
            })
        );
    }

    #[test]
    fn from_cells_checks_length() {
        let err = Grid::from_cells(3, vec![Cell::Dead; 8]).unwrap_err();
        assert_eq!(
            err,
            GridError::CellCountMismatch {
                expected: 9,
                actual: 8
            }
        );
    }

    #[test]
    fn get_out_of_bounds_is_none() {
        let grid = Grid::dead(3).unwrap();
        assert_eq!(grid.get(3, 0), None);
        assert_eq!(grid.get(0, 3), None);
    }

    #[test]
    fn get_wrapped_crosses_edges() {
        let grid = Grid::from_rows(&[[1u8, 0, 0], [0, 0, 0], [0, 0, 0]]).unwrap();
        assert_eq!(grid.get_wrapped(3, 3), Cell::Alive);
        assert_eq!(grid.get_wrapped(-3, 0), Cell::Alive);
        assert_eq!(grid.get_wrapped(-1, -1), Cell::Dead);
    }

    #[test]
    fn set_updates_and_checks_bounds() {
        let mut grid = Grid::dead(2).unwrap();
        grid.set(1, 0, Cell::Alive).unwrap();
        assert_eq!(grid.get(1, 0), Some(Cell::Alive));
        assert!(matches!(
            grid.set(2, 0, Cell::Alive),
            Err(GridError::OutOfBounds { .. })
        ));
    }

    #[test]
    fn rows_yield_size_slices() {
        let grid = Grid::from_rows(&[[1u8, 0, 0], [0, 1, 0], [0, 0, 1]]).unwrap();
        assert_eq!(grid.rows().count(), 3);
        assert_eq!(
            grid.row(1).unwrap(),
            &[Cell::Dead, Cell::Alive, Cell::Dead]
        );
        assert!(grid.row(3).is_none());
    }

    #[test]
    fn random_extremes_are_exact() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert_eq!(Grid::random(8, 0.0, &mut rng).unwrap().population(), 0);
        assert_eq!(Grid::random(8, 1.0, &mut rng).unwrap().population(), 64);
    }

    #[test]
    fn random_is_reproducible_for_a_seed() {
        let a = Grid::random(16, 0.3, &mut ChaCha8Rng::seed_from_u64(9)).unwrap();
        let b = Grid::random(16, 0.3, &mut ChaCha8Rng::seed_from_u64(9)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn density_is_population_fraction() {
        let grid = Grid::from_rows(&[[1u8, 1], [0, 0]]).unwrap();
        assert!((grid.density() - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn serializes_cells_as_bits() {
        let grid = Grid::from_rows(&[[1u8, 0], [0, 1]]).unwrap();
        let json = serde_json::to_string(&grid).unwrap();
        assert_eq!(json, r#"{"size":2,"cells":[1,0,0,1]}"#);

        let back: Grid = serde_json::from_str(&json).unwrap();
        assert_eq!(back, grid);
    }

    #[test]
    fn deserialize_rejects_wrong_cell_count() {
        let result: Result<Grid, _> = serde_json::from_str(r#"{"size":2,"cells":[1,0,0]}"#);
        assert!(result.is_err());
    }
}
