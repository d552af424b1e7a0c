//! Moore-neighborhood counting on the torus.
//!
//! For every cell `(i, j)` the count is the number of live cells among the
//! eight positions `((i + di) mod N, (j + dj) mod N)` with
//! `(di, dj) in {-1, 0, 1}^2 \ {(0, 0)}`. On grids with `N <= 2` several
//! offsets land on the same cell and each one is counted, so a lone live
//! cell on a 1x1 grid sees eight neighbors.
//!
//! Rows are counted in parallel. Every worker reads the shared frame-start
//! grid and writes only its own row of the output buffer.

use rayon::prelude::*;
use serde::Serialize;

use crate::grid::{Cell, Grid};

/// Largest possible neighbor count.
pub const MAX_NEIGHBORS: u8 = 8;

/// Per-cell live-neighbor counts derived from one grid snapshot.
///
/// Entries are always in `0..=8`. The matrix is never edited after it is
/// computed; a new one is produced for every step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NeighborCounts {
    /// Side length `N`, matching the source grid.
    size: usize,
    /// `N * N` counts, row-major.
    counts: Vec<u8>,
}

impl NeighborCounts {
    /// Count the live Moore neighbors of every cell of `grid`.
    pub fn of(grid: &Grid) -> Self {
        let size = grid.size();
        let cells = grid.cells();
        let mut counts = vec![0_u8; cells.len()];

        counts
            .par_chunks_mut(size.max(1))
            .enumerate()
            .for_each(|(row, out)| {
                for (col, slot) in out.iter_mut().enumerate() {
                    *slot = count_at(cells, size, row, col);
                }
            });

        Self { size, counts }
    }

    /// Side length `N`.
    pub const fn size(&self) -> usize {
        self.size
    }

    /// The count at `(row, col)`, or `None` when out of bounds.
    pub fn get(&self, row: usize, col: usize) -> Option<u8> {
        if row >= self.size || col >= self.size {
            return None;
        }
        let idx = row.checked_mul(self.size)?.checked_add(col)?;
        self.counts.get(idx).copied()
    }

    /// All counts, row-major.
    pub fn as_slice(&self) -> &[u8] {
        &self.counts
    }

    /// Iterate over rows of counts.
    pub fn rows(&self) -> std::slice::ChunksExact<'_, u8> {
        self.counts.chunks_exact(self.size.max(1))
    }

    /// How many cells have each count, indexed by count (`0..=8`).
    pub fn histogram(&self) -> [usize; 9] {
        let mut hist = [0_usize; 9];
        for &count in &self.counts {
            if let Some(slot) = hist.get_mut(usize::from(count)) {
                *slot = slot.saturating_add(1);
            }
        }
        hist
    }

    /// The largest count in the matrix (0 for an all-dead grid).
    pub fn max(&self) -> u8 {
        self.counts.iter().copied().max().unwrap_or(0)
    }
}

/// Count the live Moore neighbors of every cell of `grid`.
pub fn count_neighbors(grid: &Grid) -> NeighborCounts {
    NeighborCounts::of(grid)
}

/// Live neighbors of `(row, col)` with toroidal wraparound.
fn count_at(cells: &[Cell], size: usize, row: usize, col: usize) -> u8 {
    let rows = [wrap_prev(row, size), row, wrap_next(row, size)];
    let cols = [wrap_prev(col, size), col, wrap_next(col, size)];

    let mut total: u8 = 0;
    for (ri, &r) in rows.iter().enumerate() {
        let base = r.saturating_mul(size);
        for (ci, &c) in cols.iter().enumerate() {
            // Centre of the 3x3 window is the cell itself.
            if ri == 1 && ci == 1 {
                continue;
            }
            let alive = cells
                .get(base.saturating_add(c))
                .map_or(0, |cell| cell.as_u8());
            total = total.saturating_add(alive);
        }
    }
    total.min(MAX_NEIGHBORS)
}

/// `(index - 1) mod size`.
const fn wrap_prev(index: usize, size: usize) -> usize {
    match index.checked_sub(1) {
        Some(prev) => prev,
        None => size.saturating_sub(1),
    }
}

/// `(index + 1) mod size`.
const fn wrap_next(index: usize, size: usize) -> usize {
    let next = index.saturating_add(1);
    if next >= size { 0 } else { next }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;

    #[test]
    fn all_dead_grid_counts_zero() {
        let counts = count_neighbors(&Grid::dead(6).unwrap());
        assert!(counts.as_slice().iter().all(|&c| c == 0));
        assert_eq!(counts.max(), 0);
    }

    #[test]
    fn all_alive_grid_counts_eight_everywhere() {
        let counts = count_neighbors(&Grid::filled(5, Cell::Alive).unwrap());
        assert!(counts.as_slice().iter().all(|&c| c == 8));
    }

    #[test]
    fn single_cell_lights_its_eight_toroidal_neighbors() {
        let grid = Grid::from_rows(&[[1_u8, 0, 0], [0, 0, 0], [0, 0, 0]]).unwrap();
        let counts = count_neighbors(&grid);

        // On a 3x3 torus every other cell is a neighbor of (0, 0).
        for row in 0..3 {
            for col in 0..3 {
                let expected = u8::from(!(row == 0 && col == 0));
                assert_eq!(counts.get(row, col), Some(expected), "cell ({row}, {col})");
            }
        }
    }

    #[test]
    fn corner_cell_wraps_on_larger_grid() {
        let mut grid = Grid::dead(5).unwrap();
        grid.set(0, 0, Cell::Alive).unwrap();
        let counts = count_neighbors(&grid);

        let neighbors = [(4, 4), (4, 0), (4, 1), (0, 4), (0, 1), (1, 4), (1, 0), (1, 1)];
        for (row, col) in neighbors {
            assert_eq!(counts.get(row, col), Some(1), "cell ({row}, {col})");
        }
        assert_eq!(counts.get(0, 0), Some(0));
        assert_eq!(counts.get(2, 2), Some(0));
        assert_eq!(counts.as_slice().iter().map(|&c| usize::from(c)).sum::<usize>(), 8);
    }

    #[test]
    fn one_by_one_grid_counts_itself_eight_times() {
        let counts = count_neighbors(&Grid::filled(1, Cell::Alive).unwrap());
        assert_eq!(counts.get(0, 0), Some(8));
    }

    #[test]
    fn two_by_two_grid_counts_aliases() {
        // (0,0) sees (1,1) via four diagonal offsets, (0,1) and (1,0) twice each.
        let grid = Grid::from_rows(&[[0_u8, 0], [0, 1]]).unwrap();
        let counts = count_neighbors(&grid);
        assert_eq!(counts.get(0, 0), Some(4));
        assert_eq!(counts.get(0, 1), Some(2));
        assert_eq!(counts.get(1, 0), Some(2));
        assert_eq!(counts.get(1, 1), Some(0));
    }

    #[test]
    fn parallel_count_matches_wrapped_reference() {
        let grid = Grid::random(23, 0.4, &mut ChaCha8Rng::seed_from_u64(5)).unwrap();
        let counts = count_neighbors(&grid);

        for row in 0..23_i64 {
            for col in 0..23_i64 {
                let mut expected = 0_u8;
                for dr in -1..=1 {
                    for dc in -1..=1 {
                        if dr == 0 && dc == 0 {
                            continue;
                        }
                        expected += grid.get_wrapped(row + dr, col + dc).as_u8();
                    }
                }
                let got = counts
                    .get(usize::try_from(row).unwrap(), usize::try_from(col).unwrap())
                    .unwrap();
                assert_eq!(got, expected);
            }
        }
    }

    #[test]
    fn histogram_sums_to_cell_count() {
        let grid = Grid::random(10, 0.5, &mut ChaCha8Rng::seed_from_u64(2)).unwrap();
        let hist = count_neighbors(&grid).histogram();
        assert_eq!(hist.iter().sum::<usize>(), 100);
    }
}
