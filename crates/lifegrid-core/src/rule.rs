//! The deterministic birth/death rule.
//!
//! A live cell survives when its neighbor count lies in the inclusive band
//! `[underpopulation, overcrowding]`; a dead cell is born when the count is
//! exactly `reproduction`. No randomness is involved.

use rayon::prelude::*;
use serde::Serialize;

use crate::grid::{Cell, Grid, GridError};
use crate::neighbors::{MAX_NEIGHBORS, NeighborCounts};
use crate::params::ParameterError;

/// Survival band and birth count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TransitionRule {
    underpopulation: u8,
    overcrowding: u8,
    reproduction: u8,
}

impl Default for TransitionRule {
    /// Survive on 2..=4 neighbors, born on exactly 3.
    fn default() -> Self {
        Self {
            underpopulation: 2,
            overcrowding: 4,
            reproduction: 3,
        }
    }
}

impl TransitionRule {
    /// Build a rule, checking every threshold is in `0..=8` and that the
    /// survival band is not inverted.
    pub fn new(
        underpopulation: u8,
        overcrowding: u8,
        reproduction: u8,
    ) -> Result<Self, ParameterError> {
        check_threshold("underpopulation", underpopulation)?;
        check_threshold("overcrowding", overcrowding)?;
        check_threshold("reproduction", reproduction)?;
        if underpopulation > overcrowding {
            return Err(ParameterError::InvertedSurvivalBand {
                underpopulation,
                overcrowding,
            });
        }
        Ok(Self {
            underpopulation,
            overcrowding,
            reproduction,
        })
    }

    /// Conway's B3/S23.
    pub const fn conway() -> Self {
        Self {
            underpopulation: 2,
            overcrowding: 3,
            reproduction: 3,
        }
    }

    /// Lower bound of the survival band.
    pub const fn underpopulation(self) -> u8 {
        self.underpopulation
    }

    /// Upper bound of the survival band.
    pub const fn overcrowding(self) -> u8 {
        self.overcrowding
    }

    /// Exact neighbor count that brings a dead cell to life.
    pub const fn reproduction(self) -> u8 {
        self.reproduction
    }

    /// Next state of a single cell.
    pub const fn apply(self, cell: Cell, neighbors: u8) -> Cell {
        match cell {
            Cell::Alive => {
                if neighbors < self.underpopulation || neighbors > self.overcrowding {
                    Cell::Dead
                } else {
                    Cell::Alive
                }
            }
            Cell::Dead => {
                if neighbors == self.reproduction {
                    Cell::Alive
                } else {
                    Cell::Dead
                }
            }
        }
    }

    /// Apply the rule to every cell, producing a fresh candidate grid.
    ///
    /// `grid` is only read; `counts` must come from the same grid.
    pub fn apply_grid(self, grid: &Grid, counts: &NeighborCounts) -> Result<Grid, GridError> {
        if counts.size() != grid.size() {
            return Err(GridError::CellCountMismatch {
                expected: grid.cell_count(),
                actual: counts.as_slice().len(),
            });
        }

        let mut candidate = grid.clone();
        candidate
            .cells_mut()
            .par_iter_mut()
            .zip(counts.as_slice().par_iter())
            .for_each(|(cell, &count)| *cell = self.apply(*cell, count));
        Ok(candidate)
    }
}

fn check_threshold(name: &'static str, value: u8) -> Result<(), ParameterError> {
    if value > MAX_NEIGHBORS {
        return Err(ParameterError::ThresholdOutOfRange { name, value });
    }
    Ok(())
}
