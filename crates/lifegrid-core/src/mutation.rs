//! Random per-cell mutation applied after the rule.
//!
//! Each cell gets one uniform draw `r` in `[0, 1)`. When `r < rate` the
//! cell's final value for the step is the complement of its state at the
//! *start* of the step, not of the rule's output. A cell the rule just
//! birthed (0 -> 1) therefore stays 1 when mutated, while a cell the rule
//! kept alive (1 -> 1) flips to 0.
//!
//! Draws are taken from the generator in raster order before the parallel
//! pass, so a seed fixes the outcome regardless of thread scheduling.

use rand::Rng;
use rayon::prelude::*;

use crate::grid::{Grid, GridError};
use crate::params::Probability;

/// One uniform draw per cell, row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct MutationDraws(Vec<f64>);

impl MutationDraws {
    /// Take `cell_count` draws from `rng` in raster order.
    pub fn sample<R: Rng>(cell_count: usize, rng: &mut R) -> Self {
        Self((0..cell_count).map(|_| rng.random::<f64>()).collect())
    }

    /// Use explicit draw values (row-major).
    pub const fn from_values(values: Vec<f64>) -> Self {
        Self(values)
    }

    /// The draws, row-major.
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }
}

/// Flips cells back to the complement of their pre-step state at a fixed rate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MutationInjector {
    rate: Probability,
}

impl MutationInjector {
    /// An injector with the given per-cell rate.
    pub const fn new(rate: Probability) -> Self {
        Self { rate }
    }

    /// Per-cell mutation probability.
    pub const fn rate(self) -> Probability {
        self.rate
    }

    /// Overwrite mutated cells of `candidate` with the complement of the
    /// same cell in `original`. Returns how many cells mutated.
    pub fn apply(
        self,
        original: &Grid,
        candidate: &mut Grid,
        draws: &MutationDraws,
    ) -> Result<usize, GridError> {
        let expected = original.cell_count();
        for actual in [candidate.cell_count(), draws.as_slice().len()] {
            if actual != expected {
                return Err(GridError::CellCountMismatch { expected, actual });
            }
        }

        let rate = self.rate;
        let mutated = candidate
            .cells_mut()
            .par_iter_mut()
            .zip(original.cells().par_iter())
            .zip(draws.as_slice().par_iter())
            .map(|((cell, &before), &draw)| {
                if rate.hits(draw) {
                    *cell = before.complement();
                    1_usize
                } else {
                    0
                }
            })
            .sum();
        Ok(mutated)
    }
}
