//! The single-step transition function.
//!
//! [`step`] is the whole per-frame pipeline:
//!
//! 1. Count neighbors on the frame-start grid.
//! 2. Apply the [`TransitionRule`] into a fresh candidate buffer.
//! 3. Take one mutation draw per cell (raster order) and apply the
//!    [`MutationInjector`] against the frame-start grid.
//! 4. If the frame is due, run the [`DisturbanceInjector`].
//!
//! The input grid is never written. Random draws happen in a fixed order
//! (all mutation draws, then disturbance coordinates), so a seeded
//! generator reproduces the same trajectory bit for bit.
//!
//! [`TransitionRule`]: crate::rule::TransitionRule
//! [`MutationInjector`]: crate::mutation::MutationInjector
//! [`DisturbanceInjector`]: crate::disturbance::DisturbanceInjector

use rand::Rng;
use tracing::trace;

use crate::disturbance::DisturbanceReport;
use crate::grid::{Grid, GridError};
use crate::mutation::MutationDraws;
use crate::neighbors::{NeighborCounts, count_neighbors};
use crate::params::{Parameters, Probability};

/// Errors that can occur while computing a step.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StepError {
    /// Buffer shapes disagreed inside the pipeline.
    #[error("grid error: {source}")]
    Grid {
        /// The underlying grid error.
        #[from]
        source: GridError,
    },
}

/// Everything one step produces.
#[derive(Debug, Clone, PartialEq)]
pub struct StepOutput {
    /// The grid for the next frame.
    pub grid: Grid,
    /// Neighbor counts of the frame-start grid (what the rule saw).
    pub neighbor_counts: NeighborCounts,
    /// Cells overwritten by mutation.
    pub mutated: usize,
    /// Disturbance outcome (all zero when the frame was not due).
    pub disturbance: DisturbanceReport,
}

/// Sample the starting grid: each cell alive with probability `p0`.
pub fn initialize<R: Rng>(size: usize, p0: Probability, rng: &mut R) -> Result<Grid, GridError> {
    Grid::random(size, p0.value(), rng)
}

/// Number of live cells in `grid`.
pub fn population(grid: &Grid) -> usize {
    grid.population()
}

/// Compute the grid that follows `grid` on `frame`.
pub fn step<R: Rng>(
    grid: &Grid,
    frame: u64,
    params: &Parameters,
    rng: &mut R,
) -> Result<StepOutput, StepError> {
    let neighbor_counts = count_neighbors(grid);

    let mut next = params.rule().apply_grid(grid, &neighbor_counts)?;

    let draws = MutationDraws::sample(grid.cell_count(), rng);
    let mutated = params.mutation().apply(grid, &mut next, &draws)?;

    let disturbance = params.disturbance().apply(frame, &mut next, rng);

    trace!(
        frame,
        mutated,
        disturbed = disturbance.activated,
        "Step computed"
    );

    Ok(StepOutput {
        grid: next,
        neighbor_counts,
        mutated,
        disturbance,
    })
}
