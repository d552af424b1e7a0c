//! Periodic forced activation of random cells.
//!
//! On frames where `frame % period == 0` the injector draws
//! `k = floor(rate * N * N)` coordinate pairs uniformly over `[0, N)`, with
//! replacement, and forces each chosen cell alive. Duplicates are not
//! removed, so fewer than `k` distinct cells may be touched. The pass only
//! ever adds life.

use rand::Rng;
use tracing::debug;

use crate::grid::{Cell, Grid};
use crate::params::Probability;

/// Outcome of one disturbance wave.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DisturbanceReport {
    /// Coordinate pairs drawn (`k`).
    pub draws: usize,
    /// Draws that landed on a dead cell and revived it.
    pub activated: usize,
}

/// Batch activator triggered every `period` frames.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisturbanceInjector {
    rate: Probability,
    period: u64,
}

impl DisturbanceInjector {
    /// An injector with the given draw fraction and period.
    pub const fn new(rate: Probability, period: u64) -> Self {
        Self { rate, period }
    }

    /// Draw fraction of `N * N`.
    pub const fn rate(&self) -> Probability {
        self.rate
    }

    /// Frames between waves.
    pub const fn period(&self) -> u64 {
        self.period
    }

    /// Whether a wave fires on `frame`.
    pub const fn is_due(&self, frame: u64) -> bool {
        match frame.checked_rem(self.period) {
            Some(rem) => rem == 0,
            None => false,
        }
    }

    /// `floor(rate * cell_count)`.
    pub fn batch_size(&self, cell_count: usize) -> usize {
        // cell_count <= MAX_GRID_SIZE^2 is exact in f64, and the product is
        // in [0, cell_count], so truncation back to usize is the floor.
        #[allow(
            clippy::cast_precision_loss,
            clippy::cast_possible_truncation,
            clippy::cast_sign_loss
        )]
        let k = (self.rate.value() * cell_count as f64).floor() as usize;
        k.min(cell_count)
    }

    /// Run a wave on `grid` if `frame` is due, otherwise do nothing.
    ///
    /// Coordinates are drawn row-then-column for each pair, in order.
    pub fn apply<R: Rng>(&self, frame: u64, grid: &mut Grid, rng: &mut R) -> DisturbanceReport {
        if !self.is_due(frame) {
            return DisturbanceReport::default();
        }

        let size = grid.size();
        let draws = self.batch_size(grid.cell_count());
        let mut activated: usize = 0;

        for _ in 0..draws {
            let row = rng.random_range(0..size);
            let col = rng.random_range(0..size);
            if grid.get(row, col) == Some(Cell::Dead) && grid.set(row, col, Cell::Alive).is_ok() {
                activated = activated.saturating_add(1);
            }
        }

        debug!(frame, draws, activated, "Disturbance wave applied");
        DisturbanceReport { draws, activated }
    }
}
