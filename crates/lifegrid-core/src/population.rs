//! Append-only population history.

use serde::Serialize;

/// Live-cell count after each completed step; index `t` is step `t`.
///
/// Entries are only ever appended.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct PopulationSeries(Vec<usize>);

/// Summary statistics over a population series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PopulationStats {
    /// Smallest recorded population.
    pub min: usize,
    /// Largest recorded population.
    pub max: usize,
    /// Arithmetic mean.
    pub mean: f64,
    /// Population after the last step.
    pub last: usize,
}

impl PopulationSeries {
    /// An empty series.
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    pub(crate) fn push(&mut self, population: usize) {
        self.0.push(population);
    }

    /// Number of recorded steps.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no step has completed yet.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Population after step `step`.
    pub fn get(&self, step: usize) -> Option<usize> {
        self.0.get(step).copied()
    }

    /// Most recent population.
    pub fn last(&self) -> Option<usize> {
        self.0.last().copied()
    }

    /// All entries in step order.
    pub fn as_slice(&self) -> &[usize] {
        &self.0
    }

    /// Min, max, mean and last value, or `None` when empty.
    pub fn stats(&self) -> Option<PopulationStats> {
        let last = self.last()?;
        let min = self.0.iter().copied().min()?;
        let max = self.0.iter().copied().max()?;
        let total = self
            .0
            .iter()
            .fold(0_u64, |acc, &p| acc.saturating_add(u64::try_from(p).unwrap_or(u64::MAX)));
        // Populations are bounded by MAX_GRID_SIZE^2; the series length by
        // the step count. Both are far inside f64's exact range in practice.
        #[allow(clippy::cast_precision_loss)]
        let mean = total as f64 / self.0.len() as f64;
        Some(PopulationStats {
            min,
            max,
            mean,
            last,
        })
    }
}
