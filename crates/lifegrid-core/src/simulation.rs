//! The stepping loop and its owned state.
//!
//! A [`Simulation`] owns the current grid, the seeded random stream, the
//! step counter and the [`PopulationSeries`]. It is a two-state machine:
//!
//! - **Running** while `steps_completed < T`
//! - **Completed** once `steps_completed == T`
//!
//! Each call to [`Simulation::advance`] computes a full step on the side
//! and only then commits grid, counts, generator state and series together.
//! A failed step leaves the simulation exactly as it was.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use tracing::{debug, info};

use crate::disturbance::DisturbanceReport;
use crate::grid::{Grid, GridError};
use crate::neighbors::NeighborCounts;
use crate::params::{ParameterError, Parameters};
use crate::population::PopulationSeries;
use crate::step::{self, StepError};

/// Errors that can occur while building or advancing a simulation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SimulationError {
    /// Invalid parameters.
    #[error("parameter error: {source}")]
    Parameters {
        /// The underlying parameter error.
        #[from]
        source: ParameterError,
    },

    /// The starting grid could not be built.
    #[error("grid error: {source}")]
    Grid {
        /// The underlying grid error.
        #[from]
        source: GridError,
    },

    /// A step failed; nothing was committed.
    #[error("step error: {source}")]
    Step {
        /// The underlying step error.
        #[from]
        source: StepError,
    },

    /// A supplied starting grid does not match `grid_size`.
    #[error("starting grid is {actual}x{actual}, parameters expect {expected}x{expected}")]
    GridSizeMismatch {
        /// Configured side length.
        expected: usize,
        /// Side length of the supplied grid.
        actual: usize,
    },

    /// `advance` was called after the last step.
    #[error("simulation already completed {steps} steps")]
    AlreadyCompleted {
        /// Steps that were run.
        steps: u64,
    },

    /// The step counter would overflow.
    #[error("step counter overflow")]
    StepCounterOverflow,
}

/// Lifecycle state of a simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SimulationStatus {
    /// More steps remain.
    Running,
    /// All `T` steps have run.
    Completed,
}

/// Summary of one committed step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StepSummary {
    /// Frame index the step ran on (0-based; equals the series index).
    pub frame: u64,
    /// Live cells after the step.
    pub population: usize,
    /// Cells overwritten by mutation.
    pub mutated: usize,
    /// Disturbance draws on this frame (0 when not due).
    pub disturbance_draws: usize,
    /// Dead cells revived by disturbance.
    pub disturbance_activated: usize,
    /// Steps completed including this one.
    pub steps_completed: u64,
}

/// Read-only view handed to renderers after each step.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct StepFrame<'a> {
    /// Frame index of the step that produced `grid`.
    pub frame: u64,
    /// The grid after the step.
    pub grid: &'a Grid,
    /// Neighbor counts the step's rule was evaluated on.
    pub neighbor_counts: &'a NeighborCounts,
    /// Live cells in `grid`.
    pub population: usize,
    /// Population history up to and including this step.
    pub population_series: &'a PopulationSeries,
}

/// Owned simulation state plus its seeded random stream.
#[derive(Debug, Clone)]
pub struct Simulation {
    params: Parameters,
    grid: Grid,
    neighbor_counts: Option<NeighborCounts>,
    series: PopulationSeries,
    steps_completed: u64,
    rng: ChaCha8Rng,
}

impl Simulation {
    /// Seed the generator from `params.seed()` and sample the starting grid.
    pub fn new(params: Parameters) -> Result<Self, SimulationError> {
        let mut rng = ChaCha8Rng::seed_from_u64(params.seed());
        let grid = step::initialize(
            params.grid_size(),
            params.initial_live_probability(),
            &mut rng,
        )?;
        info!(
            grid_size = params.grid_size(),
            steps = params.steps(),
            seed = params.seed(),
            initial_population = grid.population(),
            "Simulation initialized"
        );
        Ok(Self::assemble(params, grid, rng))
    }

    /// Start from an explicit grid. The generator is still seeded from
    /// `params.seed()` but no draws are spent on initialization.
    pub fn with_grid(params: Parameters, grid: Grid) -> Result<Self, SimulationError> {
        if grid.size() != params.grid_size() {
            return Err(SimulationError::GridSizeMismatch {
                expected: params.grid_size(),
                actual: grid.size(),
            });
        }
        let rng = ChaCha8Rng::seed_from_u64(params.seed());
        Ok(Self::assemble(params, grid, rng))
    }

    const fn assemble(params: Parameters, grid: Grid, rng: ChaCha8Rng) -> Self {
        Self {
            params,
            grid,
            neighbor_counts: None,
            series: PopulationSeries::new(),
            steps_completed: 0,
            rng,
        }
    }

    /// The parameters this simulation was built with.
    pub const fn params(&self) -> &Parameters {
        &self.params
    }

    /// The current (last committed) grid.
    pub const fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Neighbor counts used by the most recent step, if any step has run.
    pub const fn neighbor_counts(&self) -> Option<&NeighborCounts> {
        self.neighbor_counts.as_ref()
    }

    /// Population after every completed step.
    pub const fn population_series(&self) -> &PopulationSeries {
        &self.series
    }

    /// Live cells in the current grid.
    pub fn population(&self) -> usize {
        step::population(&self.grid)
    }

    /// Steps committed so far.
    pub const fn steps_completed(&self) -> u64 {
        self.steps_completed
    }

    /// Frame index the next step will run on.
    pub const fn next_frame(&self) -> u64 {
        self.steps_completed
    }

    /// Running or Completed.
    pub const fn status(&self) -> SimulationStatus {
        if self.steps_completed >= self.params.steps() {
            SimulationStatus::Completed
        } else {
            SimulationStatus::Running
        }
    }

    /// Whether all `T` steps have run.
    pub const fn is_completed(&self) -> bool {
        matches!(self.status(), SimulationStatus::Completed)
    }

    /// View of the latest step for renderers, or `None` before the first step.
    pub fn frame(&self) -> Option<StepFrame<'_>> {
        let neighbor_counts = self.neighbor_counts.as_ref()?;
        let population = self.series.last()?;
        let frame = self.steps_completed.checked_sub(1)?;
        Some(StepFrame {
            frame,
            grid: &self.grid,
            neighbor_counts,
            population,
            population_series: &self.series,
        })
    }

    /// Run one step and commit it.
    pub fn advance(&mut self) -> Result<StepSummary, SimulationError> {
        if self.is_completed() {
            return Err(SimulationError::AlreadyCompleted {
                steps: self.steps_completed,
            });
        }

        let frame = self.steps_completed;
        let steps_completed = frame
            .checked_add(1)
            .ok_or(SimulationError::StepCounterOverflow)?;

        // Work on a copy of the stream so a failed step consumes nothing.
        let mut rng = self.rng.clone();
        let out = step::step(&self.grid, frame, &self.params, &mut rng)?;
        let population = out.grid.population();

        self.grid = out.grid;
        self.neighbor_counts = Some(out.neighbor_counts);
        self.rng = rng;
        self.series.push(population);
        self.steps_completed = steps_completed;

        let summary = summarize(frame, population, out.mutated, out.disturbance, steps_completed);
        if summary.disturbance_draws > 0 {
            info!(
                frame,
                draws = summary.disturbance_draws,
                activated = summary.disturbance_activated,
                "Disturbance wave"
            );
        }
        debug!(frame, population, mutated = summary.mutated, "Step committed");

        if self.is_completed() {
            info!(
                steps = steps_completed,
                final_population = population,
                "Simulation completed"
            );
        }

        Ok(summary)
    }

    /// Step until Completed. Returns the full population series.
    pub fn run_to_completion(&mut self) -> Result<&PopulationSeries, SimulationError> {
        while !self.is_completed() {
            self.advance()?;
        }
        Ok(&self.series)
    }
}

const fn summarize(
    frame: u64,
    population: usize,
    mutated: usize,
    disturbance: DisturbanceReport,
    steps_completed: u64,
) -> StepSummary {
    StepSummary {
        frame,
        population,
        mutated,
        disturbance_draws: disturbance.draws,
        disturbance_activated: disturbance.activated,
        steps_completed,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::grid::Cell;

    fn params(size: usize, steps: u64) -> Parameters {
        Parameters::builder()
            .grid_size(size)
            .steps(steps)
            .build()
            .unwrap()
    }

    #[test]
    fn starts_running_with_empty_series() {
        let sim = Simulation::new(params(10, 5)).unwrap();
        assert_eq!(sim.status(), SimulationStatus::Running);
        assert_eq!(sim.steps_completed(), 0);
        assert!(sim.population_series().is_empty());
        assert!(sim.neighbor_counts().is_none());
        assert!(sim.frame().is_none());
    }

    #[test]
    fn zero_steps_is_immediately_completed() {
        let mut sim = Simulation::new(params(4, 0)).unwrap();
        assert!(sim.is_completed());
        assert_eq!(
            sim.advance(),
            Err(SimulationError::AlreadyCompleted { steps: 0 })
        );
        assert!(sim.run_to_completion().unwrap().is_empty());
    }

    #[test]
    fn advance_records_population_and_counts() {
        let mut sim = Simulation::new(params(12, 3)).unwrap();
        let summary = sim.advance().unwrap();

        assert_eq!(summary.frame, 0);
        assert_eq!(summary.steps_completed, 1);
        assert_eq!(summary.population, sim.grid().population());
        assert_eq!(sim.population_series().as_slice(), &[summary.population]);
        assert!(sim.neighbor_counts().is_some());

        let frame = sim.frame().unwrap();
        assert_eq!(frame.frame, 0);
        assert_eq!(frame.population, summary.population);
    }

    #[test]
    fn first_frame_is_a_disturbance_frame() {
        let mut sim = Simulation::new(params(20, 2)).unwrap();
        let first = sim.advance().unwrap();
        let second = sim.advance().unwrap();
        // floor(0.05 * 400) = 20 draws on frame 0, none on frame 1.
        assert_eq!(first.disturbance_draws, 20);
        assert_eq!(second.disturbance_draws, 0);
    }

    #[test]
    fn halts_exactly_at_step_count() {
        let mut sim = Simulation::new(params(8, 25)).unwrap();
        let series = sim.run_to_completion().unwrap().clone();
        assert_eq!(series.len(), 25);
        assert_eq!(sim.steps_completed(), 25);
        assert_eq!(sim.status(), SimulationStatus::Completed);
        assert!(matches!(
            sim.advance(),
            Err(SimulationError::AlreadyCompleted { steps: 25 })
        ));
        assert_eq!(sim.population_series().len(), 25);
    }

    #[test]
    fn series_tracks_live_count_every_step() {
        let mut sim = Simulation::new(params(15, 30)).unwrap();
        while !sim.is_completed() {
            let summary = sim.advance().unwrap();
            assert_eq!(summary.population, sim.grid().population());
            assert_eq!(
                sim.population_series().len(),
                usize::try_from(sim.steps_completed()).unwrap()
            );
        }
    }

    #[test]
    fn same_seed_reproduces_trajectory() {
        let mut a = Simulation::new(params(16, 40)).unwrap();
        let mut b = Simulation::new(params(16, 40)).unwrap();
        while !a.is_completed() {
            a.advance().unwrap();
            b.advance().unwrap();
            assert_eq!(a.grid(), b.grid());
        }
        assert_eq!(a.population_series(), b.population_series());
    }

    #[test]
    fn different_seeds_diverge() {
        let p = Parameters::builder().grid_size(32).steps(5).seed(1).build().unwrap();
        let q = Parameters::builder().grid_size(32).steps(5).seed(2).build().unwrap();
        let a = Simulation::new(p).unwrap();
        let b = Simulation::new(q).unwrap();
        assert_ne!(a.grid(), b.grid());
    }

    #[test]
    fn with_grid_checks_size() {
        let grid = Grid::filled(3, Cell::Alive).unwrap();
        assert_eq!(
            Simulation::with_grid(params(4, 1), grid).unwrap_err(),
            SimulationError::GridSizeMismatch {
                expected: 4,
                actual: 3
            }
        );
    }

    #[test]
    fn with_grid_uses_supplied_cells() {
        let grid = Grid::from_rows(&[[0_u8, 0, 0], [1, 1, 1], [0, 0, 0]]).unwrap();
        let sim = Simulation::with_grid(params(3, 1), grid.clone()).unwrap();
        assert_eq!(sim.grid(), &grid);
        assert_eq!(sim.population(), 3);
    }
}
