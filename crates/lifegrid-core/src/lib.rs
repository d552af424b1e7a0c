//! Transition engine for a stochastic, Life-like cellular automaton on a
//! toroidal grid.
//!
//! Each step counts Moore neighbors, applies a survival/birth rule, flips
//! random cells back to the complement of their pre-step state, and every
//! few frames forces a random batch of cells alive. The result is a grid
//! trajectory plus a population time series.
//!
//! # Modules
//!
//! - [`grid`] -- [`Grid`] and [`Cell`]: the square toroidal state container.
//! - [`neighbors`] -- Parallel Moore-neighborhood counting with wraparound.
//! - [`rule`] -- [`TransitionRule`]: the deterministic birth/death rule.
//! - [`mutation`] -- [`MutationInjector`]: per-cell random overwrite.
//! - [`disturbance`] -- [`DisturbanceInjector`]: periodic batch activation.
//! - [`params`] -- Validated, immutable [`Parameters`].
//! - [`config`] -- YAML configuration loading into typed structs.
//! - [`step`] -- The pure single-step pipeline (`initialize`, `step`, `population`).
//! - [`population`] -- Append-only [`PopulationSeries`].
//! - [`simulation`] -- [`Simulation`]: owned state, seeded stream, Running/Completed.
//! - [`control`] -- [`RunControl`]: stop flag and pacing shared with the driver.
//! - [`runner`] -- Async driving loop with a per-step callback.
//!
//! [`Grid`]: grid::Grid
//! [`Cell`]: grid::Cell
//! [`TransitionRule`]: rule::TransitionRule
//! [`MutationInjector`]: mutation::MutationInjector
//! [`DisturbanceInjector`]: disturbance::DisturbanceInjector
//! [`Parameters`]: params::Parameters
//! [`PopulationSeries`]: population::PopulationSeries
//! [`Simulation`]: simulation::Simulation
//! [`RunControl`]: control::RunControl

pub mod config;
pub mod control;
pub mod disturbance;
pub mod grid;
pub mod mutation;
pub mod neighbors;
pub mod params;
pub mod population;
pub mod rule;
pub mod runner;
pub mod simulation;
pub mod step;

// Re-export primary types at crate root.
pub use config::{ConfigError, SimulationConfig};
pub use control::{RunControl, SimulationEndReason};
pub use grid::{Cell, Grid, GridError, MAX_GRID_SIZE};
pub use neighbors::{NeighborCounts, count_neighbors};
pub use params::{ParameterError, Parameters, ParametersBuilder, Probability};
pub use population::{PopulationSeries, PopulationStats};
pub use rule::TransitionRule;
pub use simulation::{Simulation, SimulationError, SimulationStatus, StepFrame, StepSummary};
pub use step::{StepError, StepOutput, initialize, population, step};
