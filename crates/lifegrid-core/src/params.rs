//! Validated simulation parameters.
//!
//! [`Parameters`] is fixed for the lifetime of a simulation. It can only be
//! obtained through [`ParametersBuilder::build`], which rejects every
//! out-of-range value with a [`ParameterError`] naming the parameter.
//! Nothing is clamped.

use serde::Serialize;

use crate::disturbance::DisturbanceInjector;
use crate::grid::MAX_GRID_SIZE;
use crate::mutation::MutationInjector;
use crate::rule::TransitionRule;

/// Disturbance fires on frames that are a multiple of this by default.
pub const DEFAULT_DISTURBANCE_PERIOD: u64 = 10;

/// Configuration errors, each identifying the offending parameter.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParameterError {
    /// Grid side length is zero or too large.
    #[error("grid_size must be in 1..={max}, got {size}")]
    GridSize {
        /// The rejected side length.
        size: usize,
        /// The largest accepted side length.
        max: usize,
    },

    /// A probability is outside `[0, 1]` or not finite.
    #[error("{name} must be a probability in [0, 1], got {value}")]
    ProbabilityOutOfRange {
        /// Parameter name.
        name: &'static str,
        /// The rejected value.
        value: f64,
    },

    /// A neighbor threshold is above 8.
    #[error("{name} threshold must be in 0..=8, got {value}")]
    ThresholdOutOfRange {
        /// Parameter name.
        name: &'static str,
        /// The rejected value.
        value: u8,
    },

    /// `underpopulation > overcrowding`: no live cell could ever survive.
    #[error(
        "underpopulation ({underpopulation}) must not exceed overcrowding ({overcrowding})"
    )]
    InvertedSurvivalBand {
        /// Lower survival bound.
        underpopulation: u8,
        /// Upper survival bound.
        overcrowding: u8,
    },

    /// The disturbance period is zero.
    #[error("disturbance_period must be at least 1")]
    ZeroDisturbancePeriod,
}

/// A value checked to lie in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct Probability(f64);

impl Probability {
    /// Never.
    pub const ZERO: Self = Self(0.0);
    /// Always.
    pub const ONE: Self = Self(1.0);

    /// Check `value` is a finite number in `[0, 1]`.
    pub fn new(name: &'static str, value: f64) -> Result<Self, ParameterError> {
        if value.is_finite() && (0.0..=1.0).contains(&value) {
            Ok(Self(value))
        } else {
            Err(ParameterError::ProbabilityOutOfRange { name, value })
        }
    }

    /// The raw value.
    pub const fn value(self) -> f64 {
        self.0
    }

    /// Whether a uniform draw in `[0, 1)` falls below this probability.
    pub fn hits(self, draw: f64) -> bool {
        draw < self.0
    }
}

/// Immutable, validated parameters of one simulation run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Parameters {
    grid_size: usize,
    steps: u64,
    initial_live_probability: Probability,
    rule: TransitionRule,
    mutation_rate: Probability,
    disturbance_rate: Probability,
    disturbance_period: u64,
    seed: u64,
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            grid_size: 100,
            steps: 200,
            initial_live_probability: Probability(0.2),
            rule: TransitionRule::default(),
            mutation_rate: Probability(0.01),
            disturbance_rate: Probability(0.05),
            disturbance_period: DEFAULT_DISTURBANCE_PERIOD,
            seed: 42,
        }
    }
}

impl Parameters {
    /// Start from the defaults (100x100, 200 steps, p0 0.2, S2-4/B3,
    /// mutation 0.01, disturbance 0.05 every 10 frames, seed 42).
    pub fn builder() -> ParametersBuilder {
        ParametersBuilder::default()
    }

    /// Grid side length `N`.
    pub const fn grid_size(&self) -> usize {
        self.grid_size
    }

    /// Number of steps `T` to run.
    pub const fn steps(&self) -> u64 {
        self.steps
    }

    /// Probability that a cell starts alive.
    pub const fn initial_live_probability(&self) -> Probability {
        self.initial_live_probability
    }

    /// The birth/death rule.
    pub const fn rule(&self) -> TransitionRule {
        self.rule
    }

    /// Per-cell mutation probability.
    pub const fn mutation_rate(&self) -> Probability {
        self.mutation_rate
    }

    /// Fraction of `N * N` used as the disturbance draw count.
    pub const fn disturbance_rate(&self) -> Probability {
        self.disturbance_rate
    }

    /// Frames between disturbance waves.
    pub const fn disturbance_period(&self) -> u64 {
        self.disturbance_period
    }

    /// Seed for the simulation's random stream.
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// The mutation injector for these parameters.
    pub const fn mutation(&self) -> MutationInjector {
        MutationInjector::new(self.mutation_rate)
    }

    /// The disturbance injector for these parameters.
    pub const fn disturbance(&self) -> DisturbanceInjector {
        DisturbanceInjector::new(self.disturbance_rate, self.disturbance_period)
    }
}

/// Unchecked parameter values, validated by [`build`](Self::build).
#[derive(Debug, Clone, PartialEq)]
pub struct ParametersBuilder {
    grid_size: usize,
    steps: u64,
    initial_live_probability: f64,
    underpopulation: u8,
    overcrowding: u8,
    reproduction: u8,
    mutation_rate: f64,
    disturbance_rate: f64,
    disturbance_period: u64,
    seed: u64,
}

impl Default for ParametersBuilder {
    fn default() -> Self {
        let defaults = Parameters::default();
        Self {
            grid_size: defaults.grid_size,
            steps: defaults.steps,
            initial_live_probability: defaults.initial_live_probability.value(),
            underpopulation: defaults.rule.underpopulation(),
            overcrowding: defaults.rule.overcrowding(),
            reproduction: defaults.rule.reproduction(),
            mutation_rate: defaults.mutation_rate.value(),
            disturbance_rate: defaults.disturbance_rate.value(),
            disturbance_period: defaults.disturbance_period,
            seed: defaults.seed,
        }
    }
}

impl ParametersBuilder {
    /// Grid side length `N`.
    #[must_use]
    pub const fn grid_size(mut self, grid_size: usize) -> Self {
        self.grid_size = grid_size;
        self
    }

    /// Number of steps `T`.
    #[must_use]
    pub const fn steps(mut self, steps: u64) -> Self {
        self.steps = steps;
        self
    }

    /// Initial live probability `p0`.
    #[must_use]
    pub const fn initial_live_probability(mut self, p: f64) -> Self {
        self.initial_live_probability = p;
        self
    }

    /// Survival band and birth count.
    #[must_use]
    pub const fn thresholds(mut self, underpopulation: u8, overcrowding: u8, reproduction: u8) -> Self {
        self.underpopulation = underpopulation;
        self.overcrowding = overcrowding;
        self.reproduction = reproduction;
        self
    }

    /// Per-cell mutation probability.
    #[must_use]
    pub const fn mutation_rate(mut self, rate: f64) -> Self {
        self.mutation_rate = rate;
        self
    }

    /// Disturbance draw fraction.
    #[must_use]
    pub const fn disturbance_rate(mut self, rate: f64) -> Self {
        self.disturbance_rate = rate;
        self
    }

    /// Frames between disturbance waves.
    #[must_use]
    pub const fn disturbance_period(mut self, period: u64) -> Self {
        self.disturbance_period = period;
        self
    }

    /// Random seed.
    #[must_use]
    pub const fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Validate and freeze the parameters.
    pub fn build(self) -> Result<Parameters, ParameterError> {
        if self.grid_size == 0 || self.grid_size > MAX_GRID_SIZE {
            return Err(ParameterError::GridSize {
                size: self.grid_size,
                max: MAX_GRID_SIZE,
            });
        }
        let initial_live_probability =
            Probability::new("initial_live_probability", self.initial_live_probability)?;
        let rule = TransitionRule::new(self.underpopulation, self.overcrowding, self.reproduction)?;
        let mutation_rate = Probability::new("mutation_rate", self.mutation_rate)?;
        let disturbance_rate = Probability::new("disturbance_rate", self.disturbance_rate)?;
        if self.disturbance_period == 0 {
            return Err(ParameterError::ZeroDisturbancePeriod);
        }

        Ok(Parameters {
            grid_size: self.grid_size,
            steps: self.steps,
            initial_live_probability,
            rule,
            mutation_rate,
            disturbance_rate,
            disturbance_period: self.disturbance_period,
            seed: self.seed,
        })
    }
}
