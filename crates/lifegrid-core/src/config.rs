//! Configuration loading and typed config structures for Lifegrid.
//!
//! The canonical configuration lives in `lifegrid-config.yaml`. This module
//! defines strongly-typed structs that mirror the YAML structure, with
//! serde defaults for every field, and converts them into validated
//! [`Parameters`].

use std::path::Path;

use serde::Deserialize;

use crate::params::{DEFAULT_DISTURBANCE_PERIOD, ParameterError, Parameters};

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// The values parsed but are out of range.
    #[error("invalid configuration: {source}")]
    Invalid {
        /// The underlying parameter error.
        #[from]
        source: ParameterError,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level configuration.
///
/// Mirrors the structure of `lifegrid-config.yaml`. Every field has a
/// default, so an empty file is a valid configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SimulationConfig {
    /// Grid dimensions and initial density.
    #[serde(default)]
    pub grid: GridConfig,

    /// Birth/death thresholds.
    #[serde(default)]
    pub rules: RulesConfig,

    /// Mutation and disturbance settings.
    #[serde(default)]
    pub stochastic: StochasticConfig,

    /// Run length, seed and pacing.
    #[serde(default)]
    pub run: RunConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// What the driver writes to stdout.
    #[serde(default)]
    pub output: OutputConfig,
}

impl SimulationConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        // serde_yml reports an empty document as a null value.
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yml::from_str(yaml)?;
        Ok(config)
    }

    /// Validate and convert into simulation [`Parameters`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first out-of-range value.
    pub fn parameters(&self) -> Result<Parameters, ConfigError> {
        let params = Parameters::builder()
            .grid_size(self.grid.size)
            .initial_live_probability(self.grid.initial_live_probability)
            .thresholds(
                self.rules.underpopulation,
                self.rules.overcrowding,
                self.rules.reproduction,
            )
            .mutation_rate(self.stochastic.mutation_rate)
            .disturbance_rate(self.stochastic.disturbance_rate)
            .disturbance_period(self.stochastic.disturbance_period)
            .steps(self.run.steps)
            .seed(self.run.seed)
            .build()?;
        Ok(params)
    }
}

/// Grid configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GridConfig {
    /// Side length `N`.
    #[serde(default = "default_grid_size")]
    pub size: usize,

    /// Probability that a cell starts alive.
    #[serde(default = "default_initial_live_probability")]
    pub initial_live_probability: f64,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            size: default_grid_size(),
            initial_live_probability: default_initial_live_probability(),
        }
    }
}

/// Neighbor thresholds.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RulesConfig {
    /// Live cells with fewer neighbors die.
    #[serde(default = "default_underpopulation")]
    pub underpopulation: u8,

    /// Live cells with more neighbors die.
    #[serde(default = "default_overcrowding")]
    pub overcrowding: u8,

    /// Dead cells with exactly this many neighbors are born.
    #[serde(default = "default_reproduction")]
    pub reproduction: u8,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            underpopulation: default_underpopulation(),
            overcrowding: default_overcrowding(),
            reproduction: default_reproduction(),
        }
    }
}

/// Mutation and disturbance parameters.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StochasticConfig {
    /// Per-cell, per-step mutation probability.
    #[serde(default = "default_mutation_rate")]
    pub mutation_rate: f64,

    /// Fraction of `N * N` drawn as disturbance coordinates.
    #[serde(default = "default_disturbance_rate")]
    pub disturbance_rate: f64,

    /// Frames between disturbance waves.
    #[serde(default = "default_disturbance_period")]
    pub disturbance_period: u64,
}

impl Default for StochasticConfig {
    fn default() -> Self {
        Self {
            mutation_rate: default_mutation_rate(),
            disturbance_rate: default_disturbance_rate(),
            disturbance_period: default_disturbance_period(),
        }
    }
}

/// Run length, seed and pacing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RunConfig {
    /// Steps `T` to run.
    #[serde(default = "default_steps")]
    pub steps: u64,

    /// Random seed for reproducibility.
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Real-time milliseconds to wait between steps (0 = as fast as possible).
    #[serde(default)]
    pub step_interval_ms: u64,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            steps: default_steps(),
            seed: default_seed(),
            step_interval_ms: 0,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error), used when `RUST_LOG`
    /// is not set.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit a population log line every this many steps (0 = never).
    #[serde(default = "default_log_every")]
    pub log_every: u64,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            log_every: default_log_every(),
        }
    }
}

/// Driver output switches.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OutputConfig {
    /// Print each step frame (grid, counts, population) as a JSON line.
    #[serde(default)]
    pub emit_frames: bool,

    /// Print the JSON run report when the run ends.
    #[serde(default = "default_true")]
    pub report: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            emit_frames: false,
            report: true,
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions (serde default requires named functions)
// ---------------------------------------------------------------------------

const fn default_grid_size() -> usize {
    100
}

const fn default_initial_live_probability() -> f64 {
    0.2
}

const fn default_underpopulation() -> u8 {
    2
}

const fn default_overcrowding() -> u8 {
    4
}

const fn default_reproduction() -> u8 {
    3
}

const fn default_mutation_rate() -> f64 {
    0.01
}

const fn default_disturbance_rate() -> f64 {
    0.05
}

const fn default_disturbance_period() -> u64 {
    DEFAULT_DISTURBANCE_PERIOD
}

const fn default_steps() -> u64 {
    200
}

const fn default_seed() -> u64 {
    42
}

fn default_log_level() -> String {
    "info".to_owned()
}

const fn default_log_every() -> u64 {
    1
}

const fn default_true() -> bool {
    true
}
