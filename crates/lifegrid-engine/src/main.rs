//! Driver binary for the Lifegrid automaton.
//!
//! Loads configuration, builds the seeded simulation, and steps it to
//! completion or until Ctrl-C. Logs go to stderr; frames (when enabled)
//! and the final run report go to stdout as JSON.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `$LIFEGRID_CONFIG` or `lifegrid-config.yaml`
//! 2. Initialize structured logging (tracing)
//! 3. Validate parameters
//! 4. Seed the initial grid
//! 5. Install the Ctrl-C stop handler
//! 6. Run the driving loop
//! 7. Log the result and print the report

mod error;
mod frame_logger;
mod report;

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use lifegrid_core::{RunControl, Simulation, SimulationConfig, runner};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;
use crate::frame_logger::FrameLogger;
use crate::report::RunReport;

/// Environment variable naming an explicit config file.
const CONFIG_ENV: &str = "LIFEGRID_CONFIG";

/// Config file looked up in the working directory.
const DEFAULT_CONFIG_PATH: &str = "lifegrid-config.yaml";

/// Application entry point.
///
/// # Errors
///
/// Returns an error if configuration is invalid or the run fails.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration. Logging is not up yet, so remember where it
    //    came from and report after init.
    let (config, source) = load_config()?;

    // 2. Initialize structured logging. RUST_LOG wins over the config level.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    info!("lifegrid-engine starting");
    match &source {
        Some(path) => info!(path = %path.display(), "Configuration loaded"),
        None => info!("Config file not found, using defaults"),
    }

    // 3. Validate parameters.
    let params = config.parameters().inspect_err(|e| {
        error!(error = %e, "Invalid configuration");
    })?;
    info!(
        grid_size = params.grid_size(),
        steps = params.steps(),
        initial_live_probability = params.initial_live_probability().value(),
        mutation_rate = params.mutation_rate().value(),
        disturbance_rate = params.disturbance_rate().value(),
        disturbance_period = params.disturbance_period(),
        seed = params.seed(),
        "Parameters validated"
    );

    // 4. Seed the initial grid.
    let mut sim = Simulation::new(params).map_err(EngineError::from)?;

    // 5. Ctrl-C requests a stop between steps.
    let control = Arc::new(RunControl::new(config.run.step_interval_ms));
    {
        let control = Arc::clone(&control);
        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    info!("Ctrl-C received, stopping after the current step");
                    control.request_stop();
                }
                Err(e) => warn!(error = %e, "Failed to listen for Ctrl-C"),
            }
        });
    }

    // 6. Run.
    let mut callback = FrameLogger::new(
        config.logging.log_every,
        config.output.emit_frames,
        std::io::stdout(),
    );
    let started_at = Utc::now();
    let result = runner::run_simulation(&mut sim, &control, &mut callback)
        .await
        .map_err(EngineError::from)?;
    let finished_at = Utc::now();

    // 7. Log and report.
    runner::log_simulation_end(&result);

    if config.output.report {
        let report = RunReport::new(&sim, &result, started_at, finished_at);
        let json = report.to_json().map_err(EngineError::from)?;
        let mut out = std::io::stdout().lock();
        writeln!(out, "{json}")?;
        info!(run_id = %report.run_id, "Run report written");
    }

    info!(
        end_reason = ?result.end_reason,
        steps_completed = sim.steps_completed(),
        frames_written = callback.frames_written(),
        "lifegrid-engine shutdown complete"
    );

    Ok(())
}

/// Load configuration.
///
/// An explicit `$LIFEGRID_CONFIG` must exist. Otherwise
/// `lifegrid-config.yaml` in the working directory is used if present,
/// and defaults if not.
fn load_config() -> Result<(SimulationConfig, Option<PathBuf>), EngineError> {
    if let Some(explicit) = std::env::var_os(CONFIG_ENV) {
        let path = PathBuf::from(explicit);
        let config = SimulationConfig::from_file(&path)?;
        return Ok((config, Some(path)));
    }

    let config_path = Path::new(DEFAULT_CONFIG_PATH);
    if config_path.exists() {
        let config = SimulationConfig::from_file(config_path)?;
        Ok((config, Some(config_path.to_path_buf())))
    } else {
        Ok((SimulationConfig::default(), None))
    }
}
