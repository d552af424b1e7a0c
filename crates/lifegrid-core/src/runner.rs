//! Driving loop with pacing and clean stop.
//!
//! [`run_simulation`] wraps [`Simulation::advance`] and adds:
//!
//! - **Bounded run**: returns once the simulation is Completed
//! - **Stop between steps**: a stop request is honored before the next
//!   step starts, never in the middle of one
//! - **Pacing**: optional sleep between steps
//! - **Frame hand-off**: a [`StepCallback`] sees every committed step
//!
//! [`Simulation::advance`]: crate::simulation::Simulation::advance

use std::sync::Arc;

use tracing::{info, warn};

use crate::control::{RunControl, SimulationEndReason};
use crate::simulation::{Simulation, SimulationError, StepFrame, StepSummary};

/// Errors that can occur during the simulation run.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// A step failed.
    #[error("simulation error: {source}")]
    Simulation {
        /// The underlying simulation error.
        #[from]
        source: SimulationError,
    },
}

/// Result of a driven run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulationResult {
    /// Why the loop returned.
    pub end_reason: SimulationEndReason,
    /// Summary of the last committed step, if any.
    pub final_summary: Option<StepSummary>,
    /// Steps executed by this call.
    pub steps_run: u64,
}

/// Callback invoked after each committed step.
///
/// This is where a renderer plugs in: the frame carries the new grid, the
/// neighbor counts it was derived from, and the population history.
pub trait StepCallback: Send {
    /// Called after a step commits.
    fn on_step(&mut self, summary: &StepSummary, frame: StepFrame<'_>);
}

/// A callback that ignores every step.
pub struct NoOpCallback;

impl StepCallback for NoOpCallback {
    fn on_step(&mut self, _summary: &StepSummary, _frame: StepFrame<'_>) {}
}

/// Step `sim` until it completes or `control` requests a stop.
///
/// # Errors
///
/// Returns [`RunnerError`] if a step fails. The simulation keeps its last
/// committed state.
pub async fn run_simulation(
    sim: &mut Simulation,
    control: &Arc<RunControl>,
    callback: &mut dyn StepCallback,
) -> Result<SimulationResult, RunnerError> {
    let mut final_summary: Option<StepSummary> = None;
    let mut steps_run: u64 = 0;

    info!(
        steps = sim.params().steps(),
        already_completed = sim.steps_completed(),
        step_interval_ms = control.step_interval_ms(),
        "Run starting"
    );

    loop {
        // --- Check completion ---
        if sim.is_completed() {
            return Ok(SimulationResult {
                end_reason: SimulationEndReason::Completed,
                final_summary,
                steps_run,
            });
        }

        // --- Check stop request (before step) ---
        if control.is_stop_requested() {
            info!(steps_completed = sim.steps_completed(), "Stop requested");
            return Ok(SimulationResult {
                end_reason: SimulationEndReason::StopRequested,
                final_summary,
                steps_run,
            });
        }

        // --- Execute step ---
        let summary = sim.advance()?;
        steps_run = steps_run.saturating_add(1);

        // --- Notify callback ---
        if let Some(frame) = sim.frame() {
            callback.on_step(&summary, frame);
        }
        final_summary = Some(summary);

        // --- Pace ---
        let interval_ms = control.step_interval_ms();
        if interval_ms > 0 && !sim.is_completed() {
            tokio::time::sleep(tokio::time::Duration::from_millis(interval_ms)).await;
        } else {
            tokio::task::yield_now().await;
        }
    }
}

/// Log how a run ended.
pub fn log_simulation_end(result: &SimulationResult) {
    info!(
        reason = ?result.end_reason,
        steps_run = result.steps_run,
        final_frame = result.final_summary.as_ref().map(|s| s.frame),
        final_population = result.final_summary.as_ref().map(|s| s.population),
        "Run ended"
    );

    if result.final_summary.is_none() {
        warn!("Run ended with no steps executed");
    }
}
