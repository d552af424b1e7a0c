//! Shared run control for the driving loop.
//!
//! The only external control is a stop request, honored between steps, and
//! the pacing interval. Both are atomics so a signal handler task can flip
//! them while the loop is running.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Reason the driving loop returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SimulationEndReason {
    /// All configured steps ran.
    Completed,
    /// A stop was requested before the last step.
    StopRequested,
}

/// Stop flag and step interval shared between the loop and its controller.
#[derive(Debug)]
pub struct RunControl {
    /// Whether a stop has been requested.
    stop_requested: AtomicBool,

    /// Milliseconds to wait between steps.
    step_interval_ms: AtomicU64,
}

impl RunControl {
    /// Create control state with the given pacing interval.
    pub const fn new(step_interval_ms: u64) -> Self {
        Self {
            stop_requested: AtomicBool::new(false),
            step_interval_ms: AtomicU64::new(step_interval_ms),
        }
    }

    /// Ask the loop to stop after the step in progress.
    pub fn request_stop(&self) {
        self.stop_requested.store(true, Ordering::Release);
    }

    /// Check whether a stop has been requested.
    pub fn is_stop_requested(&self) -> bool {
        self.stop_requested.load(Ordering::Acquire)
    }

    /// Current pacing interval in milliseconds.
    pub fn step_interval_ms(&self) -> u64 {
        self.step_interval_ms.load(Ordering::Relaxed)
    }

    /// Change the pacing interval. Returns the previous value.
    pub fn set_step_interval_ms(&self, ms: u64) -> u64 {
        self.step_interval_ms.swap(ms, Ordering::Relaxed)
    }
}

impl Default for RunControl {
    fn default() -> Self {
        Self::new(0)
    }
}
