//! Step callback that logs population and optionally streams frames.
//!
//! Frames are written as one JSON object per line so a renderer can
//! consume them from a pipe.

use std::io::Write;

use lifegrid_core::runner::StepCallback;
use lifegrid_core::{StepFrame, StepSummary};
use tracing::{info, warn};

/// Callback that reports progress and hands frames to a writer.
pub struct FrameLogger<W> {
    log_every: u64,
    emit_frames: bool,
    out: W,
    frames_written: u64,
}

impl<W: Write + Send> FrameLogger<W> {
    /// Create a logger. `log_every = 0` disables the population log line.
    pub const fn new(log_every: u64, emit_frames: bool, out: W) -> Self {
        Self {
            log_every,
            emit_frames,
            out,
            frames_written: 0,
        }
    }

    /// Number of frames written so far.
    pub const fn frames_written(&self) -> u64 {
        self.frames_written
    }

    /// Consume the logger and return its writer.
    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }

    fn should_log(&self, summary: &StepSummary) -> bool {
        self.log_every > 0 && summary.frame.checked_rem(self.log_every) == Some(0)
    }

    fn write_frame(&mut self, frame: StepFrame<'_>) -> Result<(), crate::error::EngineError> {
        serde_json::to_writer(&mut self.out, &frame)?;
        // A closed pipe on the consumer side surfaces as a JSON io error.
        self.out.write_all(b"\n").map_err(serde_json::Error::io)?;
        Ok(())
    }
}

impl<W: Write + Send> StepCallback for FrameLogger<W> {
    fn on_step(&mut self, summary: &StepSummary, frame: StepFrame<'_>) {
        if self.should_log(summary) {
            info!(
                frame = summary.frame,
                population = summary.population,
                mutated = summary.mutated,
                disturbance_draws = summary.disturbance_draws,
                "Step"
            );
        }

        if self.emit_frames {
            match self.write_frame(frame) {
                Ok(()) => self.frames_written = self.frames_written.saturating_add(1),
                Err(e) => {
                    warn!(frame = summary.frame, error = %e, "Failed to write frame, disabling frame output");
                    self.emit_frames = false;
                }
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use lifegrid_core::{Parameters, Simulation};

    use super::*;

    fn advance_with(logger: &mut FrameLogger<Vec<u8>>, steps: u64) {
        let params = Parameters::builder().grid_size(6).steps(steps).build().unwrap();
        let mut sim = Simulation::new(params).unwrap();
        while !sim.is_completed() {
            let summary = sim.advance().unwrap();
            logger.on_step(&summary, sim.frame().unwrap());
        }
    }

    #[test]
    fn frames_are_json_lines() {
        let mut logger = FrameLogger::new(0, true, Vec::new());
        advance_with(&mut logger, 3);
        assert_eq!(logger.frames_written(), 3);

        let text = String::from_utf8(logger.into_inner()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);

        for (i, line) in lines.iter().enumerate() {
            let value: serde_json::Value = serde_json::from_str(line).unwrap();
            assert_eq!(value["frame"], serde_json::json!(i));
            assert_eq!(value["grid"]["size"], serde_json::json!(6));
            assert_eq!(value["population_series"].as_array().unwrap().len(), i.saturating_add(1));
        }
    }

    #[test]
    fn frames_off_writes_nothing() {
        let mut logger = FrameLogger::new(1, false, Vec::new());
        advance_with(&mut logger, 4);
        assert_eq!(logger.frames_written(), 0);
        assert!(logger.into_inner().is_empty());
    }

    #[test]
    fn log_cadence() {
        let logger = FrameLogger::new(5, false, Vec::new());
        let summary = |frame: u64| StepSummary {
            frame,
            population: 0,
            mutated: 0,
            disturbance_draws: 0,
            disturbance_activated: 0,
            steps_completed: frame.saturating_add(1),
        };
        assert!(logger.should_log(&summary(0)));
        assert!(!logger.should_log(&summary(3)));
        assert!(logger.should_log(&summary(10)));

        let silent = FrameLogger::new(0, false, Vec::new());
        assert!(!silent.should_log(&summary(0)));
    }
}
