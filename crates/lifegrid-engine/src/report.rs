//! End-of-run report.
//!
//! The report is the machine-readable record of a run: which parameters
//! produced it, how it ended, and the full population series.

use chrono::{DateTime, Utc};
use lifegrid_core::runner::SimulationResult;
use lifegrid_core::{Parameters, PopulationSeries, PopulationStats, Simulation, SimulationEndReason};
use serde::Serialize;
use uuid::Uuid;

/// Record of one engine run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    /// Time-ordered run identifier.
    pub run_id: Uuid,
    /// When the driving loop started.
    pub started_at: DateTime<Utc>,
    /// When the driving loop returned.
    pub finished_at: DateTime<Utc>,
    /// Parameters the run used, seed included.
    pub parameters: Parameters,
    /// Why the run ended.
    pub end_reason: SimulationEndReason,
    /// Steps executed by the driving loop.
    pub steps_run: u64,
    /// Population after each step.
    pub population_series: PopulationSeries,
    /// Summary statistics over `population_series`.
    pub stats: Option<PopulationStats>,
}

impl RunReport {
    /// Build a report from the final simulation state.
    pub fn new(
        sim: &Simulation,
        result: &SimulationResult,
        started_at: DateTime<Utc>,
        finished_at: DateTime<Utc>,
    ) -> Self {
        let population_series = sim.population_series().clone();
        Self {
            run_id: Uuid::now_v7(),
            started_at,
            finished_at,
            parameters: sim.params().clone(),
            end_reason: result.end_reason,
            steps_run: result.steps_run,
            stats: population_series.stats(),
            population_series,
        }
    }

    /// Serialize as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns the serializer error if a value cannot be encoded.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn finished(steps: u64, seed: u64) -> (Simulation, SimulationResult) {
        let params = Parameters::builder()
            .grid_size(8)
            .steps(steps)
            .seed(seed)
            .build()
            .unwrap();
        let mut sim = Simulation::new(params).unwrap();
        let mut last = None;
        while !sim.is_completed() {
            last = Some(sim.advance().unwrap());
        }
        let result = SimulationResult {
            end_reason: SimulationEndReason::Completed,
            final_summary: last,
            steps_run: steps,
        };
        (sim, result)
    }

    #[test]
    fn report_carries_series_and_stats() {
        let (sim, result) = finished(12, 5);
        let now = Utc::now();
        let report = RunReport::new(&sim, &result, now, now);

        assert_eq!(report.steps_run, 12);
        assert_eq!(report.population_series.len(), 12);
        assert_eq!(report.parameters.seed(), 5);

        let stats = report.stats.unwrap();
        assert_eq!(Some(stats.last), sim.population_series().last());
        assert!(stats.min <= stats.max);
    }

    #[test]
    fn json_shape() {
        let (sim, result) = finished(3, 1);
        let now = Utc::now();
        let json = RunReport::new(&sim, &result, now, now).to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["end_reason"], "Completed");
        assert_eq!(value["parameters"]["seed"], 1);
        assert_eq!(value["parameters"]["grid_size"], 8);
        assert_eq!(value["population_series"].as_array().unwrap().len(), 3);
        assert!(value["run_id"].is_string());
    }

    #[test]
    fn run_ids_are_unique() {
        let (sim, result) = finished(1, 2);
        let now = Utc::now();
        let a = RunReport::new(&sim, &result, now, now);
        let b = RunReport::new(&sim, &result, now, now);
        assert_ne!(a.run_id, b.run_id);
    }

    #[test]
    fn stopped_run_without_steps_has_no_stats() {
        let params = Parameters::builder().grid_size(4).steps(10).build().unwrap();
        let sim = Simulation::new(params).unwrap();
        let result = SimulationResult {
            end_reason: SimulationEndReason::StopRequested,
            final_summary: None,
            steps_run: 0,
        };
        let now = Utc::now();
        let report = RunReport::new(&sim, &result, now, now);
        assert!(report.stats.is_none());
        assert!(report.population_series.is_empty());
    }
}
