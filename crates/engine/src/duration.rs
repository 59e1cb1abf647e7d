// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Average task duration per robot model, used for ETA estimates

use crate::error::EngineError;
use patrol_core::{MissionRun, TaskStatus};
use patrol_storage::Store;

/// Mean duration in seconds of successful, timed tasks across `runs`.
pub fn average_task_seconds(runs: &[MissionRun]) -> Option<f64> {
    let samples: Vec<f64> = runs
        .iter()
        .flat_map(|run| run.tasks.iter())
        .filter(|task| task.status == TaskStatus::Successful)
        .filter_map(|task| task.duration())
        .map(|d| d.num_milliseconds() as f64 / 1000.0)
        .collect();
    if samples.is_empty() {
        return None;
    }
    Some(samples.iter().sum::<f64>() / samples.len() as f64)
}

#[derive(Clone)]
pub struct DurationEstimator<S> {
    store: S,
    sample_runs: usize,
}

impl<S: Store> DurationEstimator<S> {
    pub fn new(store: S, sample_runs: usize) -> Self {
        Self { store, sample_runs }
    }

    /// Recompute and store the average for `robot_type`.
    ///
    /// Returns the new average, or `None` when there is nothing to average
    /// (the stored value is then left as is).
    pub async fn recompute(&self, robot_type: &str) -> Result<Option<f64>, EngineError> {
        let runs = self
            .store
            .terminal_runs_for_model(robot_type, self.sample_runs)
            .await?;
        let Some(average) = average_task_seconds(&runs) else {
            return Ok(None);
        };
        self.store.set_task_duration(robot_type, average).await?;
        tracing::debug!(robot_type, average, runs = runs.len(), "task duration estimate updated");
        Ok(Some(average))
    }
}

#[cfg(test)]
#[path = "duration_tests.rs"]
mod tests;
