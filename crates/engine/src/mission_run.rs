// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Mission run state machine and completion pipeline.
//!
//! Status changes are compare-and-set against the stored status, so when
//! the same terminal status is delivered concurrently exactly one caller
//! wins the transition and runs the completion pipeline.

use crate::duration::DurationEstimator;
use crate::error::EngineError;
use crate::publish;
use crate::retry::RetryPolicy;
use patrol_adapters::{Notification, NotifyAdapter, MISSION_RUN_UPDATED};
use patrol_core::{
    Clock, ExternalMissionId, Lookup, MissionRun, MissionStatus, SchedulerSignal,
};
use patrol_storage::{RobotPatch, RunTransition, Store};
use tokio::task::JoinHandle;

/// Alert title for failed localization runs
pub const LOCALIZATION_FAILED: &str = "Failed Localization Mission";

/// Re-reads after losing a compare-and-set before giving up
const MAX_CAS_ATTEMPTS: usize = 5;

/// What the completion pipeline did
#[derive(Debug)]
pub struct Completion {
    /// Always present: completion, not success, frees the robot
    pub signal: SchedulerSignal,
    /// Names of pipeline steps that failed and were skipped over
    pub failed_steps: Vec<&'static str>,
    /// Background duration recompute, if one was started
    pub recompute: Option<JoinHandle<()>>,
}

/// Outcome of [`MissionRunMachine::advance_status`]
#[derive(Debug)]
pub enum Advance {
    /// Re-delivery of the current status
    Unchanged(MissionRun),
    /// Backward transition or transition out of a terminal status
    Ignored {
        run: MissionRun,
        requested: MissionStatus,
    },
    Applied {
        run: MissionRun,
        completion: Option<Completion>,
    },
}

impl Advance {
    pub fn run(&self) -> &MissionRun {
        match self {
            Advance::Unchanged(run) | Advance::Ignored { run, .. } | Advance::Applied { run, .. } => {
                run
            }
        }
    }

    pub fn completion(&self) -> Option<&Completion> {
        match self {
            Advance::Applied { completion, .. } => completion.as_ref(),
            _ => None,
        }
    }
}

#[derive(Clone)]
pub struct MissionRunMachine<S, N, C> {
    store: S,
    notifier: N,
    clock: C,
    retry: RetryPolicy,
    estimator: DurationEstimator<S>,
}

impl<S, N, C> MissionRunMachine<S, N, C>
where
    S: Store,
    N: NotifyAdapter,
    C: Clock,
{
    pub fn new(
        store: S,
        notifier: N,
        clock: C,
        retry: RetryPolicy,
        estimator: DurationEstimator<S>,
    ) -> Self {
        Self {
            store,
            notifier,
            clock,
            retry,
            estimator,
        }
    }

    pub fn parse_status(raw: &str) -> Result<MissionStatus, EngineError> {
        raw.parse().map_err(EngineError::UnrecognizedStatus)
    }

    /// Apply a reported status to the run with agent-assigned id `external_id`.
    ///
    /// Unrecognized tokens are rejected before any lookup. A missing run is
    /// `RunNotFound`, which callers treat as expected.
    pub async fn advance_status(
        &self,
        external_id: &ExternalMissionId,
        raw_status: &str,
    ) -> Result<Advance, EngineError> {
        let status = Self::parse_status(raw_status)?;
        let mut run = self
            .store
            .run_by_external(external_id)
            .await?
            .found_or_else(|| EngineError::RunNotFound(external_id.to_string()))?;

        for _ in 0..MAX_CAS_ATTEMPTS {
            if run.status == status {
                return Ok(Advance::Unchanged(run));
            }
            if !run.status.can_transition_to(status) {
                tracing::warn!(
                    run = %run.id,
                    mission = %external_id,
                    from = %run.status,
                    to = %status,
                    "ignoring out-of-order mission status"
                );
                return Ok(Advance::Ignored {
                    run,
                    requested: status,
                });
            }

            let transition = self
                .store
                .transition_run(&run.id, run.status, status, self.clock.now())
                .await?
                .found_or_else(|| EngineError::RunNotFound(external_id.to_string()))?;
            match transition {
                RunTransition::Stale(current) => run = current,
                RunTransition::Applied(updated) => {
                    tracing::info!(
                        run = %updated.id,
                        mission = %external_id,
                        from = %run.status,
                        to = %status,
                        "mission run status changed"
                    );
                    self.publish_run(&updated).await;
                    let completion = if status.is_terminal() {
                        Some(self.complete(&updated).await)
                    } else {
                        None
                    };
                    return Ok(Advance::Applied {
                        run: updated,
                        completion,
                    });
                }
            }
        }

        tracing::warn!(run = %run.id, to = %status, "mission status kept changing, giving up");
        Ok(Advance::Ignored {
            run,
            requested: status,
        })
    }

    /// Run the completion steps for a run that just became terminal.
    ///
    /// Every step handles its own failure; the completion signal is
    /// produced no matter which steps failed.
    async fn complete(&self, run: &MissionRun) -> Completion {
        let mut failed_steps = Vec::new();

        let cleared = self
            .retry
            .run("clear_current_mission", || {
                self.store.clear_mission(&run.robot_id, &run.id)
            })
            .await;
        match cleared {
            Ok(Lookup::Found(true)) => {}
            Ok(Lookup::Found(false)) => {
                tracing::debug!(robot = %run.robot_id, run = %run.id, "robot already on another run");
            }
            Ok(Lookup::NotFound) => {
                let e = EngineError::RobotNotFound(run.robot_id.to_string());
                tracing::warn!(run = %run.id, error = %e, "cannot clear current mission");
                failed_steps.push("clear_current_mission");
            }
            Err(e) => {
                tracing::error!(run = %run.id, error = %e, "failed to clear current mission");
                failed_steps.push("clear_current_mission");
            }
        }

        if run.is_localization() {
            if let Err(e) = self.apply_localization(run).await {
                log_step_error("localization", run, &e);
                failed_steps.push("localization");
            }
        }

        let signal = SchedulerSignal::MissionCompleted {
            robot_id: run.robot_id.clone(),
        };

        if let Some(definition_id) = &run.definition_id {
            let recorded = self
                .retry
                .run("set_last_run", || self.store.set_last_run(definition_id, &run.id))
                .await;
            match recorded {
                Ok(Lookup::Found(())) => {}
                Ok(Lookup::NotFound) => {
                    let e = EngineError::DefinitionNotFound(definition_id.to_string());
                    log_step_error("set_last_run", run, &e);
                    failed_steps.push("set_last_run");
                }
                Err(e) => {
                    log_step_error("set_last_run", run, &e.into());
                    failed_steps.push("set_last_run");
                }
            }
        }

        let recompute = match self.spawn_recompute(run).await {
            Ok(handle) => Some(handle),
            Err(e) => {
                log_step_error("duration_recompute", run, &e);
                failed_steps.push("duration_recompute");
                None
            }
        };

        tracing::info!(
            run = %run.id,
            robot = %run.robot_id,
            status = %run.status,
            failed_steps = failed_steps.len(),
            "mission run completed"
        );
        Completion {
            signal,
            failed_steps,
            recompute,
        }
    }

    async fn apply_localization(&self, run: &MissionRun) -> Result<(), EngineError> {
        let area = if run.status.is_successful() {
            run.area.clone()
        } else {
            None
        };
        let patch = RobotPatch {
            current_area: Some(area),
            ..RobotPatch::default()
        };
        let robot = self
            .retry
            .run("update_current_area", || {
                self.store.update_robot(&run.robot_id, patch.clone())
            })
            .await?
            .found_or_else(|| EngineError::RobotNotFound(run.robot_id.to_string()))?;

        if !run.status.is_successful() {
            tracing::error!(robot = %robot.name, run = %run.id, "localization mission failed");
            let message = format!("Failed localization mission for robot {}.", robot.name);
            publish::send(
                &self.notifier,
                Notification::alert(robot.installation_code.clone(), LOCALIZATION_FAILED, &message),
            )
            .await;
        }
        Ok(())
    }

    /// Start the per-model duration recompute in the background.
    async fn spawn_recompute(&self, run: &MissionRun) -> Result<JoinHandle<()>, EngineError> {
        let robot = self
            .store
            .robot(&run.robot_id)
            .await?
            .found_or_else(|| EngineError::RobotNotFound(run.robot_id.to_string()))?;
        let estimator = self.estimator.clone();
        let robot_type = robot.robot_type;
        Ok(tokio::spawn(async move {
            if let Err(e) = estimator.recompute(&robot_type).await {
                tracing::error!(robot_type = %robot_type, error = %e, "task duration recompute failed");
            }
        }))
    }

    async fn publish_run(&self, run: &MissionRun) {
        let notification = Notification::new(
            MISSION_RUN_UPDATED,
            run.installation_code.clone(),
            publish::payload(run),
        );
        publish::send(&self.notifier, notification).await;
    }
}

fn log_step_error(step: &'static str, run: &MissionRun, e: &EngineError) {
    if e.is_not_found() {
        tracing::warn!(step, run = %run.id, error = %e, "completion step skipped");
    } else {
        tracing::error!(step, run = %run.id, error = %e, "completion step failed");
    }
}

#[cfg(test)]
#[path = "mission_run_tests.rs"]
mod tests;
