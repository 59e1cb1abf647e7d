// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Task and inspection-step status tracking

use crate::error::EngineError;
use crate::publish;
use patrol_adapters::{Notification, NotifyAdapter, MISSION_RUN_UPDATED};
use patrol_core::{
    Clock, ExternalMissionId, ExternalStepId, ExternalTaskId, Lookup, StepStatus, StepType,
    TaskStatus,
};
use patrol_storage::Store;

/// Outcome of a step update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepUpdate {
    /// Navigation or housekeeping step; not tracked
    Ignored(StepType),
    /// Step found; `true` if its status changed
    Applied(bool),
}

#[derive(Clone)]
pub struct TaskStepTracker<S, N, C> {
    store: S,
    notifier: N,
    clock: C,
}

impl<S, N, C> TaskStepTracker<S, N, C>
where
    S: Store,
    N: NotifyAdapter,
    C: Clock,
{
    pub fn new(store: S, notifier: N, clock: C) -> Self {
        Self {
            store,
            notifier,
            clock,
        }
    }

    /// Returns whether the task's status changed.
    pub async fn update_task_status(
        &self,
        mission_id: &ExternalMissionId,
        task_id: &ExternalTaskId,
        raw_status: &str,
    ) -> Result<bool, EngineError> {
        let status: TaskStatus = raw_status
            .parse()
            .map_err(EngineError::UnrecognizedStatus)?;
        let changed = self
            .store
            .update_task_status(task_id, status, self.clock.now())
            .await?
            .found_or_else(|| EngineError::TaskNotFound(task_id.to_string()))?;
        if changed {
            tracing::info!(mission = %mission_id, task = %task_id, ?status, "task status changed");
        }
        self.republish(mission_id).await?;
        Ok(changed)
    }

    pub async fn update_step_status(
        &self,
        mission_id: &ExternalMissionId,
        step_id: &ExternalStepId,
        raw_step_type: &str,
        raw_status: &str,
    ) -> Result<StepUpdate, EngineError> {
        let step_type: StepType = raw_step_type
            .parse()
            .map_err(EngineError::UnrecognizedStepType)?;
        if !step_type.is_inspection() {
            tracing::trace!(step = %step_id, ?step_type, "ignoring non-inspection step");
            return Ok(StepUpdate::Ignored(step_type));
        }
        let status: StepStatus = raw_status
            .parse()
            .map_err(EngineError::UnrecognizedStatus)?;
        let changed = self
            .store
            .update_step_status(step_id, status)
            .await?
            .found_or_else(|| EngineError::StepNotFound(step_id.to_string()))?;
        if changed {
            tracing::info!(mission = %mission_id, step = %step_id, ?status, "inspection step status changed");
        }
        self.republish(mission_id).await?;
        Ok(StepUpdate::Applied(changed))
    }

    /// Push the containing run's snapshot to clients; a missing run is only logged.
    async fn republish(&self, mission_id: &ExternalMissionId) -> Result<(), EngineError> {
        match self.store.run_by_external(mission_id).await? {
            Lookup::Found(run) => {
                let notification = Notification::new(
                    MISSION_RUN_UPDATED,
                    run.installation_code.clone(),
                    publish::payload(&run),
                );
                publish::send(&self.notifier, notification).await;
            }
            Lookup::NotFound => {
                tracing::warn!(mission = %mission_id, "mission run not found, snapshot not published");
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "tracker_tests.rs"]
mod tests;
