// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Persistence collaborator interface

use crate::state::{RobotPatch, RunTransition};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use patrol_core::{
    AgentId, ExternalMissionId, ExternalStepId, ExternalTaskId, Installation, Lookup,
    MissionDefinition, MissionDefinitionId, MissionRun, MissionRunId, MissionStatus,
    PendingDispatch, Robot, RobotId, SkipException, StepStatus, TaskStatus,
};
use thiserror::Error;

/// Errors from store operations.
///
/// Absence of an entity is not an error; it is reported as
/// [`Lookup::NotFound`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Transient failure; the operation may succeed if retried
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("{kind} '{id}' already exists")]
    Duplicate { kind: &'static str, id: String },
}

impl StoreError {
    pub fn is_transient(&self) -> bool {
        matches!(self, StoreError::Unavailable(_))
    }
}

/// Read and write access to the fleet model.
///
/// Writes that take an expected value are compare-and-set: they apply only
/// if the stored value still matches, which is how callers detect stale
/// updates without holding locks across awaits.
#[async_trait]
pub trait Store: Clone + Send + Sync + 'static {
    // -- robots --
    async fn robot(&self, id: &RobotId) -> Result<Lookup<Robot>, StoreError>;
    async fn robot_by_agent(&self, agent_id: &AgentId) -> Result<Lookup<Robot>, StoreError>;
    async fn robots(&self) -> Result<Vec<Robot>, StoreError>;
    async fn insert_robot(&self, robot: Robot) -> Result<(), StoreError>;
    /// Apply a patch as one write. An empty patch performs no write.
    async fn update_robot(&self, id: &RobotId, patch: RobotPatch)
        -> Result<Lookup<Robot>, StoreError>;
    async fn assign_mission(
        &self,
        robot_id: &RobotId,
        run_id: &MissionRunId,
    ) -> Result<Lookup<()>, StoreError>;
    /// Clear the robot's current run if it is still `run_id`; `Found(cleared)`.
    async fn clear_mission(
        &self,
        robot_id: &RobotId,
        run_id: &MissionRunId,
    ) -> Result<Lookup<bool>, StoreError>;

    // -- installations --
    async fn installation_by_name(&self, name: &str) -> Result<Lookup<Installation>, StoreError>;
    async fn insert_installation(&self, installation: Installation) -> Result<(), StoreError>;

    // -- mission runs --
    async fn run(&self, id: &MissionRunId) -> Result<Lookup<MissionRun>, StoreError>;
    async fn run_by_external(
        &self,
        external_id: &ExternalMissionId,
    ) -> Result<Lookup<MissionRun>, StoreError>;
    async fn insert_run(&self, run: MissionRun) -> Result<(), StoreError>;
    async fn transition_run(
        &self,
        id: &MissionRunId,
        expected: MissionStatus,
        next: MissionStatus,
        at: DateTime<Utc>,
    ) -> Result<Lookup<RunTransition>, StoreError>;
    /// `Found(changed)` when the task exists.
    async fn update_task_status(
        &self,
        task_id: &ExternalTaskId,
        status: TaskStatus,
        at: DateTime<Utc>,
    ) -> Result<Lookup<bool>, StoreError>;
    async fn update_step_status(
        &self,
        step_id: &ExternalStepId,
        status: StepStatus,
    ) -> Result<Lookup<bool>, StoreError>;
    async fn terminal_runs_for_model(
        &self,
        robot_type: &str,
        limit: usize,
    ) -> Result<Vec<MissionRun>, StoreError>;

    // -- mission definitions --
    async fn definition(
        &self,
        id: &MissionDefinitionId,
    ) -> Result<Lookup<MissionDefinition>, StoreError>;
    async fn definitions(&self) -> Result<Vec<MissionDefinition>, StoreError>;
    async fn insert_definition(&self, definition: MissionDefinition) -> Result<(), StoreError>;
    async fn set_last_run(
        &self,
        id: &MissionDefinitionId,
        run_id: &MissionRunId,
    ) -> Result<Lookup<()>, StoreError>;
    async fn add_skip(
        &self,
        id: &MissionDefinitionId,
        skip: SkipException,
        prune_before: DateTime<Utc>,
    ) -> Result<Lookup<MissionDefinition>, StoreError>;
    /// Claim an occurrence for dispatch; `Found(false)` if already claimed.
    async fn mark_dispatched(
        &self,
        id: &MissionDefinitionId,
        occurrence: DateTime<Utc>,
    ) -> Result<Lookup<bool>, StoreError>;
    async fn release_dispatched(
        &self,
        id: &MissionDefinitionId,
        occurrence: DateTime<Utc>,
        previous: Option<DateTime<Utc>>,
    ) -> Result<Lookup<bool>, StoreError>;

    /// Reserve a robot for a dispatch; `Found(false)` while a live claim holds it.
    async fn claim_robot(
        &self,
        robot_id: &RobotId,
        claim: PendingDispatch,
        stale_before: DateTime<Utc>,
    ) -> Result<Lookup<bool>, StoreError>;
    async fn release_robot(
        &self,
        robot_id: &RobotId,
        claim: &PendingDispatch,
    ) -> Result<Lookup<bool>, StoreError>;

    // -- estimates --
    async fn task_duration(&self, robot_type: &str) -> Result<Option<f64>, StoreError>;
    async fn set_task_duration(&self, robot_type: &str, seconds: f64) -> Result<(), StoreError>;
}
