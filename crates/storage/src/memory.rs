// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-process store backed by a [`FleetState`]

use crate::state::{FleetState, RobotPatch, RunTransition};
use crate::store::{Store, StoreError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use patrol_core::{
    AgentId, ExternalMissionId, ExternalStepId, ExternalTaskId, Installation, Lookup,
    MissionDefinition, MissionDefinitionId, MissionRun, MissionRunId, MissionStatus,
    PendingDispatch, Robot, RobotId, SkipException, StepStatus, TaskStatus,
};
#[cfg(any(test, feature = "test-support"))]
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

struct Inner {
    state: Mutex<FleetState>,
    writes: AtomicU64,
    #[cfg(any(test, feature = "test-support"))]
    failures: Mutex<HashMap<&'static str, u32>>,
}

/// Store holding the whole fleet model in memory.
///
/// Each operation takes the state lock once, so every read-modify-write is
/// atomic with respect to other operations. The daemon persists it through
/// [`Snapshot`](crate::Snapshot)s.
#[derive(Clone)]
pub struct MemoryStore {
    inner: Arc<Inner>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new(FleetState::default())
    }
}

impl MemoryStore {
    pub fn new(state: FleetState) -> Self {
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(state),
                writes: AtomicU64::new(0),
                #[cfg(any(test, feature = "test-support"))]
                failures: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// Copy of the current state, for checkpoints.
    pub fn state(&self) -> FleetState {
        self.inner.state.lock().clone()
    }

    /// Number of writes that changed stored state since creation.
    pub fn write_count(&self) -> u64 {
        self.inner.writes.load(Ordering::SeqCst)
    }

    fn wrote(&self) {
        self.inner.writes.fetch_add(1, Ordering::SeqCst);
    }

    /// Make the next `times` calls of operation `op` fail as unavailable.
    #[cfg(any(test, feature = "test-support"))]
    pub fn fail_next(&self, op: &'static str, times: u32) {
        self.inner.failures.lock().insert(op, times);
    }

    #[cfg(any(test, feature = "test-support"))]
    fn check(&self, op: &'static str) -> Result<(), StoreError> {
        let mut failures = self.inner.failures.lock();
        match failures.get_mut(op) {
            Some(remaining) if *remaining > 0 => {
                *remaining -= 1;
                Err(StoreError::Unavailable(format!("injected failure in {op}")))
            }
            _ => Ok(()),
        }
    }

    #[cfg(not(any(test, feature = "test-support")))]
    fn check(&self, _op: &'static str) -> Result<(), StoreError> {
        Ok(())
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn robot(&self, id: &RobotId) -> Result<Lookup<Robot>, StoreError> {
        self.check("robot")?;
        Ok(self.inner.state.lock().robots.get(id).cloned().into())
    }

    async fn robot_by_agent(&self, agent_id: &AgentId) -> Result<Lookup<Robot>, StoreError> {
        self.check("robot_by_agent")?;
        Ok(self.inner.state.lock().robot_by_agent(agent_id).cloned().into())
    }

    async fn robots(&self) -> Result<Vec<Robot>, StoreError> {
        self.check("robots")?;
        let mut robots: Vec<Robot> = self.inner.state.lock().robots.values().cloned().collect();
        robots.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(robots)
    }

    async fn insert_robot(&self, robot: Robot) -> Result<(), StoreError> {
        self.check("insert_robot")?;
        let mut state = self.inner.state.lock();
        if state.robots.contains_key(&robot.id) || state.robot_by_agent(&robot.agent_id).is_some() {
            return Err(StoreError::Duplicate {
                kind: "robot",
                id: robot.agent_id.to_string(),
            });
        }
        state.insert_robot(robot);
        self.wrote();
        Ok(())
    }

    async fn update_robot(
        &self,
        id: &RobotId,
        patch: RobotPatch,
    ) -> Result<Lookup<Robot>, StoreError> {
        self.check("update_robot")?;
        let mut state = self.inner.state.lock();
        if patch.is_empty() {
            return Ok(state.robots.get(id).cloned().into());
        }
        let robot = state.patch_robot(id, patch).cloned();
        if robot.is_some() {
            self.wrote();
        }
        Ok(robot.into())
    }

    async fn assign_mission(
        &self,
        robot_id: &RobotId,
        run_id: &MissionRunId,
    ) -> Result<Lookup<()>, StoreError> {
        self.check("assign_mission")?;
        let assigned = self.inner.state.lock().assign_mission(robot_id, run_id);
        if assigned.is_some() {
            self.wrote();
        }
        Ok(assigned.into())
    }

    async fn clear_mission(
        &self,
        robot_id: &RobotId,
        run_id: &MissionRunId,
    ) -> Result<Lookup<bool>, StoreError> {
        self.check("clear_mission")?;
        let cleared = self.inner.state.lock().clear_mission(robot_id, run_id);
        if cleared == Some(true) {
            self.wrote();
        }
        Ok(cleared.into())
    }

    async fn installation_by_name(&self, name: &str) -> Result<Lookup<Installation>, StoreError> {
        self.check("installation_by_name")?;
        Ok(self.inner.state.lock().installation_by_name(name).cloned().into())
    }

    async fn insert_installation(&self, installation: Installation) -> Result<(), StoreError> {
        self.check("insert_installation")?;
        let mut state = self.inner.state.lock();
        state
            .installations
            .insert(installation.code.clone(), installation);
        self.wrote();
        Ok(())
    }

    async fn run(&self, id: &MissionRunId) -> Result<Lookup<MissionRun>, StoreError> {
        self.check("run")?;
        Ok(self.inner.state.lock().runs.get(id).cloned().into())
    }

    async fn run_by_external(
        &self,
        external_id: &ExternalMissionId,
    ) -> Result<Lookup<MissionRun>, StoreError> {
        self.check("run_by_external")?;
        Ok(self.inner.state.lock().run_by_external(external_id).cloned().into())
    }

    async fn insert_run(&self, run: MissionRun) -> Result<(), StoreError> {
        self.check("insert_run")?;
        let mut state = self.inner.state.lock();
        let live_duplicate = state
            .runs
            .values()
            .any(|r| r.external_id == run.external_id && !r.is_terminal());
        if state.runs.contains_key(&run.id) || (live_duplicate && !run.is_terminal()) {
            return Err(StoreError::Duplicate {
                kind: "mission run",
                id: run.external_id.to_string(),
            });
        }
        state.runs.insert(run.id.clone(), run);
        self.wrote();
        Ok(())
    }

    async fn transition_run(
        &self,
        id: &MissionRunId,
        expected: MissionStatus,
        next: MissionStatus,
        at: DateTime<Utc>,
    ) -> Result<Lookup<RunTransition>, StoreError> {
        self.check("transition_run")?;
        let outcome = self.inner.state.lock().transition_run(id, expected, next, at);
        if matches!(outcome, Some(RunTransition::Applied(_))) {
            self.wrote();
        }
        Ok(outcome.into())
    }

    async fn update_task_status(
        &self,
        task_id: &ExternalTaskId,
        status: TaskStatus,
        at: DateTime<Utc>,
    ) -> Result<Lookup<bool>, StoreError> {
        self.check("update_task_status")?;
        let changed = self.inner.state.lock().update_task_status(task_id, status, at);
        if changed == Some(true) {
            self.wrote();
        }
        Ok(changed.into())
    }

    async fn update_step_status(
        &self,
        step_id: &ExternalStepId,
        status: StepStatus,
    ) -> Result<Lookup<bool>, StoreError> {
        self.check("update_step_status")?;
        let changed = self.inner.state.lock().update_step_status(step_id, status);
        if changed == Some(true) {
            self.wrote();
        }
        Ok(changed.into())
    }

    async fn terminal_runs_for_model(
        &self,
        robot_type: &str,
        limit: usize,
    ) -> Result<Vec<MissionRun>, StoreError> {
        self.check("terminal_runs_for_model")?;
        Ok(self
            .inner
            .state
            .lock()
            .terminal_runs_for_model(robot_type, limit))
    }

    async fn definition(
        &self,
        id: &MissionDefinitionId,
    ) -> Result<Lookup<MissionDefinition>, StoreError> {
        self.check("definition")?;
        Ok(self.inner.state.lock().definitions.get(id).cloned().into())
    }

    async fn definitions(&self) -> Result<Vec<MissionDefinition>, StoreError> {
        self.check("definitions")?;
        let mut definitions: Vec<MissionDefinition> = self
            .inner
            .state
            .lock()
            .definitions
            .values()
            .cloned()
            .collect();
        definitions.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(definitions)
    }

    async fn insert_definition(&self, definition: MissionDefinition) -> Result<(), StoreError> {
        self.check("insert_definition")?;
        let mut state = self.inner.state.lock();
        state.definitions.insert(definition.id.clone(), definition);
        self.wrote();
        Ok(())
    }

    async fn set_last_run(
        &self,
        id: &MissionDefinitionId,
        run_id: &MissionRunId,
    ) -> Result<Lookup<()>, StoreError> {
        self.check("set_last_run")?;
        let set = self.inner.state.lock().set_last_run(id, run_id);
        if set.is_some() {
            self.wrote();
        }
        Ok(set.into())
    }

    async fn add_skip(
        &self,
        id: &MissionDefinitionId,
        skip: SkipException,
        prune_before: DateTime<Utc>,
    ) -> Result<Lookup<MissionDefinition>, StoreError> {
        self.check("add_skip")?;
        let updated = self
            .inner
            .state
            .lock()
            .add_skip(id, skip, prune_before)
            .cloned();
        if updated.is_some() {
            self.wrote();
        }
        Ok(updated.into())
    }

    async fn mark_dispatched(
        &self,
        id: &MissionDefinitionId,
        occurrence: DateTime<Utc>,
    ) -> Result<Lookup<bool>, StoreError> {
        self.check("mark_dispatched")?;
        let claimed = self.inner.state.lock().mark_dispatched(id, occurrence);
        if claimed == Some(true) {
            self.wrote();
        }
        Ok(claimed.into())
    }

    async fn release_dispatched(
        &self,
        id: &MissionDefinitionId,
        occurrence: DateTime<Utc>,
        previous: Option<DateTime<Utc>>,
    ) -> Result<Lookup<bool>, StoreError> {
        self.check("release_dispatched")?;
        let released = self
            .inner
            .state
            .lock()
            .release_dispatched(id, occurrence, previous);
        if released == Some(true) {
            self.wrote();
        }
        Ok(released.into())
    }

    async fn claim_robot(
        &self,
        robot_id: &RobotId,
        claim: PendingDispatch,
        stale_before: DateTime<Utc>,
    ) -> Result<Lookup<bool>, StoreError> {
        self.check("claim_robot")?;
        let claimed = self
            .inner
            .state
            .lock()
            .claim_robot(robot_id, claim, stale_before);
        if claimed == Some(true) {
            self.wrote();
        }
        Ok(claimed.into())
    }

    async fn release_robot(
        &self,
        robot_id: &RobotId,
        claim: &PendingDispatch,
    ) -> Result<Lookup<bool>, StoreError> {
        self.check("release_robot")?;
        let released = self.inner.state.lock().release_robot(robot_id, claim);
        if released == Some(true) {
            self.wrote();
        }
        Ok(released.into())
    }

    async fn task_duration(&self, robot_type: &str) -> Result<Option<f64>, StoreError> {
        self.check("task_duration")?;
        Ok(self.inner.state.lock().task_durations.get(robot_type).copied())
    }

    async fn set_task_duration(&self, robot_type: &str, seconds: f64) -> Result<(), StoreError> {
        self.check("set_task_duration")?;
        self.inner
            .state
            .lock()
            .task_durations
            .insert(robot_type.to_string(), seconds);
        self.wrote();
        Ok(())
    }
}

#[cfg(test)]
#[path = "memory_tests.rs"]
mod tests;
