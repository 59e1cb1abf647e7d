// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Materialized fleet state.
//!
//! Every mutation is a short read-modify-write that reports whether it
//! changed anything, so callers can skip follow-up work for stale updates.

use chrono::{DateTime, Utc};
use patrol_core::{
    AgentId, AreaId, BatteryState, ExternalMissionId, ExternalStepId, ExternalTaskId,
    Installation, MissionDefinition, MissionDefinitionId, MissionRun, MissionRunId,
    MissionStatus, PendingDispatch, Pose, Robot, RobotCapability, RobotId, RobotStatus,
    SkipException, StepStatus, TaskStatus, VideoStream,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Field-level update of a robot. `None` leaves the field untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RobotPatch {
    pub status: Option<RobotStatus>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub installation_code: Option<String>,
    pub capabilities: Option<Vec<RobotCapability>>,
    pub video_streams: Option<Vec<VideoStream>>,
    pub battery_level: Option<f32>,
    pub battery_state: Option<BatteryState>,
    pub pressure_level: Option<f32>,
    pub pose: Option<Pose>,
    pub current_area: Option<Option<AreaId>>,
}

impl RobotPatch {
    pub fn is_empty(&self) -> bool {
        *self == RobotPatch::default()
    }

    fn apply(self, robot: &mut Robot) {
        if let Some(status) = self.status {
            robot.status = status;
        }
        if let Some(host) = self.host {
            robot.host = host;
        }
        if let Some(port) = self.port {
            robot.port = port;
        }
        if let Some(code) = self.installation_code {
            robot.installation_code = code;
        }
        if let Some(capabilities) = self.capabilities {
            robot.capabilities = Some(capabilities);
        }
        if let Some(streams) = self.video_streams {
            robot.video_streams = streams;
        }
        if let Some(level) = self.battery_level {
            robot.battery_level = level;
        }
        if let Some(state) = self.battery_state {
            robot.battery_state = Some(state);
        }
        if let Some(level) = self.pressure_level {
            robot.pressure_level = Some(level);
        }
        if let Some(pose) = self.pose {
            robot.pose = Some(pose);
        }
        if let Some(area) = self.current_area {
            robot.current_area = area;
        }
    }
}

/// Outcome of a compare-and-set on a run's status
#[derive(Debug, Clone, PartialEq)]
pub enum RunTransition {
    /// The run moved from the expected status; carries the updated run
    Applied(MissionRun),
    /// The run was no longer in the expected status; carries its current state
    Stale(MissionRun),
}

/// Complete fleet model held by the store and written to snapshots
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FleetState {
    #[serde(default)]
    pub robots: HashMap<RobotId, Robot>,
    #[serde(default)]
    pub installations: HashMap<String, Installation>,
    #[serde(default)]
    pub definitions: HashMap<MissionDefinitionId, MissionDefinition>,
    #[serde(default)]
    pub runs: HashMap<MissionRunId, MissionRun>,
    /// Average task duration in seconds, keyed by robot model type
    #[serde(default)]
    pub task_durations: HashMap<String, f64>,
}

impl FleetState {
    pub fn robot_by_agent(&self, agent_id: &AgentId) -> Option<&Robot> {
        self.robots.values().find(|r| &r.agent_id == agent_id)
    }

    pub fn installation_by_name(&self, name: &str) -> Option<&Installation> {
        self.installations.values().find(|i| i.matches_name(name))
    }

    /// Find a run by its agent-assigned id.
    ///
    /// External ids are unique among non-terminal runs only, so a live run
    /// wins over finished ones; among finished runs the newest wins.
    pub fn run_by_external(&self, external_id: &ExternalMissionId) -> Option<&MissionRun> {
        self.runs
            .values()
            .filter(|r| &r.external_id == external_id)
            .max_by_key(|r| (!r.is_terminal(), r.created_at))
    }

    pub fn insert_robot(&mut self, robot: Robot) {
        self.robots.insert(robot.id.clone(), robot);
    }

    pub fn patch_robot(&mut self, id: &RobotId, patch: RobotPatch) -> Option<&Robot> {
        let robot = self.robots.get_mut(id)?;
        patch.apply(robot);
        Some(robot)
    }

    /// Point the robot at `run_id`. Returns `None` if the robot is unknown.
    pub fn assign_mission(&mut self, robot_id: &RobotId, run_id: &MissionRunId) -> Option<()> {
        let robot = self.robots.get_mut(robot_id)?;
        robot.current_mission_run = Some(run_id.clone());
        robot.pending_dispatch = None;
        Some(())
    }

    /// Clear the robot's current run if it is still `run_id`.
    ///
    /// Returns `Some(true)` when cleared, `Some(false)` when the robot had
    /// moved on to another run, `None` when the robot is unknown.
    pub fn clear_mission(&mut self, robot_id: &RobotId, run_id: &MissionRunId) -> Option<bool> {
        let robot = self.robots.get_mut(robot_id)?;
        match &robot.current_mission_run {
            Some(current) if current == run_id => {
                robot.current_mission_run = None;
                robot.pending_dispatch = None;
                Some(true)
            }
            _ => Some(false),
        }
    }

    pub fn transition_run(
        &mut self,
        run_id: &MissionRunId,
        expected: MissionStatus,
        next: MissionStatus,
        at: DateTime<Utc>,
    ) -> Option<RunTransition> {
        let run = self.runs.get_mut(run_id)?;
        if run.status != expected {
            return Some(RunTransition::Stale(run.clone()));
        }
        run.status = next;
        if next == MissionStatus::InProgress && run.started_at.is_none() {
            run.started_at = Some(at);
        }
        if next.is_terminal() {
            run.ended_at = Some(at);
        }
        Some(RunTransition::Applied(run.clone()))
    }

    /// Update a task by external id, preferring tasks of live runs.
    ///
    /// Returns `Some(changed)` when the task was found.
    pub fn update_task_status(
        &mut self,
        task_id: &ExternalTaskId,
        status: TaskStatus,
        at: DateTime<Utc>,
    ) -> Option<bool> {
        let task = self
            .runs
            .values_mut()
            .filter(|r| r.tasks.iter().any(|t| &t.external_id == task_id))
            .max_by_key(|r| (!r.is_terminal(), r.created_at))?
            .tasks
            .iter_mut()
            .find(|t| &t.external_id == task_id)?;
        if task.status == status {
            return Some(false);
        }
        task.status = status;
        if status == TaskStatus::InProgress && task.started_at.is_none() {
            task.started_at = Some(at);
        }
        if status.is_terminal() {
            task.ended_at = Some(at);
        }
        Some(true)
    }

    pub fn update_step_status(
        &mut self,
        step_id: &ExternalStepId,
        status: StepStatus,
    ) -> Option<bool> {
        let step = self
            .runs
            .values_mut()
            .filter(|r| {
                r.tasks
                    .iter()
                    .any(|t| t.steps.iter().any(|s| &s.external_id == step_id))
            })
            .max_by_key(|r| (!r.is_terminal(), r.created_at))?
            .tasks
            .iter_mut()
            .flat_map(|t| t.steps.iter_mut())
            .find(|s| &s.external_id == step_id)?;
        if step.status == status {
            return Some(false);
        }
        step.status = status;
        Some(true)
    }

    pub fn set_last_run(&mut self, id: &MissionDefinitionId, run_id: &MissionRunId) -> Option<()> {
        let definition = self.definitions.get_mut(id)?;
        definition.last_run = Some(run_id.clone());
        Some(())
    }

    /// Add a skip exception and drop exceptions dated before `prune_before`.
    pub fn add_skip(
        &mut self,
        id: &MissionDefinitionId,
        skip: SkipException,
        prune_before: DateTime<Utc>,
    ) -> Option<&MissionDefinition> {
        let definition = self.definitions.get_mut(id)?;
        let today = prune_before.date_naive();
        definition.skip_exceptions.retain(|s| s.date >= today);
        if !definition.skip_exceptions.contains(&skip) {
            definition.skip_exceptions.push(skip);
        }
        Some(definition)
    }

    /// Claim `occurrence` for dispatch.
    ///
    /// Succeeds only if no occurrence at or after it was claimed before.
    pub fn mark_dispatched(
        &mut self,
        id: &MissionDefinitionId,
        occurrence: DateTime<Utc>,
    ) -> Option<bool> {
        let definition = self.definitions.get_mut(id)?;
        match definition.last_dispatched {
            Some(claimed) if claimed >= occurrence => Some(false),
            _ => {
                definition.last_dispatched = Some(occurrence);
                Some(true)
            }
        }
    }

    /// Undo a claim made by [`mark_dispatched`](Self::mark_dispatched).
    pub fn release_dispatched(
        &mut self,
        id: &MissionDefinitionId,
        occurrence: DateTime<Utc>,
        previous: Option<DateTime<Utc>>,
    ) -> Option<bool> {
        let definition = self.definitions.get_mut(id)?;
        if definition.last_dispatched != Some(occurrence) {
            return Some(false);
        }
        definition.last_dispatched = previous;
        Some(true)
    }

    /// Reserve `robot_id` for a dispatch unless a live claim already holds it.
    pub fn claim_robot(
        &mut self,
        robot_id: &RobotId,
        claim: PendingDispatch,
        stale_before: DateTime<Utc>,
    ) -> Option<bool> {
        let robot = self.robots.get_mut(robot_id)?;
        if robot.awaiting_dispatch(stale_before) {
            return Some(false);
        }
        robot.pending_dispatch = Some(claim);
        Some(true)
    }

    /// Undo a claim made by [`claim_robot`](Self::claim_robot).
    pub fn release_robot(&mut self, robot_id: &RobotId, claim: &PendingDispatch) -> Option<bool> {
        let robot = self.robots.get_mut(robot_id)?;
        if robot.pending_dispatch.as_ref() != Some(claim) {
            return Some(false);
        }
        robot.pending_dispatch = None;
        Some(true)
    }

    /// Most recent terminal runs executed by robots of `robot_type`.
    pub fn terminal_runs_for_model(&self, robot_type: &str, limit: usize) -> Vec<MissionRun> {
        let mut runs: Vec<&MissionRun> = self
            .runs
            .values()
            .filter(|r| r.is_terminal())
            .filter(|r| {
                self.robots
                    .get(&r.robot_id)
                    .is_some_and(|robot| robot.robot_type == robot_type)
            })
            .collect();
        runs.sort_by_key(|r| std::cmp::Reverse(r.ended_at.unwrap_or(r.created_at)));
        runs.into_iter().take(limit).cloned().collect()
    }
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
