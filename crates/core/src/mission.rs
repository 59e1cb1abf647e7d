// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Mission runs, their tasks and inspection steps.
//!
//! Runs are created by the external dispatcher and afterwards mutated only
//! by status telemetry. Agents report statuses as free-form tokens
//! (`in_progress`, `InProgress`, ...) which are parsed here.

use crate::definition::MissionDefinitionId;
use crate::installation::AreaId;
use crate::robot::RobotId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

crate::define_id! {
    /// Internal identifier of a mission run.
    pub struct MissionRunId;
}

crate::define_id! {
    /// Agent-assigned mission id, used to correlate telemetry with a run.
    pub struct ExternalMissionId;
}

crate::define_id! {
    /// Agent-assigned task id.
    pub struct ExternalTaskId;
}

crate::define_id! {
    /// Agent-assigned inspection step id.
    pub struct ExternalStepId;
}

/// A status or type token that is not part of the known vocabulary
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unrecognized {kind} '{token}'")]
pub struct ParseError {
    pub kind: &'static str,
    pub token: String,
}

/// Normalize `InProgress`, `in_progress` and `in-progress` to `inprogress`.
fn normalize(token: &str) -> String {
    token
        .chars()
        .filter(|c| *c != '_' && *c != '-' && !c.is_whitespace())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Lifecycle status of a mission run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissionStatus {
    Pending,
    InProgress,
    Paused,
    Successful,
    PartiallySuccessful,
    Failed,
    Cancelled,
    Aborted,
}

impl MissionStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            MissionStatus::Successful
                | MissionStatus::PartiallySuccessful
                | MissionStatus::Failed
                | MissionStatus::Cancelled
                | MissionStatus::Aborted
        )
    }

    pub fn is_successful(&self) -> bool {
        *self == MissionStatus::Successful
    }

    /// Lifecycle phase: pending, running, finished.
    ///
    /// A run never moves to a lower phase, and never leaves phase 2.
    pub fn phase(&self) -> u8 {
        match self {
            MissionStatus::Pending => 0,
            MissionStatus::InProgress | MissionStatus::Paused => 1,
            _ => 2,
        }
    }

    /// Whether a run in `self` may be moved to `next`.
    pub fn can_transition_to(&self, next: MissionStatus) -> bool {
        !self.is_terminal() && next.phase() >= self.phase()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MissionStatus::Pending => "pending",
            MissionStatus::InProgress => "in_progress",
            MissionStatus::Paused => "paused",
            MissionStatus::Successful => "successful",
            MissionStatus::PartiallySuccessful => "partially_successful",
            MissionStatus::Failed => "failed",
            MissionStatus::Cancelled => "cancelled",
            MissionStatus::Aborted => "aborted",
        }
    }
}

impl FromStr for MissionStatus {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "pending" | "notstarted" | "queued" => Ok(MissionStatus::Pending),
            "inprogress" | "ongoing" => Ok(MissionStatus::InProgress),
            "paused" => Ok(MissionStatus::Paused),
            "successful" => Ok(MissionStatus::Successful),
            "partiallysuccessful" => Ok(MissionStatus::PartiallySuccessful),
            "failed" => Ok(MissionStatus::Failed),
            "cancelled" => Ok(MissionStatus::Cancelled),
            "aborted" => Ok(MissionStatus::Aborted),
            _ => Err(ParseError {
                kind: "mission status",
                token: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for MissionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status of a single task within a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    NotStarted,
    InProgress,
    Paused,
    Successful,
    PartiallySuccessful,
    Failed,
    Cancelled,
}

impl TaskStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TaskStatus::Successful
                | TaskStatus::PartiallySuccessful
                | TaskStatus::Failed
                | TaskStatus::Cancelled
        )
    }
}

impl FromStr for TaskStatus {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "notstarted" | "pending" => Ok(TaskStatus::NotStarted),
            "inprogress" => Ok(TaskStatus::InProgress),
            "paused" => Ok(TaskStatus::Paused),
            "successful" => Ok(TaskStatus::Successful),
            "partiallysuccessful" => Ok(TaskStatus::PartiallySuccessful),
            "failed" => Ok(TaskStatus::Failed),
            "cancelled" => Ok(TaskStatus::Cancelled),
            _ => Err(ParseError {
                kind: "task status",
                token: s.to_string(),
            }),
        }
    }
}

/// Status of an inspection step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    NotStarted,
    InProgress,
    Successful,
    Failed,
    Cancelled,
}

impl StepStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            StepStatus::Successful | StepStatus::Failed | StepStatus::Cancelled
        )
    }
}

impl FromStr for StepStatus {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "notstarted" | "pending" => Ok(StepStatus::NotStarted),
            "inprogress" => Ok(StepStatus::InProgress),
            "successful" => Ok(StepStatus::Successful),
            "failed" => Ok(StepStatus::Failed),
            "cancelled" => Ok(StepStatus::Cancelled),
            _ => Err(ParseError {
                kind: "step status",
                token: s.to_string(),
            }),
        }
    }
}

/// Kind of task within a mission run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskType {
    Inspection,
    ReturnHome,
    Localization,
    DockingProcedure,
}

/// Kind of inspection step as reported by the agent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepType {
    DriveToPose,
    Localize,
    MoveArm,
    ReturnToHome,
    TakeImage,
    TakeThermalImage,
    TakeVideo,
    TakeThermalVideo,
    TakeGasMeasurement,
    RecordAudio,
}

impl StepType {
    /// Navigation and housekeeping steps carry no inspection result.
    pub fn is_inspection(&self) -> bool {
        !matches!(
            self,
            StepType::DriveToPose | StepType::Localize | StepType::MoveArm | StepType::ReturnToHome
        )
    }
}

impl FromStr for StepType {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "drivetopose" => Ok(StepType::DriveToPose),
            "localize" => Ok(StepType::Localize),
            "movearm" => Ok(StepType::MoveArm),
            "returntohome" => Ok(StepType::ReturnToHome),
            "takeimage" => Ok(StepType::TakeImage),
            "takethermalimage" => Ok(StepType::TakeThermalImage),
            "takevideo" => Ok(StepType::TakeVideo),
            "takethermalvideo" => Ok(StepType::TakeThermalVideo),
            "takegasmeasurement" => Ok(StepType::TakeGasMeasurement),
            "recordaudio" => Ok(StepType::RecordAudio),
            _ => Err(ParseError {
                kind: "step type",
                token: s.to_string(),
            }),
        }
    }
}

/// One inspection step of a task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InspectionStep {
    pub external_id: ExternalStepId,
    pub step_type: StepType,
    pub status: StepStatus,
}

/// One task of a mission run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissionTask {
    pub external_id: ExternalTaskId,
    pub task_type: TaskType,
    pub status: TaskStatus,
    #[serde(default)]
    pub steps: Vec<InspectionStep>,
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub ended_at: Option<DateTime<Utc>>,
}

impl MissionTask {
    /// Wall time spent on the task, once it has both started and ended.
    pub fn duration(&self) -> Option<chrono::Duration> {
        match (self.started_at, self.ended_at) {
            (Some(start), Some(end)) if end >= start => Some(end - start),
            _ => None,
        }
    }
}

/// One concrete execution of a (possibly ad hoc) mission
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissionRun {
    pub id: MissionRunId,
    pub external_id: ExternalMissionId,
    #[serde(default)]
    pub definition_id: Option<MissionDefinitionId>,
    pub robot_id: RobotId,
    pub name: String,
    pub status: MissionStatus,
    pub installation_code: String,
    #[serde(default)]
    pub area: Option<AreaId>,
    #[serde(default)]
    pub tasks: Vec<MissionTask>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub ended_at: Option<DateTime<Utc>>,
}

impl MissionRun {
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// A localization run consists solely of localization tasks.
    pub fn is_localization(&self) -> bool {
        !self.tasks.is_empty()
            && self
                .tasks
                .iter()
                .all(|t| t.task_type == TaskType::Localization)
    }

    pub fn task(&self, id: &ExternalTaskId) -> Option<&MissionTask> {
        self.tasks.iter().find(|t| &t.external_id == id)
    }
}

#[cfg(test)]
#[path = "mission_tests.rs"]
mod tests;
