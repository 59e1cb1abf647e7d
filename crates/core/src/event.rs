// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Telemetry events received from robot-side agents

use crate::mission::{ExternalMissionId, ExternalStepId, ExternalTaskId};
use crate::robot::{AgentId, BatteryState, Pose, RobotCapability, RobotStatus, VideoStream};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Full self-description an agent publishes on connect and periodically after
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RobotInfo {
    pub agent_id: AgentId,
    pub robot_name: String,
    #[serde(default)]
    pub robot_type: String,
    #[serde(default)]
    pub serial_number: String,
    /// Installation name (or code) the agent believes it is deployed at
    pub installation: String,
    #[serde(default)]
    pub video_streams: Option<Vec<VideoStream>>,
    #[serde(default)]
    pub host: Option<String>,
    #[serde(default)]
    pub port: u16,
    #[serde(default)]
    pub capabilities: Option<Vec<RobotCapability>>,
}

/// Telemetry from an agent.
///
/// Serializes with `{"type": "robot:status", ...fields}` format.
/// Unknown type tags deserialize to `Unknown`.
///
/// Mission, task and step statuses are carried as raw tokens; they are
/// parsed by the engine so an unrecognized token can be rejected without
/// losing the rest of the event for logging.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum TelemetryEvent {
    #[serde(rename = "robot:status")]
    RobotStatus {
        agent_id: AgentId,
        status: RobotStatus,
    },

    #[serde(rename = "robot:info")]
    RobotInfo(RobotInfo),

    #[serde(rename = "mission:status")]
    MissionStatus {
        agent_id: AgentId,
        mission_id: ExternalMissionId,
        status: String,
    },

    #[serde(rename = "task:status")]
    TaskStatus {
        agent_id: AgentId,
        mission_id: ExternalMissionId,
        task_id: ExternalTaskId,
        status: String,
    },

    #[serde(rename = "step:status")]
    StepStatus {
        agent_id: AgentId,
        mission_id: ExternalMissionId,
        task_id: ExternalTaskId,
        step_id: ExternalStepId,
        step_type: String,
        status: String,
    },

    #[serde(rename = "robot:battery")]
    Battery {
        agent_id: AgentId,
        battery_level: f32,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        battery_state: Option<BatteryState>,
    },

    #[serde(rename = "robot:pressure")]
    Pressure {
        agent_id: AgentId,
        pressure_level: f32,
    },

    #[serde(rename = "robot:pose")]
    Pose { agent_id: AgentId, pose: Pose },

    #[serde(rename = "robot:cloud_health")]
    CloudHealth {
        agent_id: AgentId,
        #[serde(default)]
        robot_name: String,
    },

    #[serde(other)]
    Unknown,
}

/// Routing key for telemetry: one queue per kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TelemetryKind {
    RobotStatus,
    RobotInfo,
    MissionStatus,
    TaskStatus,
    StepStatus,
    Battery,
    Pressure,
    Pose,
    CloudHealth,
}

impl TelemetryKind {
    pub const ALL: [TelemetryKind; 9] = [
        TelemetryKind::RobotStatus,
        TelemetryKind::RobotInfo,
        TelemetryKind::MissionStatus,
        TelemetryKind::TaskStatus,
        TelemetryKind::StepStatus,
        TelemetryKind::Battery,
        TelemetryKind::Pressure,
        TelemetryKind::Pose,
        TelemetryKind::CloudHealth,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TelemetryKind::RobotStatus => "robot:status",
            TelemetryKind::RobotInfo => "robot:info",
            TelemetryKind::MissionStatus => "mission:status",
            TelemetryKind::TaskStatus => "task:status",
            TelemetryKind::StepStatus => "step:status",
            TelemetryKind::Battery => "robot:battery",
            TelemetryKind::Pressure => "robot:pressure",
            TelemetryKind::Pose => "robot:pose",
            TelemetryKind::CloudHealth => "robot:cloud_health",
        }
    }
}

impl fmt::Display for TelemetryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TelemetryEvent {
    /// `None` for events with an unrecognized type tag.
    pub fn kind(&self) -> Option<TelemetryKind> {
        let kind = match self {
            TelemetryEvent::RobotStatus { .. } => TelemetryKind::RobotStatus,
            TelemetryEvent::RobotInfo(_) => TelemetryKind::RobotInfo,
            TelemetryEvent::MissionStatus { .. } => TelemetryKind::MissionStatus,
            TelemetryEvent::TaskStatus { .. } => TelemetryKind::TaskStatus,
            TelemetryEvent::StepStatus { .. } => TelemetryKind::StepStatus,
            TelemetryEvent::Battery { .. } => TelemetryKind::Battery,
            TelemetryEvent::Pressure { .. } => TelemetryKind::Pressure,
            TelemetryEvent::Pose { .. } => TelemetryKind::Pose,
            TelemetryEvent::CloudHealth { .. } => TelemetryKind::CloudHealth,
            TelemetryEvent::Unknown => return None,
        };
        Some(kind)
    }

    pub fn name(&self) -> &'static str {
        self.kind().map(|k| k.as_str()).unwrap_or("unknown")
    }

    pub fn agent_id(&self) -> Option<&AgentId> {
        match self {
            TelemetryEvent::RobotStatus { agent_id, .. }
            | TelemetryEvent::MissionStatus { agent_id, .. }
            | TelemetryEvent::TaskStatus { agent_id, .. }
            | TelemetryEvent::StepStatus { agent_id, .. }
            | TelemetryEvent::Battery { agent_id, .. }
            | TelemetryEvent::Pressure { agent_id, .. }
            | TelemetryEvent::Pose { agent_id, .. }
            | TelemetryEvent::CloudHealth { agent_id, .. } => Some(agent_id),
            TelemetryEvent::RobotInfo(info) => Some(&info.agent_id),
            TelemetryEvent::Unknown => None,
        }
    }

    /// One-line description for logs
    pub fn log_summary(&self) -> String {
        let t = self.name();
        match self {
            TelemetryEvent::RobotStatus { agent_id, status } => {
                format!("{t} agent={agent_id} status={status}")
            }
            TelemetryEvent::RobotInfo(info) => format!(
                "{t} agent={} name={} installation={}",
                info.agent_id, info.robot_name, info.installation
            ),
            TelemetryEvent::MissionStatus {
                agent_id,
                mission_id,
                status,
            } => format!("{t} agent={agent_id} mission={mission_id} status={status}"),
            TelemetryEvent::TaskStatus {
                agent_id,
                task_id,
                status,
                ..
            } => format!("{t} agent={agent_id} task={task_id} status={status}"),
            TelemetryEvent::StepStatus {
                agent_id,
                step_id,
                step_type,
                status,
                ..
            } => format!("{t} agent={agent_id} step={step_id} type={step_type} status={status}"),
            TelemetryEvent::Battery {
                agent_id,
                battery_level,
                ..
            } => format!("{t} agent={agent_id} level={battery_level}"),
            TelemetryEvent::Pressure {
                agent_id,
                pressure_level,
            } => format!("{t} agent={agent_id} level={pressure_level}"),
            TelemetryEvent::Pose { agent_id, .. } | TelemetryEvent::CloudHealth { agent_id, .. } => {
                format!("{t} agent={agent_id}")
            }
            TelemetryEvent::Unknown => t.to_string(),
        }
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
