// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Robot entity and its telemetry-reported attributes.

use crate::definition::MissionDefinitionId;
use crate::installation::AreaId;
use crate::mission::MissionRunId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

crate::define_id! {
    /// Internal identifier assigned when a robot is first registered.
    pub struct RobotId;
}

crate::define_id! {
    /// External identifier of the robot-side agent sending telemetry.
    ///
    /// Immutable and globally unique; the only key telemetry carries.
    pub struct AgentId;
}

/// Operational status reported by the agent.
///
/// Values are accepted verbatim: any status may follow any other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RobotStatus {
    Available,
    Busy,
    Offline,
    Blocked,
    BlockedProtectiveStop,
    Docked,
}

impl RobotStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RobotStatus::Available => "available",
            RobotStatus::Busy => "busy",
            RobotStatus::Offline => "offline",
            RobotStatus::Blocked => "blocked",
            RobotStatus::BlockedProtectiveStop => "blocked_protective_stop",
            RobotStatus::Docked => "docked",
        }
    }
}

impl fmt::Display for RobotStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Capabilities an agent advertises. Order is significant for change detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RobotCapability {
    TakeImage,
    TakeThermalImage,
    TakeVideo,
    TakeThermalVideo,
    TakeGasMeasurement,
    RecordAudio,
    ReturnToHome,
    AutoLocalize,
    AutoReturnToHome,
    DockingProcedure,
}

/// A camera feed exposed by the robot
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VideoStream {
    pub name: String,
    pub url: String,
    #[serde(rename = "type")]
    pub stream_type: String,
}

impl VideoStream {
    pub fn new(name: impl Into<String>, url: impl Into<String>, stream_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            stream_type: stream_type.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatteryState {
    Normal,
    Charging,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Orientation {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

/// Last reported position and heading
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Pose {
    pub position: Position,
    pub orientation: Orientation,
}

/// A robot as persisted in the fleet model.
///
/// Created on first telemetry contact from an unknown agent, never
/// hard-deleted (see `deprecated`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Robot {
    pub id: RobotId,
    pub agent_id: AgentId,
    pub name: String,
    /// Robot model type; task-duration estimates are kept per model.
    pub robot_type: String,
    #[serde(default)]
    pub serial_number: String,
    pub host: String,
    pub port: u16,
    pub installation_code: String,
    /// `None` until the agent first reports capabilities.
    #[serde(default)]
    pub capabilities: Option<Vec<RobotCapability>>,
    #[serde(default)]
    pub video_streams: Vec<VideoStream>,
    pub status: RobotStatus,
    #[serde(default)]
    pub battery_level: f32,
    #[serde(default)]
    pub battery_state: Option<BatteryState>,
    #[serde(default)]
    pub pressure_level: Option<f32>,
    #[serde(default)]
    pub pose: Option<Pose>,
    /// Mission run currently executing; at most one non-terminal run.
    #[serde(default)]
    pub current_mission_run: Option<MissionRunId>,
    #[serde(default)]
    pub current_area: Option<AreaId>,
    /// Set when a mission is handed to the dispatch collaborator, cleared
    /// once the resulting run is assigned or finished.
    #[serde(default)]
    pub pending_dispatch: Option<PendingDispatch>,
    #[serde(default)]
    pub deprecated: bool,
}

/// A dispatch instruction handed out for a robot but not yet turned into a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingDispatch {
    pub definition_id: MissionDefinitionId,
    pub occurrence: DateTime<Utc>,
    pub dispatched_at: DateTime<Utc>,
}

impl PendingDispatch {
    /// Claims older than `stale_before` no longer block the robot.
    pub fn is_live(&self, stale_before: DateTime<Utc>) -> bool {
        self.dispatched_at >= stale_before
    }
}

impl Robot {
    /// Free to take a new mission: available, not running one, not retired.
    pub fn is_idle(&self) -> bool {
        self.status == RobotStatus::Available
            && self.current_mission_run.is_none()
            && !self.deprecated
    }

    /// Waiting on a dispatched mission that has not become a run yet.
    pub fn awaiting_dispatch(&self, stale_before: DateTime<Utc>) -> bool {
        self.pending_dispatch
            .as_ref()
            .is_some_and(|p| p.is_live(stale_before))
    }
}
