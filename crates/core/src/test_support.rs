// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for use across crates.
//!
//! Gated behind `#[cfg(any(test, feature = "test-support"))]`.

use crate::{
    AgentId, ExternalMissionId, ExternalStepId, ExternalTaskId, InspectionStep, Installation,
    MissionDefinition, MissionRun, MissionRunId, MissionStatus, MissionTask, Robot,
    RobotCapability, RobotId, RobotInfo, RobotStatus, StepStatus, StepType, TaskStatus, TaskType,
    TelemetryEvent, VideoStream,
};
use chrono::{DateTime, TimeZone, Utc};

/// Fixed creation instant used by the builders: Monday 2026-01-05 00:00 UTC.
pub fn epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 5, 0, 0, 0)
        .single()
        .unwrap_or_default()
}

// ── Entity builders ─────────────────────────────────────────────────────────

pub fn installation(code: &str) -> Installation {
    Installation::new(code, code)
}

pub fn robot(id: &str, agent_id: &str, installation_code: &str) -> Robot {
    Robot {
        id: RobotId::new(id),
        agent_id: AgentId::new(agent_id),
        name: format!("robot {agent_id}"),
        robot_type: "taurob".to_string(),
        serial_number: format!("SN-{agent_id}"),
        host: "10.0.0.7".to_string(),
        port: 3000,
        installation_code: installation_code.to_string(),
        capabilities: Some(vec![RobotCapability::TakeImage]),
        video_streams: vec![VideoStream::new("front", "rtsp://10.0.0.7/front", "rtsp")],
        status: RobotStatus::Available,
        battery_level: 100.0,
        battery_state: None,
        pressure_level: None,
        pose: None,
        current_mission_run: None,
        current_area: None,
        pending_dispatch: None,
        deprecated: false,
    }
}

pub fn mission_run(id: &str, external_id: &str, robot_id: &str) -> MissionRun {
    MissionRun {
        id: MissionRunId::new(id),
        external_id: ExternalMissionId::new(external_id),
        definition_id: None,
        robot_id: RobotId::new(robot_id),
        name: format!("mission {external_id}"),
        status: MissionStatus::Pending,
        installation_code: "SITE-A".to_string(),
        area: None,
        tasks: Vec::new(),
        created_at: epoch(),
        started_at: None,
        ended_at: None,
    }
}

pub fn task(external_id: &str, task_type: TaskType) -> MissionTask {
    MissionTask {
        external_id: ExternalTaskId::new(external_id),
        task_type,
        status: TaskStatus::NotStarted,
        steps: Vec::new(),
        started_at: None,
        ended_at: None,
    }
}

pub fn step(external_id: &str, step_type: StepType) -> InspectionStep {
    InspectionStep {
        external_id: ExternalStepId::new(external_id),
        step_type,
        status: StepStatus::NotStarted,
    }
}

pub fn definition(id: &str, installation_code: &str) -> MissionDefinition {
    MissionDefinition::new(id, format!("definition {id}"), installation_code)
}

/// Robot-info event that matches what [`robot`] builds for the same agent.
pub fn robot_info(agent_id: &str, installation: &str) -> RobotInfo {
    RobotInfo {
        agent_id: AgentId::new(agent_id),
        robot_name: format!("robot {agent_id}"),
        robot_type: "taurob".to_string(),
        serial_number: format!("SN-{agent_id}"),
        installation: installation.to_string(),
        video_streams: Some(vec![VideoStream::new(
            "front",
            "rtsp://10.0.0.7/front",
            "rtsp",
        )]),
        host: Some("10.0.0.7".to_string()),
        port: 3000,
        capabilities: Some(vec![RobotCapability::TakeImage]),
    }
}

// ── Event factory functions ─────────────────────────────────────────────────

pub fn robot_status_event(agent_id: &str, status: RobotStatus) -> TelemetryEvent {
    TelemetryEvent::RobotStatus {
        agent_id: AgentId::new(agent_id),
        status,
    }
}

pub fn robot_info_event(agent_id: &str, installation: &str) -> TelemetryEvent {
    TelemetryEvent::RobotInfo(robot_info(agent_id, installation))
}

pub fn mission_status_event(agent_id: &str, mission_id: &str, status: &str) -> TelemetryEvent {
    TelemetryEvent::MissionStatus {
        agent_id: AgentId::new(agent_id),
        mission_id: ExternalMissionId::new(mission_id),
        status: status.to_string(),
    }
}

pub fn task_status_event(
    agent_id: &str,
    mission_id: &str,
    task_id: &str,
    status: &str,
) -> TelemetryEvent {
    TelemetryEvent::TaskStatus {
        agent_id: AgentId::new(agent_id),
        mission_id: ExternalMissionId::new(mission_id),
        task_id: ExternalTaskId::new(task_id),
        status: status.to_string(),
    }
}

pub fn step_status_event(
    agent_id: &str,
    mission_id: &str,
    task_id: &str,
    step_id: &str,
    step_type: &str,
    status: &str,
) -> TelemetryEvent {
    TelemetryEvent::StepStatus {
        agent_id: AgentId::new(agent_id),
        mission_id: ExternalMissionId::new(mission_id),
        task_id: ExternalTaskId::new(task_id),
        step_id: ExternalStepId::new(step_id),
        step_type: step_type.to_string(),
        status: status.to_string(),
    }
}

pub fn battery_event(agent_id: &str, level: f32) -> TelemetryEvent {
    TelemetryEvent::Battery {
        agent_id: AgentId::new(agent_id),
        battery_level: level,
        battery_state: None,
    }
}

pub fn pressure_event(agent_id: &str, level: f32) -> TelemetryEvent {
    TelemetryEvent::Pressure {
        agent_id: AgentId::new(agent_id),
        pressure_level: level,
    }
}

pub fn cloud_health_event(agent_id: &str, robot_name: &str) -> TelemetryEvent {
    TelemetryEvent::CloudHealth {
        agent_id: AgentId::new(agent_id),
        robot_name: robot_name.to_string(),
    }
}
