// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scalar telemetry upserts and cloud-health alerts

use crate::error::EngineError;
use crate::publish;
use patrol_adapters::{Notification, NotifyAdapter};
use patrol_core::{BatteryState, Pose, Robot};
use patrol_storage::{RobotPatch, Store};

/// Alert title for failed cloud telemetry requests
pub const TELEMETRY_FAILED: &str = "Failed Telemetry";

/// Pressure changes at or below this are sensor noise
pub const PRESSURE_TOLERANCE: f32 = 1e-5;

#[derive(Clone)]
pub struct ScalarTelemetry<S, N> {
    store: S,
    notifier: N,
}

impl<S, N> ScalarTelemetry<S, N>
where
    S: Store,
    N: NotifyAdapter,
{
    pub fn new(store: S, notifier: N) -> Self {
        Self { store, notifier }
    }

    /// Returns whether anything was written.
    pub async fn update_battery(
        &self,
        robot: &Robot,
        level: f32,
        state: Option<BatteryState>,
    ) -> Result<bool, EngineError> {
        let patch = RobotPatch {
            battery_level: (robot.battery_level != level).then_some(level),
            battery_state: state.filter(|s| robot.battery_state != Some(*s)),
            ..Default::default()
        };
        self.write(robot, patch, "battery").await
    }

    pub async fn update_pressure(&self, robot: &Robot, level: f32) -> Result<bool, EngineError> {
        let changed = match robot.pressure_level {
            Some(current) => (level - current).abs() > PRESSURE_TOLERANCE,
            None => true,
        };
        let patch = RobotPatch {
            pressure_level: changed.then_some(level),
            ..Default::default()
        };
        self.write(robot, patch, "pressure").await
    }

    pub async fn update_pose(&self, robot: &Robot, pose: Pose) -> Result<bool, EngineError> {
        let patch = RobotPatch {
            pose: (robot.pose != Some(pose)).then_some(pose),
            ..Default::default()
        };
        self.write(robot, patch, "pose").await
    }

    /// Raise a "Failed Telemetry" alert for the robot's installation.
    ///
    /// The message names the robot as the agent reported it, falling back to
    /// the registered name when the report left it blank.
    pub async fn cloud_health_alert(&self, robot: &Robot, reported_name: &str) {
        let name = match reported_name.trim() {
            "" => robot.name.as_str(),
            reported => reported,
        };
        tracing::warn!(robot = %robot.id, name, "cloud telemetry request failed");
        let alert = Notification::alert(
            robot.installation_code.clone(),
            TELEMETRY_FAILED,
            &format!("Failed telemetry request for robot {name}."),
        );
        publish::send(&self.notifier, alert).await;
    }

    async fn write(
        &self,
        robot: &Robot,
        patch: RobotPatch,
        field: &'static str,
    ) -> Result<bool, EngineError> {
        if patch.is_empty() {
            return Ok(false);
        }
        self.store
            .update_robot(&robot.id, patch)
            .await?
            .found_or_else(|| EngineError::RobotNotFound(robot.id.to_string()))?;
        tracing::debug!(robot = %robot.id, field, "telemetry updated");
        Ok(true)
    }
}

#[cfg(test)]
#[path = "telemetry_tests.rs"]
mod tests;
