// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Event handling for the runtime

mod mission;
mod robot;

use super::Runtime;
use crate::error::EngineError;
use patrol_adapters::{DispatchAdapter, NotifyAdapter};
use patrol_core::{Clock, IdGen, SchedulerSignal, TelemetryEvent};
use patrol_storage::Store;

impl<S, N, D, C, G> Runtime<S, N, D, C, G>
where
    S: Store,
    N: NotifyAdapter,
    D: DispatchAdapter,
    C: Clock,
    G: IdGen,
{
    /// Handle one telemetry event and return any produced scheduler signals
    pub async fn handle_event(
        &self,
        event: TelemetryEvent,
    ) -> Result<Vec<SchedulerSignal>, EngineError> {
        let mut signals = Vec::new();

        match &event {
            TelemetryEvent::RobotStatus { agent_id, status } => {
                signals.extend(self.handle_robot_status(agent_id, *status).await?);
            }

            TelemetryEvent::RobotInfo(info) => {
                signals.extend(self.handle_robot_info(info).await?);
            }

            TelemetryEvent::MissionStatus {
                mission_id, status, ..
            } => {
                signals.extend(self.handle_mission_status(mission_id, status).await?);
            }

            TelemetryEvent::TaskStatus {
                mission_id,
                task_id,
                status,
                ..
            } => {
                self.tracker
                    .update_task_status(mission_id, task_id, status)
                    .await?;
            }

            TelemetryEvent::StepStatus {
                mission_id,
                step_id,
                step_type,
                status,
                ..
            } => {
                self.tracker
                    .update_step_status(mission_id, step_id, step_type, status)
                    .await?;
            }

            TelemetryEvent::Battery {
                agent_id,
                battery_level,
                battery_state,
            } => {
                let robot = self.identity.require_robot(agent_id).await?;
                self.telemetry
                    .update_battery(&robot, *battery_level, *battery_state)
                    .await?;
            }

            TelemetryEvent::Pressure {
                agent_id,
                pressure_level,
            } => {
                let robot = self.identity.require_robot(agent_id).await?;
                self.telemetry
                    .update_pressure(&robot, *pressure_level)
                    .await?;
            }

            TelemetryEvent::Pose { agent_id, pose } => {
                let robot = self.identity.require_robot(agent_id).await?;
                self.telemetry.update_pose(&robot, *pose).await?;
            }

            TelemetryEvent::CloudHealth {
                agent_id,
                robot_name,
            } => {
                let robot = self.identity.require_robot(agent_id).await?;
                self.telemetry.cloud_health_alert(&robot, robot_name).await;
            }

            TelemetryEvent::Unknown => {
                tracing::debug!("ignoring unknown telemetry event");
            }
        }

        Ok(signals)
    }
}
