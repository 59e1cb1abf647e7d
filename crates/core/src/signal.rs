// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Signals consumed by the auto-scheduler

use crate::robot::RobotId;
use serde::{Deserialize, Serialize};

/// A robot may have become free to take its next mission
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SchedulerSignal {
    /// The robot's status changed to available
    RobotAvailable { robot_id: RobotId },
    /// A run on the robot reached a terminal status, successful or not
    MissionCompleted { robot_id: RobotId },
}

impl SchedulerSignal {
    pub fn robot_id(&self) -> &RobotId {
        match self {
            SchedulerSignal::RobotAvailable { robot_id }
            | SchedulerSignal::MissionCompleted { robot_id } => robot_id,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            SchedulerSignal::RobotAvailable { .. } => "robot_available",
            SchedulerSignal::MissionCompleted { .. } => "mission_completed",
        }
    }
}
