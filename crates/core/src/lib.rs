// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! patrol-core: domain model for the Patrol fleet coordinator

pub mod clock;
pub mod definition;
pub mod event;
pub mod id;
pub mod installation;
pub mod lookup;
pub mod mission;
pub mod recurrence;
pub mod robot;
pub mod signal;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use clock::{Clock, FakeClock, SystemClock};
pub use definition::{MissionDefinition, MissionDefinitionId, SkipException};
pub use event::{RobotInfo, TelemetryEvent, TelemetryKind};
pub use id::{IdGen, SequentialIdGen, UuidIdGen};
pub use installation::{AreaId, Installation};
pub use lookup::Lookup;
pub use mission::{
    ExternalMissionId, ExternalStepId, ExternalTaskId, InspectionStep, MissionRun, MissionRunId,
    MissionStatus, MissionTask, ParseError, StepStatus, StepType, TaskStatus, TaskType,
};
pub use recurrence::{AutoScheduleFrequency, RecurrenceError};
pub use robot::{
    AgentId, BatteryState, Orientation, PendingDispatch, Pose, Position, Robot, RobotCapability,
    RobotId, RobotStatus, VideoStream,
};
pub use signal::SchedulerSignal;
