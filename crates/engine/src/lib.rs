// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Patrol engine: telemetry reconciliation and mission auto-scheduling

mod duration;
mod error;
mod identity;
mod mission_run;
mod publish;
mod reconcile;
mod retry;
mod router;
mod runtime;
mod scheduler;
mod telemetry;
mod tracker;

pub use duration::{average_task_seconds, DurationEstimator};
pub use error::EngineError;
pub use identity::IdentityResolver;
pub use mission_run::{Advance, Completion, MissionRunMachine, LOCALIZATION_FAILED};
pub use reconcile::{
    diff_capabilities, diff_host, diff_info, diff_installation, diff_port, diff_video_streams,
    FieldDiff, InfoDiff, InfoOutcome, RobotReconciler,
};
pub use retry::RetryPolicy;
pub use router::{RouterConfig, RouterError, RouterHandle, TelemetryRouter};
pub use runtime::{Runtime, RuntimeConfig, RuntimeDeps};
pub use scheduler::{due_occurrence, AutoScheduler, SchedulerConfig};
pub use telemetry::{ScalarTelemetry, PRESSURE_TOLERANCE, TELEMETRY_FAILED};
pub use tracker::{StepUpdate, TaskStepTracker};
