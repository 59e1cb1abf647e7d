// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Mission dispatch adapters.
//!
//! The dispatch collaborator turns a "start this definition on this robot
//! now" instruction into a new mission run and commands the robot.

mod channel;
mod noop;

pub use channel::ChannelDispatchAdapter;
pub use noop::NoOpDispatchAdapter;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeDispatchAdapter;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use patrol_core::{MissionDefinitionId, RobotId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from dispatch operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    /// The collaborator refused the mission (robot busy, definition invalid, ...)
    #[error("dispatch rejected: {0}")]
    Rejected(String),
    #[error("dispatch unavailable: {0}")]
    Unavailable(String),
}

/// Instruction to start a definition on a robot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchRequest {
    pub definition_id: MissionDefinitionId,
    pub robot_id: RobotId,
    /// Scheduled occurrence this dispatch fulfils
    pub occurrence: DateTime<Utc>,
}

/// Adapter for handing missions to the dispatch collaborator
#[async_trait]
pub trait DispatchAdapter: Clone + Send + Sync + 'static {
    async fn start_mission(&self, request: DispatchRequest) -> Result<(), DispatchError>;
}
