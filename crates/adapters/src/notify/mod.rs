// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Notification adapters.
//!
//! Live updates for connected clients: a named event, the installation it
//! concerns, and a JSON snapshot of the changed entity. Delivery is
//! fire-and-forget.

mod bus;
mod noop;

pub use bus::BusNotifyAdapter;
pub use noop::NoOpNotifyAdapter;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeNotifyAdapter;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Event name for robot snapshots
pub const ROBOT_UPDATED: &str = "Robot updated";
/// Event name for mission run snapshots
pub const MISSION_RUN_UPDATED: &str = "Mission run updated";
/// Event name for operator-facing alerts
pub const ALERT: &str = "Alert";

/// Errors from notify operations
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("send failed: {0}")]
    SendFailed(String),
}

/// One published notification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub event: String,
    pub installation_code: String,
    pub payload: serde_json::Value,
}

impl Notification {
    pub fn new(
        event: impl Into<String>,
        installation_code: impl Into<String>,
        payload: serde_json::Value,
    ) -> Self {
        Self {
            event: event.into(),
            installation_code: installation_code.into(),
            payload,
        }
    }

    /// Build an [`ALERT`] notification with a title and message.
    pub fn alert(installation_code: impl Into<String>, title: &str, message: &str) -> Self {
        Self::new(
            ALERT,
            installation_code,
            serde_json::json!({ "title": title, "message": message }),
        )
    }
}

/// Adapter for publishing live updates
#[async_trait]
pub trait NotifyAdapter: Clone + Send + Sync + 'static {
    async fn publish(&self, notification: Notification) -> Result<(), NotifyError>;
}
