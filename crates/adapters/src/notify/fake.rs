// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake notification adapter for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{Notification, NotifyAdapter, NotifyError, ALERT};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;

#[derive(Default)]
struct FakeNotifyState {
    calls: Vec<Notification>,
    fail: bool,
}

/// Fake notification adapter for testing
#[derive(Clone, Default)]
pub struct FakeNotifyAdapter {
    inner: Arc<Mutex<FakeNotifyState>>,
}

impl FakeNotifyAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get all recorded notifications
    pub fn calls(&self) -> Vec<Notification> {
        self.inner.lock().calls.clone()
    }

    /// Recorded notifications with the given event name
    pub fn events(&self, event: &str) -> Vec<Notification> {
        self.inner
            .lock()
            .calls
            .iter()
            .filter(|n| n.event == event)
            .cloned()
            .collect()
    }

    /// Titles of recorded alerts, in publish order
    pub fn alert_titles(&self) -> Vec<String> {
        self.events(ALERT)
            .iter()
            .filter_map(|n| n.payload["title"].as_str().map(str::to_string))
            .collect()
    }

    /// Make every publish fail (after recording it)
    pub fn set_failing(&self, fail: bool) {
        self.inner.lock().fail = fail;
    }
}

#[async_trait]
impl NotifyAdapter for FakeNotifyAdapter {
    async fn publish(&self, notification: Notification) -> Result<(), NotifyError> {
        let mut inner = self.inner.lock();
        inner.calls.push(notification);
        if inner.fail {
            return Err(NotifyError::SendFailed("fake failure".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
