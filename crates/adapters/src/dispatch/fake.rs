// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake dispatch adapter for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{DispatchAdapter, DispatchError, DispatchRequest};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

#[derive(Default)]
struct FakeDispatchState {
    calls: Vec<DispatchRequest>,
    fail_next: u32,
    delay: Option<Duration>,
}

/// Records every dispatch instruction.
///
/// An optional delay widens race windows in concurrency tests.
#[derive(Clone, Default)]
pub struct FakeDispatchAdapter {
    inner: Arc<Mutex<FakeDispatchState>>,
}

impl FakeDispatchAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<DispatchRequest> {
        self.inner.lock().calls.clone()
    }

    /// Reject the next `times` instructions (they are not recorded)
    pub fn fail_next(&self, times: u32) {
        self.inner.lock().fail_next = times;
    }

    pub fn set_delay(&self, delay: Duration) {
        self.inner.lock().delay = Some(delay);
    }
}

#[async_trait]
impl DispatchAdapter for FakeDispatchAdapter {
    async fn start_mission(&self, request: DispatchRequest) -> Result<(), DispatchError> {
        let delay = self.inner.lock().delay;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let mut inner = self.inner.lock();
        if inner.fail_next > 0 {
            inner.fail_next -= 1;
            return Err(DispatchError::Rejected("fake rejection".to_string()));
        }
        inner.calls.push(request);
        Ok(())
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
