// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Traced adapter wrappers for consistent observability

use crate::dispatch::{DispatchAdapter, DispatchError, DispatchRequest};
use crate::notify::{Notification, NotifyAdapter, NotifyError};
use async_trait::async_trait;
use tracing::Instrument;

/// Wrapper that adds tracing to any NotifyAdapter
#[derive(Clone)]
pub struct TracedNotify<N> {
    inner: N,
}

impl<N> TracedNotify<N> {
    pub fn new(inner: N) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<N: NotifyAdapter> NotifyAdapter for TracedNotify<N> {
    async fn publish(&self, notification: Notification) -> Result<(), NotifyError> {
        let span = tracing::debug_span!(
            "notify.publish",
            event = %notification.event,
            installation = %notification.installation_code,
        );
        async {
            let result = self.inner.publish(notification).await;
            match &result {
                Ok(()) => tracing::debug!("published"),
                Err(e) => tracing::warn!(error = %e, "publish failed"),
            }
            result
        }
        .instrument(span)
        .await
    }
}

/// Wrapper that adds tracing to any DispatchAdapter
#[derive(Clone)]
pub struct TracedDispatch<D> {
    inner: D,
}

impl<D> TracedDispatch<D> {
    pub fn new(inner: D) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<D: DispatchAdapter> DispatchAdapter for TracedDispatch<D> {
    async fn start_mission(&self, request: DispatchRequest) -> Result<(), DispatchError> {
        let span = tracing::info_span!(
            "dispatch.start_mission",
            definition = %request.definition_id,
            robot = %request.robot_id,
            occurrence = %request.occurrence,
        );
        async {
            tracing::info!("starting");
            let start = std::time::Instant::now();
            let result = self.inner.start_mission(request).await;
            let elapsed_ms = start.elapsed().as_millis() as u64;
            match &result {
                Ok(()) => tracing::info!(elapsed_ms, "mission handed off"),
                Err(e) => tracing::error!(elapsed_ms, error = %e, "dispatch failed"),
            }
            result
        }
        .instrument(span)
        .await
    }
}

#[cfg(test)]
#[path = "traced_tests.rs"]
mod tests;
