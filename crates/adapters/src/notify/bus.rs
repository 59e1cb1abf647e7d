// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Broadcast-channel notification adapter.
//!
//! Publishes onto a `tokio::sync::broadcast` channel that the outer
//! fan-out layer subscribes to. Having no subscribers is not an error.

use super::{Notification, NotifyAdapter, NotifyError};
use async_trait::async_trait;
use tokio::sync::broadcast;

#[derive(Clone, Debug)]
pub struct BusNotifyAdapter {
    tx: broadcast::Sender<Notification>,
}

impl BusNotifyAdapter {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.tx.subscribe()
    }
}

#[async_trait]
impl NotifyAdapter for BusNotifyAdapter {
    async fn publish(&self, notification: Notification) -> Result<(), NotifyError> {
        if self.tx.receiver_count() == 0 {
            tracing::trace!(event = %notification.event, "no subscribers, dropping");
            return Ok(());
        }
        self.tx
            .send(notification)
            .map(|_| ())
            .map_err(|e| NotifyError::SendFailed(e.to_string()))
    }
}

#[cfg(test)]
#[path = "bus_tests.rs"]
mod tests;
