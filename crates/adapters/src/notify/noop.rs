// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! No-op notification adapter.

use super::{Notification, NotifyAdapter, NotifyError};
use async_trait::async_trait;

/// Notification adapter that silently discards all notifications.
///
/// Used when no client fan-out is configured.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoOpNotifyAdapter;

impl NoOpNotifyAdapter {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl NotifyAdapter for NoOpNotifyAdapter {
    async fn publish(&self, _notification: Notification) -> Result<(), NotifyError> {
        Ok(())
    }
}
