// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fire-and-forget live updates

use patrol_adapters::{Notification, NotifyAdapter};
use serde::Serialize;

pub(crate) fn payload<T: Serialize>(value: &T) -> serde_json::Value {
    serde_json::to_value(value).unwrap_or(serde_json::Value::Null)
}

/// Publish, logging failures instead of returning them.
pub(crate) async fn send<N: NotifyAdapter>(notifier: &N, notification: Notification) {
    let event = notification.event.clone();
    if let Err(e) = notifier.publish(notification).await {
        tracing::warn!(%event, error = %e, "failed to publish notification");
    }
}
