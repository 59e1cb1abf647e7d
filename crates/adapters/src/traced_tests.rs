// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::{FakeDispatchAdapter, FakeNotifyAdapter};
use patrol_core::test_support::epoch;

#[tokio::test]
async fn traced_notify_delegates() {
    let fake = FakeNotifyAdapter::new();
    let traced = TracedNotify::new(fake.clone());
    traced
        .publish(Notification::alert("SITE-A", "t", "m"))
        .await
        .unwrap();
    assert_eq!(fake.calls().len(), 1);
}

#[tokio::test]
async fn traced_notify_passes_errors_through() {
    let fake = FakeNotifyAdapter::new();
    fake.set_failing(true);
    let traced = TracedNotify::new(fake);
    assert!(traced
        .publish(Notification::alert("SITE-A", "t", "m"))
        .await
        .is_err());
}

#[tokio::test]
async fn traced_dispatch_delegates_and_propagates() {
    let fake = FakeDispatchAdapter::new();
    let traced = TracedDispatch::new(fake.clone());
    let request = DispatchRequest {
        definition_id: "def-1".into(),
        robot_id: "robot-1".into(),
        occurrence: epoch(),
    };

    traced.start_mission(request.clone()).await.unwrap();
    fake.fail_next(1);
    assert!(traced.start_mission(request.clone()).await.is_err());
    assert_eq!(fake.calls(), vec![request]);
}
