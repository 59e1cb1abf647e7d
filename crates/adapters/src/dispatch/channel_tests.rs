// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use patrol_core::test_support::epoch;

fn request() -> DispatchRequest {
    DispatchRequest {
        definition_id: "def-1".into(),
        robot_id: "robot-1".into(),
        occurrence: epoch(),
    }
}

#[tokio::test]
async fn forwards_requests() {
    let (adapter, mut rx) = ChannelDispatchAdapter::channel(4);
    adapter.start_mission(request()).await.unwrap();
    assert_eq!(rx.recv().await, Some(request()));
}

#[tokio::test]
async fn closed_receiver_is_unavailable() {
    let (adapter, rx) = ChannelDispatchAdapter::channel(4);
    drop(rx);
    let err = adapter.start_mission(request()).await.unwrap_err();
    assert!(matches!(err, DispatchError::Unavailable(_)));
}
