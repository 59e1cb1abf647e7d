// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use patrol_adapters::ROBOT_UPDATED;
use patrol_core::test_support::{robot_info, robot_info_event, robot_status_event};
use patrol_core::{AgentId, RobotStatus};

#[tokio::test]
async fn status_change_to_available_signals_scheduler() {
    let ctx = setup().await;
    ctx.handle(robot_status_event("R1", RobotStatus::Busy))
        .await
        .unwrap();
    let signals = ctx
        .handle(robot_status_event("R1", RobotStatus::Available))
        .await
        .unwrap();
    assert_eq!(
        signals,
        vec![SchedulerSignal::RobotAvailable {
            robot_id: RobotId::new("robot-1")
        }]
    );
    assert_eq!(ctx.notifier.events(ROBOT_UPDATED).len(), 2);
}

#[tokio::test]
async fn repeated_status_is_silent() {
    let ctx = setup().await;
    let writes = ctx.store.write_count();
    let signals = ctx
        .handle(robot_status_event("R1", RobotStatus::Available))
        .await
        .unwrap();
    assert!(signals.is_empty());
    assert_eq!(ctx.store.write_count(), writes);
}

#[tokio::test]
async fn status_from_unknown_agent_is_not_found() {
    let ctx = setup().await;
    let err = ctx
        .handle(robot_status_event("R404", RobotStatus::Offline))
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::RobotNotFound("R404".into()));
    assert!(err.is_not_found());
}

#[tokio::test]
async fn info_from_new_agent_creates_robot_without_signal() {
    let ctx = setup().await;
    let signals = ctx.handle(robot_info_event("R7", "SITE-A")).await.unwrap();
    assert!(signals.is_empty());

    let created = ctx
        .store
        .robot_by_agent(&AgentId::new("R7"))
        .await
        .unwrap()
        .found()
        .unwrap();
    assert_eq!(created.status, RobotStatus::Available);
    assert_eq!(created.id, "new-robot-1");
    assert_eq!(created.installation_code, "SITE-A");
}

#[tokio::test]
async fn info_twice_writes_once() {
    let ctx = setup().await;
    let mut info = robot_info("R1", "SITE-A");
    info.port = 4000;

    ctx.handle(TelemetryEvent::RobotInfo(info.clone()))
        .await
        .unwrap();
    let writes = ctx.store.write_count();
    let published = ctx.notifier.calls().len();

    let signals = ctx.handle(TelemetryEvent::RobotInfo(info)).await.unwrap();
    assert!(signals.is_empty());
    assert_eq!(ctx.store.write_count(), writes);
    assert_eq!(ctx.notifier.calls().len(), published);
    assert_eq!(ctx.robot("robot-1").await.port, 4000);
}

#[tokio::test]
async fn info_with_unknown_installation_is_dropped() {
    let ctx = setup().await;
    let writes = ctx.store.write_count();
    let err = ctx
        .handle(robot_info_event("R7", "NOWHERE"))
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::InstallationNotFound("NOWHERE".into()));
    assert_eq!(ctx.store.write_count(), writes);
}
