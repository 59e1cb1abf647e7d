// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::sync::Arc;

use crate::prelude::*;

use chrono::{Duration, NaiveTime, TimeZone, Utc};
use patrol_core::test_support::{robot_info_event, robot_status_event};
use patrol_core::{MissionDefinitionId, RobotId, RobotStatus, SchedulerSignal};
use patrol_storage::Store;

fn available(robot: &str) -> SchedulerSignal {
    SchedulerSignal::RobotAvailable {
        robot_id: RobotId::new(robot),
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_signals_dispatch_a_single_mission() {
    let world = World::new().await;

    let mut tasks = Vec::new();
    for _ in 0..8 {
        let runtime = Arc::clone(&world.runtime);
        tasks.push(tokio::spawn(async move {
            runtime.scheduler().on_signal(&available("robot-1")).await
        }));
    }
    for task in tasks {
        task.await.unwrap().unwrap();
    }

    let calls = world.dispatcher.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].definition_id, MissionDefinitionId::new("patrol-deck"));
    assert_eq!(
        calls[0].occurrence,
        Utc.with_ymd_and_hms(2026, 1, 5, 8, 0, 0).unwrap()
    );
}

#[tokio::test]
async fn new_robot_waits_for_a_status_report() {
    let world = World::new().await;
    let router = world.router();

    router
        .route(robot_info_event("R7", "SITE-A"))
        .await
        .unwrap();
    router.shutdown().await;
    let created = world.robot_by_agent("R7").await.unwrap();
    assert!(world.dispatcher.calls().is_empty());

    world
        .send(robot_status_event("R7", RobotStatus::Busy))
        .await
        .unwrap();
    let signals = world
        .runtime
        .handle_event(robot_status_event("R7", RobotStatus::Available))
        .await
        .unwrap();
    assert_eq!(signals, vec![available(created.id.as_str())]);
    for signal in &signals {
        world.runtime.scheduler().on_signal(signal).await.unwrap();
    }

    let calls = world.dispatcher.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].robot_id, created.id);
}

#[tokio::test]
async fn occurrence_is_dispatched_once_across_ticks() {
    let world = World::new().await;

    let first = world.runtime.scheduler().tick().await.unwrap();
    let second = world.runtime.scheduler().tick().await.unwrap();

    assert_eq!(first.len(), 1);
    assert!(second.is_empty());
    assert_eq!(world.dispatcher.calls().len(), 1);
}

#[tokio::test]
async fn skipped_occurrence_is_not_dispatched() {
    let world = World::new().await;
    // Monday 07:00: the 08:00 slot is the next occurrence
    world.clock.set(Utc.with_ymd_and_hms(2026, 1, 5, 7, 0, 0).unwrap());
    let eight = NaiveTime::from_hms_opt(8, 0, 0).unwrap();
    let id = MissionDefinitionId::new("patrol-deck");

    let skip = world
        .runtime
        .scheduler()
        .register_skip(&id, eight)
        .await
        .unwrap();
    world.clock.advance(Duration::minutes(65));
    let dispatched = world
        .runtime
        .scheduler()
        .on_signal(&available("robot-1"))
        .await
        .unwrap();

    assert_eq!(
        skip.date,
        Utc.with_ymd_and_hms(2026, 1, 5, 8, 0, 0).unwrap().date_naive()
    );
    assert!(dispatched.is_none());
    let def = world.store.definition(&id).await.unwrap().found().unwrap();
    assert_eq!(def.skip_exceptions.len(), 1);
}

#[tokio::test]
async fn occurrence_outside_the_due_window_is_not_dispatched() {
    let world = World::new().await;
    // Two hours past the 08:00 slot with the default one-hour window
    world.clock.set(Utc.with_ymd_and_hms(2026, 1, 5, 10, 0, 0).unwrap());

    let dispatched = world.runtime.scheduler().tick().await.unwrap();

    assert!(dispatched.is_empty());
    assert!(world.dispatcher.calls().is_empty());
}
