// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use crate::prelude::*;

use patrol_adapters::ROBOT_UPDATED;
use patrol_core::test_support::{battery_event, robot_info_event, robot_status_event};
use patrol_core::RobotStatus;
use patrol_engine::EngineError;

#[tokio::test]
async fn first_robot_info_creates_an_available_robot() {
    let world = World::new().await;

    world.send(robot_info_event("R7", "SITE-A")).await.unwrap();

    let robot = world.robot_by_agent("R7").await.unwrap();
    assert_eq!(robot.installation_code, "SITE-A");
    assert_eq!(robot.status, RobotStatus::Available);
    assert_eq!(world.notifier.events(ROBOT_UPDATED).len(), 1);
}

#[tokio::test]
async fn repeated_identical_robot_info_writes_nothing() {
    let world = World::new().await;
    world.send(robot_info_event("R7", "SITE-A")).await.unwrap();
    let writes = world.store.write_count();
    let published = world.notifier.calls().len();

    world.send(robot_info_event("R7", "SITE-A")).await.unwrap();

    assert_eq!(world.store.write_count(), writes);
    assert_eq!(world.notifier.calls().len(), published);
}

#[tokio::test]
async fn robot_info_for_unknown_installation_creates_nothing() {
    let world = World::new().await;

    let err = world
        .send(robot_info_event("R7", "NOWHERE"))
        .await
        .unwrap_err();

    assert!(matches!(err, EngineError::InstallationNotFound(_)));
    assert!(world.robot_by_agent("R7").await.is_none());
}

#[tokio::test]
async fn telemetry_from_unregistered_agent_is_rejected() {
    let world = World::new().await;
    let writes = world.store.write_count();

    let status = world
        .send(robot_status_event("R99", RobotStatus::Busy))
        .await
        .unwrap_err();
    let battery = world.send(battery_event("R99", 40.0)).await.unwrap_err();

    assert!(matches!(status, EngineError::RobotNotFound(_)));
    assert!(matches!(battery, EngineError::RobotNotFound(_)));
    assert_eq!(world.store.write_count(), writes);
}

#[tokio::test]
async fn status_and_battery_telemetry_update_the_robot() {
    let world = World::new().await;

    world
        .send(robot_status_event("R1", RobotStatus::Busy))
        .await
        .unwrap();
    world.send(battery_event("R1", 42.5)).await.unwrap();

    let robot = world.robot_by_agent("R1").await.unwrap();
    assert_eq!(robot.status, RobotStatus::Busy);
    assert_eq!(robot.battery_level, 42.5);
}
