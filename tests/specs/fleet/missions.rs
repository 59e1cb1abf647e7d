// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use crate::prelude::*;

use patrol_adapters::ALERT;
use patrol_core::test_support::{mission_run, mission_status_event, task};
use patrol_core::{AreaId, MissionRunId, MissionStatus, RobotId, TaskType};
use patrol_engine::{EngineError, LOCALIZATION_FAILED};
use patrol_storage::{RobotPatch, Store};

async fn seed_run(world: &World, id: &str, external: &str, task_type: TaskType) {
    let mut run = mission_run(id, external, "robot-1");
    run.tasks.push(task("T1", task_type));
    world.store.insert_run(run).await.unwrap();
    world
        .store
        .assign_mission(&RobotId::new("robot-1"), &MissionRunId::new(id))
        .await
        .unwrap();
}

async fn stored_status(world: &World, id: &str) -> MissionStatus {
    world
        .store
        .run(&MissionRunId::new(id))
        .await
        .unwrap()
        .found()
        .unwrap()
        .status
}

#[tokio::test]
async fn failed_localization_clears_area_and_raises_alert() {
    let world = World::new().await;
    world
        .store
        .update_robot(
            &RobotId::new("robot-1"),
            RobotPatch {
                current_area: Some(Some(AreaId::new("deck-a"))),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    seed_run(&world, "run-100", "M100", TaskType::Localization).await;

    world
        .send(mission_status_event("R1", "M100", "failed"))
        .await
        .unwrap();

    let robot = world.robot_by_agent("R1").await.unwrap();
    assert_eq!(robot.current_area, None);
    assert_eq!(robot.current_mission_run, None);
    assert_eq!(stored_status(&world, "run-100").await, MissionStatus::Failed);
    assert_eq!(world.notifier.events(ALERT).len(), 1);
    assert_eq!(
        world.notifier.alert_titles(),
        vec![LOCALIZATION_FAILED.to_string()]
    );
}

#[tokio::test]
async fn unrecognized_status_token_leaves_run_unchanged() {
    let world = World::new().await;
    seed_run(&world, "run-200", "M200", TaskType::Inspection).await;
    let writes = world.store.write_count();

    let err = world
        .send(mission_status_event("R1", "M200", "unknown_token"))
        .await
        .unwrap_err();

    assert!(matches!(err, EngineError::UnrecognizedStatus(_)));
    assert_eq!(stored_status(&world, "run-200").await, MissionStatus::Pending);
    assert_eq!(world.store.write_count(), writes);
}

#[tokio::test]
async fn status_never_regresses_from_terminal() {
    let world = World::new().await;
    seed_run(&world, "run-300", "M300", TaskType::Inspection).await;

    world
        .send(mission_status_event("R1", "M300", "successful"))
        .await
        .unwrap();
    world
        .send(mission_status_event("R1", "M300", "in_progress"))
        .await
        .unwrap();

    assert_eq!(
        stored_status(&world, "run-300").await,
        MissionStatus::Successful
    );
}

#[tokio::test]
async fn completed_run_frees_the_robot_for_the_next_mission() {
    let world = World::new().await;
    seed_run(&world, "run-400", "M400", TaskType::Inspection).await;
    let router = world.router();

    router
        .route(mission_status_event("R1", "M400", "successful"))
        .await
        .unwrap();
    router.shutdown().await;

    let robot = world.robot_by_agent("R1").await.unwrap();
    assert_eq!(robot.current_mission_run, None);
    // Completion signal lets the scheduler dispatch the due definition
    assert_eq!(world.dispatcher.calls().len(), 1);
}
