// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use patrol_adapters::MISSION_RUN_UPDATED;
use patrol_core::test_support::{
    mission_status_event, step, step_status_event, task, task_status_event,
};
use patrol_core::{MissionRunId, MissionStatus, StepStatus, StepType, TaskStatus, TaskType};

async fn run(ctx: &TestContext, id: &str) -> patrol_core::MissionRun {
    ctx.store
        .run(&MissionRunId::new(id))
        .await
        .unwrap()
        .found()
        .unwrap()
}

#[tokio::test]
async fn terminal_status_emits_completion_signal() {
    let ctx = setup().await;
    ctx.store
        .assign_mission(&RobotId::new("robot-1"), &MissionRunId::new("run-1"))
        .await
        .unwrap();

    let signals = ctx
        .handle(mission_status_event("R1", "M1", "in_progress"))
        .await
        .unwrap();
    assert!(signals.is_empty());

    let signals = ctx
        .handle(mission_status_event("R1", "M1", "successful"))
        .await
        .unwrap();
    assert_eq!(
        signals,
        vec![SchedulerSignal::MissionCompleted {
            robot_id: RobotId::new("robot-1")
        }]
    );
    assert_eq!(run(&ctx, "run-1").await.status, MissionStatus::Successful);
    assert_eq!(ctx.robot("robot-1").await.current_mission_run, None);

    let again = ctx
        .handle(mission_status_event("R1", "M1", "successful"))
        .await
        .unwrap();
    assert!(again.is_empty());
}

#[tokio::test]
async fn unknown_mission_token_changes_nothing() {
    let ctx = setup().await;
    ctx.store
        .insert_run(mission_run("run-200", "M200", "robot-1"))
        .await
        .unwrap();
    let writes = ctx.store.write_count();

    let err = ctx
        .handle(mission_status_event("R1", "M200", "unknown_token"))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::UnrecognizedStatus(_)));
    assert_eq!(run(&ctx, "run-200").await.status, MissionStatus::Pending);
    assert_eq!(ctx.store.write_count(), writes);
}

#[tokio::test]
async fn status_for_unknown_mission_is_not_found() {
    let ctx = setup().await;
    let err = ctx
        .handle(mission_status_event("R1", "M404", "failed"))
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::RunNotFound("M404".into()));
}

#[tokio::test]
async fn task_and_step_events_update_the_run() {
    let ctx = setup().await;
    let mut seeded = mission_run("run-2", "M2", "robot-1");
    let mut inspection = task("T1", TaskType::Inspection);
    inspection.steps.push(step("S1", StepType::RecordAudio));
    seeded.tasks.push(inspection);
    ctx.store.insert_run(seeded).await.unwrap();

    ctx.handle(task_status_event("R1", "M2", "T1", "in_progress"))
        .await
        .unwrap();
    ctx.handle(step_status_event("R1", "M2", "T1", "S1", "record_audio", "failed"))
        .await
        .unwrap();

    let stored = run(&ctx, "run-2").await;
    assert_eq!(stored.tasks[0].status, TaskStatus::InProgress);
    assert_eq!(stored.tasks[0].steps[0].status, StepStatus::Failed);
    assert_eq!(ctx.notifier.events(MISSION_RUN_UPDATED).len(), 2);
}

#[tokio::test]
async fn navigation_steps_are_ignored() {
    let ctx = setup().await;
    let writes = ctx.store.write_count();
    let signals = ctx
        .handle(step_status_event("R1", "M1", "T1", "S9", "drive_to_pose", "successful"))
        .await
        .unwrap();
    assert!(signals.is_empty());
    assert_eq!(ctx.store.write_count(), writes);
}
