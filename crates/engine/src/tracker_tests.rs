// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use patrol_adapters::FakeNotifyAdapter;
use patrol_core::test_support::{mission_run, step, task};
use patrol_core::{FakeClock, MissionRunId, TaskType};
use patrol_storage::MemoryStore;

type TestTracker = TaskStepTracker<MemoryStore, FakeNotifyAdapter, FakeClock>;

async fn setup() -> (MemoryStore, FakeNotifyAdapter, TestTracker) {
    let store = MemoryStore::default();
    let mut run = mission_run("run-1", "M1", "robot-1");
    let mut t = task("T1", TaskType::Inspection);
    t.steps.push(step("S1", StepType::TakeImage));
    t.steps.push(step("S2", StepType::DriveToPose));
    run.tasks.push(t);
    store.insert_run(run).await.unwrap();
    let notifier = FakeNotifyAdapter::new();
    let tracker = TaskStepTracker::new(store.clone(), notifier.clone(), FakeClock::new());
    (store, notifier, tracker)
}

fn ids(mission: &str) -> ExternalMissionId {
    ExternalMissionId::new(mission)
}

#[tokio::test]
async fn task_update_writes_and_republishes() {
    let (store, notifier, tracker) = setup().await;
    let changed = tracker
        .update_task_status(&ids("M1"), &ExternalTaskId::new("T1"), "in_progress")
        .await
        .unwrap();
    assert!(changed);

    let run = store.run(&MissionRunId::new("run-1")).await.unwrap().found().unwrap();
    assert_eq!(run.tasks[0].status, TaskStatus::InProgress);
    assert!(run.tasks[0].started_at.is_some());
    let published = notifier.events(MISSION_RUN_UPDATED);
    assert_eq!(published.len(), 1);
    assert_eq!(published[0].payload["id"], "run-1");
}

#[tokio::test]
async fn unknown_task_is_task_not_found() {
    let (_, notifier, tracker) = setup().await;
    let err = tracker
        .update_task_status(&ids("M1"), &ExternalTaskId::new("T9"), "failed")
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::TaskNotFound("T9".into()));
    assert!(notifier.calls().is_empty());
}

#[tokio::test]
async fn unparseable_task_status_is_rejected() {
    let (store, _, tracker) = setup().await;
    let writes = store.write_count();
    let err = tracker
        .update_task_status(&ids("M1"), &ExternalTaskId::new("T1"), "exploded")
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::UnrecognizedStatus(_)));
    assert_eq!(store.write_count(), writes);
}

#[yare::parameterized(
    drive_to_pose  = { "drive_to_pose" },
    localize       = { "localize" },
    move_arm       = { "move_arm" },
    return_to_home = { "return_to_home" },
)]
fn navigation_steps_never_reach_the_store(step_type: &str) {
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap();
    rt.block_on(async {
        let (store, notifier, tracker) = setup().await;
        let writes = store.write_count();
        let update = tracker
            .update_step_status(&ids("M1"), &ExternalStepId::new("S2"), step_type, "bogus")
            .await
            .unwrap();
        assert!(matches!(update, StepUpdate::Ignored(_)));
        assert_eq!(store.write_count(), writes);
        assert!(notifier.calls().is_empty());
    });
}

#[tokio::test]
async fn inspection_step_update_applies() {
    let (store, notifier, tracker) = setup().await;
    let update = tracker
        .update_step_status(&ids("M1"), &ExternalStepId::new("S1"), "take_image", "successful")
        .await
        .unwrap();
    assert_eq!(update, StepUpdate::Applied(true));
    let run = store.run(&MissionRunId::new("run-1")).await.unwrap().found().unwrap();
    assert_eq!(run.tasks[0].steps[0].status, StepStatus::Successful);
    assert_eq!(notifier.events(MISSION_RUN_UPDATED).len(), 1);
}

#[tokio::test]
async fn unknown_step_and_step_type() {
    let (_, _, tracker) = setup().await;
    let err = tracker
        .update_step_status(&ids("M1"), &ExternalStepId::new("S9"), "take_image", "failed")
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::StepNotFound("S9".into()));

    let err = tracker
        .update_step_status(&ids("M1"), &ExternalStepId::new("S1"), "teleport", "failed")
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::UnrecognizedStepType(_)));
}

#[tokio::test]
async fn missing_run_for_snapshot_is_only_logged() {
    let (_, notifier, tracker) = setup().await;
    let changed = tracker
        .update_task_status(&ids("M-other"), &ExternalTaskId::new("T1"), "failed")
        .await
        .unwrap();
    assert!(changed);
    assert!(notifier.calls().is_empty());
}
