// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use patrol_core::test_support::{epoch, installation, mission_run, robot};

#[tokio::test]
async fn lookups_report_not_found() {
    let store = MemoryStore::default();
    assert!(!store.robot(&RobotId::new("robot-1")).await.unwrap().is_found());
    assert!(!store
        .robot_by_agent(&AgentId::new("R7"))
        .await
        .unwrap()
        .is_found());
    assert!(!store.installation_by_name("SITE-A").await.unwrap().is_found());
    assert!(!store
        .run_by_external(&ExternalMissionId::new("M1"))
        .await
        .unwrap()
        .is_found());
}

#[tokio::test]
async fn insert_robot_rejects_duplicate_agent() {
    let store = MemoryStore::default();
    store.insert_robot(robot("robot-1", "R7", "SITE-A")).await.unwrap();
    let err = store
        .insert_robot(robot("robot-2", "R7", "SITE-A"))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Duplicate { kind: "robot", .. }));
    assert_eq!(store.write_count(), 1);
}

#[tokio::test]
async fn empty_patch_performs_no_write() {
    let store = MemoryStore::default();
    store.insert_robot(robot("robot-1", "R7", "SITE-A")).await.unwrap();
    let before = store.write_count();

    let found = store
        .update_robot(&RobotId::new("robot-1"), RobotPatch::default())
        .await
        .unwrap();
    assert!(found.is_found());
    assert_eq!(store.write_count(), before);

    let patch = RobotPatch {
        host: Some("10.0.0.9".into()),
        ..RobotPatch::default()
    };
    let updated = store
        .update_robot(&RobotId::new("robot-1"), patch)
        .await
        .unwrap()
        .found()
        .unwrap();
    assert_eq!(updated.host, "10.0.0.9");
    assert_eq!(store.write_count(), before + 1);
}

#[tokio::test]
async fn insert_run_rejects_live_duplicate_external_id() {
    let store = MemoryStore::default();
    store.insert_run(mission_run("run-1", "M1", "robot-1")).await.unwrap();
    let err = store
        .insert_run(mission_run("run-2", "M1", "robot-1"))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Duplicate { .. }));

    store
        .transition_run(
            &MissionRunId::new("run-1"),
            MissionStatus::Pending,
            MissionStatus::Failed,
            epoch(),
        )
        .await
        .unwrap();
    store.insert_run(mission_run("run-2", "M1", "robot-1")).await.unwrap();
}

#[tokio::test]
async fn injected_failures_are_transient_and_counted_down() {
    let store = MemoryStore::default();
    store.insert_installation(installation("SITE-A")).await.unwrap();
    store.fail_next("installation_by_name", 2);

    for _ in 0..2 {
        let err = store.installation_by_name("SITE-A").await.unwrap_err();
        assert!(err.is_transient());
    }
    assert!(store.installation_by_name("SITE-A").await.unwrap().is_found());
}

#[tokio::test]
async fn state_returns_snapshot_copy() {
    let store = MemoryStore::default();
    store.insert_robot(robot("robot-1", "R7", "SITE-A")).await.unwrap();
    let state = store.state();
    store.insert_robot(robot("robot-2", "R8", "SITE-A")).await.unwrap();
    assert_eq!(state.robots.len(), 1);
    assert_eq!(store.robots().await.unwrap().len(), 2);
}
