// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

use patrol_core::test_support::{installation, robot, robot_info_event};
use patrol_core::RobotId;
use patrol_daemon::config::Settings;
use tempfile::tempdir;

fn test_config(dir: &std::path::Path) -> Config {
    Config::for_state_dir(dir.join("state"), Settings::default())
}

fn seeded_state() -> FleetState {
    let mut state = FleetState::default();
    let site = installation("SITE-A");
    state.installations.insert(site.code.clone(), site);
    let r1 = robot("robot-1", "R1", "SITE-A");
    state.robots.insert(r1.id.clone(), r1);
    state
}

#[tokio::test]
async fn startup_creates_socket_and_pid_file() {
    let dir = tempdir().unwrap();
    let config = test_config(dir.path());

    let result = startup(&config).await.unwrap();

    assert!(config.socket_path.exists());
    let pid = std::fs::read_to_string(&config.lock_path).unwrap();
    assert_eq!(pid.trim(), std::process::id().to_string());
    assert!(result.daemon.store.state().robots.is_empty());

    result.daemon.shutdown().await.unwrap();
}

#[tokio::test]
async fn second_startup_fails_on_lock_and_leaves_files() {
    let dir = tempdir().unwrap();
    let config = test_config(dir.path());

    let first = startup(&config).await.unwrap();
    let second = startup(&config).await;

    assert!(matches!(second, Err(LifecycleError::LockFailed(_))));
    assert!(config.socket_path.exists());
    assert!(config.lock_path.exists());

    first.daemon.shutdown().await.unwrap();
}

#[tokio::test]
async fn startup_restores_fleet_from_snapshot() {
    let dir = tempdir().unwrap();
    let config = test_config(dir.path());
    std::fs::create_dir_all(&config.state_dir).unwrap();
    Snapshot::new(seeded_state(), Utc::now())
        .save(&config.snapshot_path)
        .unwrap();

    let result = startup(&config).await.unwrap();

    let state = result.daemon.store.state();
    assert!(state.robots.contains_key(&RobotId::new("robot-1")));
    assert!(state.installations.contains_key("SITE-A"));

    result.daemon.shutdown().await.unwrap();
}

#[tokio::test]
async fn shutdown_writes_snapshot_and_removes_runtime_files() {
    let dir = tempdir().unwrap();
    let config = test_config(dir.path());
    std::fs::create_dir_all(&config.state_dir).unwrap();
    Snapshot::new(seeded_state(), Utc::now())
        .save(&config.snapshot_path)
        .unwrap();

    let result = startup(&config).await.unwrap();
    result
        .daemon
        .router
        .route(robot_info_event("R7", "SITE-A"))
        .await
        .unwrap();
    result.daemon.shutdown().await.unwrap();

    assert!(!config.socket_path.exists());
    assert!(!config.lock_path.exists());
    let snapshot = Snapshot::load(&config.snapshot_path).unwrap().unwrap();
    assert_eq!(snapshot.state.robots.len(), 2);
    assert!(snapshot
        .state
        .robots
        .values()
        .any(|r| r.agent_id.as_str() == "R7"));
}

#[tokio::test]
async fn checkpoint_saves_current_state() {
    let dir = tempdir().unwrap();
    let config = test_config(dir.path());

    let result = startup(&config).await.unwrap();
    let bytes = checkpoint(&result.daemon.store, &config).unwrap();

    assert!(bytes > 0);
    assert!(Snapshot::load(&config.snapshot_path).unwrap().is_some());

    result.daemon.shutdown().await.unwrap();
}

#[tokio::test]
async fn notifications_reach_outbound_subscribers() {
    let dir = tempdir().unwrap();
    let config = test_config(dir.path());
    std::fs::create_dir_all(&config.state_dir).unwrap();
    Snapshot::new(seeded_state(), Utc::now())
        .save(&config.snapshot_path)
        .unwrap();

    let result = startup(&config).await.unwrap();
    let mut outbound = result.daemon.outbound.subscribe();
    result
        .daemon
        .router
        .route(robot_info_event("R7", "SITE-A"))
        .await
        .unwrap();

    let received = tokio::time::timeout(std::time::Duration::from_secs(2), outbound.recv())
        .await
        .unwrap()
        .unwrap();
    match received {
        Outbound::Notification(n) => {
            assert_eq!(n.event, patrol_adapters::ROBOT_UPDATED);
            assert_eq!(n.installation_code, "SITE-A");
        }
        other => panic!("unexpected outbound message: {other:?}"),
    }

    result.daemon.shutdown().await.unwrap();
}
