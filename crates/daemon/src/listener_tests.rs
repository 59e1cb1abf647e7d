// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

use std::time::Duration;

use chrono::Utc;
use patrol_core::test_support::{installation, robot_info_event};
use patrol_daemon::config::{Config, Settings};
use patrol_storage::{FleetState, Snapshot};
use tempfile::{tempdir, TempDir};
use tokio::io::AsyncBufReadExt;

use crate::lifecycle::{startup, DaemonState};

struct Harness {
    _dir: TempDir,
    daemon: DaemonState,
    socket: std::path::PathBuf,
    task: tokio::task::JoinHandle<()>,
}

impl Harness {
    async fn shutdown(self) {
        self.task.abort();
        self.daemon.shutdown().await.unwrap();
    }
}

async fn start() -> Harness {
    let dir = tempdir().unwrap();
    let config = Config::for_state_dir(dir.path().join("state"), Settings::default());
    std::fs::create_dir_all(&config.state_dir).unwrap();
    let mut state = FleetState::default();
    let site = installation("SITE-A");
    state.installations.insert(site.code.clone(), site);
    Snapshot::new(state, Utc::now())
        .save(&config.snapshot_path)
        .unwrap();

    let result = startup(&config).await.unwrap();
    let listener = Listener::new(
        result.listener,
        result.daemon.router.handle(),
        result.daemon.outbound.clone(),
    );
    Harness {
        _dir: dir,
        daemon: result.daemon,
        socket: config.socket_path,
        task: tokio::spawn(listener.run()),
    }
}

fn line(event: &patrol_core::TelemetryEvent) -> String {
    format!("{}\n", serde_json::to_string(event).unwrap())
}

async fn wait_for_robot(daemon: &DaemonState, agent: &str) -> bool {
    for _ in 0..100 {
        if daemon
            .store
            .state()
            .robots
            .values()
            .any(|r| r.agent_id.as_str() == agent)
        {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    false
}

#[tokio::test]
async fn telemetry_lines_are_routed_to_the_engine() {
    let h = start().await;

    let mut client = UnixStream::connect(&h.socket).await.unwrap();
    client
        .write_all(line(&robot_info_event("R7", "SITE-A")).as_bytes())
        .await
        .unwrap();

    assert!(wait_for_robot(&h.daemon, "R7").await);
    drop(client);
    h.shutdown().await;
}

#[tokio::test]
async fn malformed_line_does_not_close_connection() {
    let h = start().await;

    let mut client = UnixStream::connect(&h.socket).await.unwrap();
    client.write_all(b"this is not json\n\n").await.unwrap();
    client
        .write_all(line(&robot_info_event("R8", "SITE-A")).as_bytes())
        .await
        .unwrap();

    assert!(wait_for_robot(&h.daemon, "R8").await);
    drop(client);
    h.shutdown().await;
}

#[tokio::test]
async fn oversized_line_is_skipped_and_connection_survives() {
    let h = start().await;

    let mut client = UnixStream::connect(&h.socket).await.unwrap();
    let mut huge = vec![b'x'; patrol_daemon::wire::MAX_LINE_BYTES * 3];
    huge.push(b'\n');
    client.write_all(&huge).await.unwrap();
    client
        .write_all(line(&robot_info_event("R8", "SITE-A")).as_bytes())
        .await
        .unwrap();

    assert!(wait_for_robot(&h.daemon, "R8").await);
    drop(client);
    h.shutdown().await;
}

#[tokio::test]
async fn invalid_utf8_line_is_skipped() {
    let h = start().await;

    let mut client = UnixStream::connect(&h.socket).await.unwrap();
    client.write_all(b"{\"type\":\"\xff\xfe\"}\n").await.unwrap();
    client
        .write_all(line(&robot_info_event("R8", "SITE-A")).as_bytes())
        .await
        .unwrap();

    assert!(wait_for_robot(&h.daemon, "R8").await);
    drop(client);
    h.shutdown().await;
}

#[tokio::test]
async fn frames_split_on_newlines_and_cap_length() {
    let limit = patrol_daemon::wire::MAX_LINE_BYTES;
    let mut input = b"first\r\n".to_vec();
    input.extend(vec![b'a'; limit]);
    input.push(b'\n');
    input.extend(vec![b'b'; limit + 1]);
    input.extend(b"tail of the long line\nlast");
    let mut reader = &input[..];

    assert_eq!(
        read_frame(&mut reader).await.unwrap(),
        Frame::Line(b"first".to_vec())
    );
    assert_eq!(
        read_frame(&mut reader).await.unwrap(),
        Frame::Line(vec![b'a'; limit])
    );
    assert_eq!(read_frame(&mut reader).await.unwrap(), Frame::Oversized);
    assert_eq!(
        read_frame(&mut reader).await.unwrap(),
        Frame::Line(b"last".to_vec())
    );
    assert_eq!(read_frame(&mut reader).await.unwrap(), Frame::Closed);
}

#[tokio::test]
async fn subscriber_receives_notifications_as_json_lines() {
    let h = start().await;

    let subscriber = UnixStream::connect(&h.socket).await.unwrap();
    let (read_half, mut write_half) = subscriber.into_split();
    write_half
        .write_all(b"{\"type\":\"subscribe\"}\n")
        .await
        .unwrap();
    // Let the subscription register before telemetry arrives
    tokio::time::sleep(Duration::from_millis(50)).await;

    let mut agent = UnixStream::connect(&h.socket).await.unwrap();
    agent
        .write_all(line(&robot_info_event("R7", "SITE-A")).as_bytes())
        .await
        .unwrap();

    let mut lines = BufReader::new(read_half).lines();
    let received = tokio::time::timeout(Duration::from_secs(2), lines.next_line())
        .await
        .unwrap()
        .unwrap()
        .unwrap();
    let value: serde_json::Value = serde_json::from_str(&received).unwrap();
    assert_eq!(value["type"], "notification");
    assert_eq!(value["event"], patrol_adapters::ROBOT_UPDATED);
    assert_eq!(value["installation_code"], "SITE-A");

    drop(agent);
    drop(write_half);
    h.shutdown().await;
}
