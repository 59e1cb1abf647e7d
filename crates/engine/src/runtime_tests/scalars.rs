// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::telemetry::TELEMETRY_FAILED;
use patrol_adapters::ALERT;
use patrol_core::test_support::{battery_event, cloud_health_event, pressure_event};
use patrol_core::{AgentId, Pose, Position};

#[tokio::test]
async fn battery_and_pressure_reach_the_robot() {
    let ctx = setup().await;
    ctx.handle(battery_event("R1", 61.0)).await.unwrap();
    ctx.handle(pressure_event("R1", 1.2)).await.unwrap();

    let robot = ctx.robot("robot-1").await;
    assert_eq!(robot.battery_level, 61.0);
    assert_eq!(robot.pressure_level, Some(1.2));
}

#[tokio::test]
async fn pose_reaches_the_robot() {
    let ctx = setup().await;
    let pose = Pose {
        position: Position {
            x: 3.0,
            y: -1.5,
            z: 0.0,
        },
        ..Default::default()
    };
    ctx.handle(TelemetryEvent::Pose {
        agent_id: AgentId::new("R1"),
        pose,
    })
    .await
    .unwrap();
    assert_eq!(ctx.robot("robot-1").await.pose, Some(pose));
}

#[tokio::test]
async fn scalar_from_unknown_agent_is_dropped() {
    let ctx = setup().await;
    let writes = ctx.store.write_count();
    let err = ctx.handle(battery_event("R404", 5.0)).await.unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(ctx.store.write_count(), writes);
}

#[tokio::test]
async fn cloud_health_alerts_installation() {
    let ctx = setup().await;
    ctx.handle(cloud_health_event("R1", "Deck Crawler")).await.unwrap();
    assert_eq!(ctx.notifier.alert_titles(), vec![TELEMETRY_FAILED.to_string()]);
    let alert = &ctx.notifier.events(ALERT)[0];
    assert_eq!(alert.installation_code, "SITE-A");
    assert_eq!(
        alert.payload["message"],
        "Failed telemetry request for robot Deck Crawler."
    );
}
