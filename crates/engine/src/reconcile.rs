// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Robot state reconciliation.
//!
//! Each robot-info field is compared by a pure function returning the value
//! to store, whether it changed and a description of the change. The
//! reconciler folds the results into a single [`RobotPatch`].

use crate::error::EngineError;
use crate::identity::IdentityResolver;
use crate::publish;
use patrol_adapters::{Notification, NotifyAdapter, ROBOT_UPDATED};
use patrol_core::{
    IdGen, Installation, Lookup, Robot, RobotCapability, RobotId, RobotInfo, RobotStatus,
    SchedulerSignal, VideoStream,
};
use patrol_storage::{RobotPatch, Store};
use std::collections::BTreeSet;

/// Result of comparing one field
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDiff<T> {
    pub value: T,
    pub changed: bool,
    pub description: Option<String>,
}

impl<T> FieldDiff<T> {
    fn unchanged(value: T) -> Self {
        Self {
            value,
            changed: false,
            description: None,
        }
    }

    fn changed(value: T, description: String) -> Self {
        Self {
            value,
            changed: true,
            description: Some(description),
        }
    }

    /// The new value, only if it differs.
    pub fn into_change(self) -> Option<T> {
        self.changed.then_some(self.value)
    }
}

fn stream_set(streams: &[VideoStream]) -> BTreeSet<&VideoStream> {
    streams.iter().collect()
}

/// Streams compare as sets of (name, url, type): order and duplicates do not matter.
pub fn diff_video_streams(
    current: &[VideoStream],
    reported: &[VideoStream],
) -> FieldDiff<Vec<VideoStream>> {
    if stream_set(current) == stream_set(reported) {
        return FieldDiff::unchanged(current.to_vec());
    }
    let names = |streams: &[VideoStream]| {
        streams
            .iter()
            .map(|s| s.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    };
    FieldDiff::changed(
        reported.to_vec(),
        format!("video streams: [{}] -> [{}]", names(current), names(reported)),
    )
}

pub fn diff_host(current: &str, reported: &str) -> FieldDiff<String> {
    if current == reported {
        FieldDiff::unchanged(current.to_string())
    } else {
        FieldDiff::changed(
            reported.to_string(),
            format!("host: {current} -> {reported}"),
        )
    }
}

pub fn diff_port(current: u16, reported: u16) -> FieldDiff<u16> {
    if current == reported {
        FieldDiff::unchanged(current)
    } else {
        FieldDiff::changed(reported, format!("port: {current} -> {reported}"))
    }
}

/// Installations compare by code.
pub fn diff_installation(current_code: &str, reported: &Installation) -> FieldDiff<String> {
    if current_code == reported.code {
        FieldDiff::unchanged(current_code.to_string())
    } else {
        FieldDiff::changed(
            reported.code.clone(),
            format!("installation: {current_code} -> {}", reported.code),
        )
    }
}

/// Capabilities compare as ordered sequences: a reordering is a change.
///
/// A robot with no recorded capabilities always takes the reported ones.
pub fn diff_capabilities(
    current: Option<&[RobotCapability]>,
    reported: &[RobotCapability],
) -> FieldDiff<Vec<RobotCapability>> {
    match current {
        Some(current) if current == reported => FieldDiff::unchanged(current.to_vec()),
        _ => FieldDiff::changed(
            reported.to_vec(),
            format!(
                "capabilities: {:?} -> {:?}",
                current.unwrap_or_default(),
                reported
            ),
        ),
    }
}

/// Folded result of all field diffs
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InfoDiff {
    pub patch: RobotPatch,
    pub changes: Vec<String>,
}

impl InfoDiff {
    fn fold<T>(&mut self, diff: FieldDiff<T>, set: impl FnOnce(&mut RobotPatch, T)) {
        if let Some(description) = diff.description.clone() {
            self.changes.push(description);
        }
        if let Some(value) = diff.into_change() {
            set(&mut self.patch, value);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }
}

/// Compare a stored robot with a robot-info report.
///
/// Fields the agent did not report are left alone.
pub fn diff_info(robot: &Robot, info: &RobotInfo, installation: &Installation) -> InfoDiff {
    let mut diff = InfoDiff::default();
    if let Some(streams) = &info.video_streams {
        diff.fold(diff_video_streams(&robot.video_streams, streams), |p, v| {
            p.video_streams = Some(v)
        });
    }
    if let Some(host) = &info.host {
        diff.fold(diff_host(&robot.host, host), |p, v| p.host = Some(v));
    }
    diff.fold(diff_port(robot.port, info.port), |p, v| p.port = Some(v));
    diff.fold(
        diff_installation(&robot.installation_code, installation),
        |p, v| p.installation_code = Some(v),
    );
    if let Some(capabilities) = &info.capabilities {
        diff.fold(
            diff_capabilities(robot.capabilities.as_deref(), capabilities),
            |p, v| p.capabilities = Some(v),
        );
    }
    diff
}

/// What [`RobotReconciler::reconcile_info`] did
#[derive(Debug, Clone, PartialEq)]
pub enum InfoOutcome {
    Created(Robot),
    Updated { robot: Robot, changes: Vec<String> },
    Unchanged,
}

/// Applies robot-status and robot-info telemetry
#[derive(Clone)]
pub struct RobotReconciler<S, N, G> {
    store: S,
    notifier: N,
    identity: IdentityResolver<S>,
    id_gen: G,
}

impl<S, N, G> RobotReconciler<S, N, G>
where
    S: Store,
    N: NotifyAdapter,
    G: IdGen,
{
    pub fn new(store: S, notifier: N, id_gen: G) -> Self {
        Self {
            identity: IdentityResolver::new(store.clone()),
            store,
            notifier,
            id_gen,
        }
    }

    /// Store a reported status. Any status may follow any other.
    ///
    /// Returns the availability signal when the robot became available.
    pub async fn reconcile_status(
        &self,
        robot: &Robot,
        status: RobotStatus,
    ) -> Result<Option<SchedulerSignal>, EngineError> {
        if robot.status == status {
            return Ok(None);
        }
        let patch = RobotPatch {
            status: Some(status),
            ..RobotPatch::default()
        };
        let updated = self
            .store
            .update_robot(&robot.id, patch)
            .await?
            .found_or_else(|| EngineError::RobotNotFound(robot.id.to_string()))?;
        tracing::info!(
            robot = %robot.id,
            from = %robot.status,
            to = %status,
            "robot status changed"
        );
        self.publish_robot(&updated).await;

        Ok((status == RobotStatus::Available).then(|| SchedulerSignal::RobotAvailable {
            robot_id: robot.id.clone(),
        }))
    }

    /// Create the robot on first contact, otherwise apply changed fields.
    ///
    /// The reported installation must exist in both cases; otherwise the
    /// event is dropped with `InstallationNotFound` and nothing is written.
    pub async fn reconcile_info(
        &self,
        robot: Lookup<Robot>,
        info: &RobotInfo,
    ) -> Result<InfoOutcome, EngineError> {
        let installation = self
            .identity
            .installation(&info.installation)
            .await?
            .found_or_else(|| EngineError::InstallationNotFound(info.installation.clone()))?;

        let robot = match robot {
            Lookup::Found(robot) => robot,
            Lookup::NotFound => return self.create(info, &installation).await,
        };

        let diff = diff_info(&robot, info, &installation);
        if diff.is_empty() {
            tracing::debug!(robot = %robot.id, "robot info unchanged");
            return Ok(InfoOutcome::Unchanged);
        }

        let updated = self
            .store
            .update_robot(&robot.id, diff.patch)
            .await?
            .found_or_else(|| EngineError::RobotNotFound(robot.id.to_string()))?;
        tracing::info!(
            robot = %robot.id,
            changes = %diff.changes.join("; "),
            "robot info updated"
        );
        self.publish_robot(&updated).await;
        Ok(InfoOutcome::Updated {
            robot: updated,
            changes: diff.changes,
        })
    }

    async fn create(
        &self,
        info: &RobotInfo,
        installation: &Installation,
    ) -> Result<InfoOutcome, EngineError> {
        let robot = Robot {
            id: RobotId::generate(&self.id_gen),
            agent_id: info.agent_id.clone(),
            name: info.robot_name.clone(),
            robot_type: info.robot_type.clone(),
            serial_number: info.serial_number.clone(),
            host: info.host.clone().unwrap_or_default(),
            port: info.port,
            installation_code: installation.code.clone(),
            capabilities: info.capabilities.clone(),
            video_streams: info.video_streams.clone().unwrap_or_default(),
            status: RobotStatus::Available,
            battery_level: 0.0,
            battery_state: None,
            pressure_level: None,
            pose: None,
            current_mission_run: None,
            current_area: None,
            pending_dispatch: None,
            deprecated: false,
        };
        self.store.insert_robot(robot.clone()).await?;
        tracing::info!(
            robot = %robot.id,
            agent = %robot.agent_id,
            name = %robot.name,
            installation = %installation,
            "created robot on first contact"
        );
        self.publish_robot(&robot).await;
        Ok(InfoOutcome::Created(robot))
    }

    async fn publish_robot(&self, robot: &Robot) {
        let notification = Notification::new(
            ROBOT_UPDATED,
            robot.installation_code.clone(),
            publish::payload(robot),
        );
        publish::send(&self.notifier, notification).await;
    }
}

#[cfg(test)]
#[path = "reconcile_tests.rs"]
mod tests;
