// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Auto-scheduling of recurring mission definitions.
//!
//! Evaluation for a robot runs inside that robot's critical section, and
//! each due occurrence is claimed with a compare-and-set on the
//! definition's dispatch marker before the dispatch collaborator is called.
//! Together these guarantee at most one dispatch per due occurrence.
//!
//! The robot is then reserved with a pending-dispatch claim until the run
//! is assigned or finished, so it is not handed a second mission meanwhile.
//! A claim older than the due window no longer blocks the robot.

use crate::error::EngineError;
use chrono::{DateTime, NaiveTime, TimeDelta, Utc};
use parking_lot::Mutex;
use patrol_adapters::{DispatchAdapter, DispatchRequest};
use patrol_core::{
    Clock, Lookup, MissionDefinition, MissionDefinitionId, PendingDispatch, RobotId,
    SchedulerSignal, SkipException,
};
use patrol_storage::Store;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerConfig {
    /// How long after its scheduled instant an occurrence may still be dispatched
    pub due_window: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            due_window: Duration::from_secs(60 * 60),
        }
    }
}

/// The occurrence of `definition` that is due at `now`, if any.
///
/// Due means: the latest scheduled instant at or before `now`, no older
/// than `window`, not skipped, and not yet dispatched.
pub fn due_occurrence(
    definition: &MissionDefinition,
    now: DateTime<Utc>,
    window: Duration,
) -> Option<DateTime<Utc>> {
    let rule = definition.auto_schedule.as_ref()?;
    let occurrence = rule.latest_at_or_before(now)?;
    let window = TimeDelta::from_std(window).unwrap_or_else(|_| TimeDelta::weeks(1));
    if now - occurrence > window || definition.is_skipped(occurrence) {
        return None;
    }
    match definition.last_dispatched {
        Some(dispatched) if dispatched >= occurrence => None,
        _ => Some(occurrence),
    }
}

type RobotLocks = Mutex<HashMap<RobotId, Arc<tokio::sync::Mutex<()>>>>;

#[derive(Clone)]
pub struct AutoScheduler<S, D, C> {
    store: S,
    dispatcher: D,
    clock: C,
    config: SchedulerConfig,
    locks: Arc<RobotLocks>,
}

impl<S, D, C> AutoScheduler<S, D, C>
where
    S: Store,
    D: DispatchAdapter,
    C: Clock,
{
    pub fn new(store: S, dispatcher: D, clock: C, config: SchedulerConfig) -> Self {
        Self {
            store,
            dispatcher,
            clock,
            config,
            locks: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Sink for "robot available" and "mission completed" signals.
    pub async fn on_signal(
        &self,
        signal: &SchedulerSignal,
    ) -> Result<Option<DispatchRequest>, EngineError> {
        tracing::debug!(signal = signal.name(), robot = %signal.robot_id(), "scheduler signal");
        self.evaluate_robot(signal.robot_id()).await
    }

    /// Dispatch at most one due occurrence to `robot_id` if it is idle.
    pub async fn evaluate_robot(
        &self,
        robot_id: &RobotId,
    ) -> Result<Option<DispatchRequest>, EngineError> {
        let lock = self.robot_lock(robot_id);
        let _guard = lock.lock().await;

        let robot = self
            .store
            .robot(robot_id)
            .await?
            .found_or_else(|| EngineError::RobotNotFound(robot_id.to_string()))?;
        if !robot.is_idle() {
            tracing::debug!(robot = %robot_id, status = ?robot.status, "robot not idle, nothing to schedule");
            return Ok(None);
        }
        let now = self.clock.now();
        let stale_before = now - self.window();
        if robot.awaiting_dispatch(stale_before) {
            tracing::debug!(robot = %robot_id, "robot awaiting a dispatched mission");
            return Ok(None);
        }

        let mut due: Vec<(DateTime<Utc>, MissionDefinition)> = self
            .store
            .definitions()
            .await?
            .into_iter()
            .filter(|d| !d.deprecated && d.installation_code == robot.installation_code)
            .filter_map(|d| due_occurrence(&d, now, self.config.due_window).map(|at| (at, d)))
            .collect();
        due.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.id.cmp(&b.1.id)));

        for (occurrence, definition) in due {
            let claimed = self
                .store
                .mark_dispatched(&definition.id, occurrence)
                .await?;
            if claimed != Lookup::Found(true) {
                tracing::debug!(
                    definition = %definition.id,
                    %occurrence,
                    "occurrence already claimed"
                );
                continue;
            }

            let claim = PendingDispatch {
                definition_id: definition.id.clone(),
                occurrence,
                dispatched_at: now,
            };
            let reserved = self
                .store
                .claim_robot(robot_id, claim.clone(), stale_before)
                .await;
            match reserved {
                Ok(Lookup::Found(true)) => {}
                Ok(outcome) => {
                    self.release_occurrence(&definition, occurrence).await;
                    return match outcome {
                        Lookup::NotFound => Err(EngineError::RobotNotFound(robot_id.to_string())),
                        Lookup::Found(_) => Ok(None),
                    };
                }
                Err(e) => {
                    self.release_occurrence(&definition, occurrence).await;
                    return Err(e.into());
                }
            }

            return self.dispatch(robot_id, &definition, claim).await.map(Some);
        }
        Ok(None)
    }

    async fn dispatch(
        &self,
        robot_id: &RobotId,
        definition: &MissionDefinition,
        claim: PendingDispatch,
    ) -> Result<DispatchRequest, EngineError> {
        let occurrence = claim.occurrence;
        let request = DispatchRequest {
            definition_id: definition.id.clone(),
            robot_id: robot_id.clone(),
            occurrence,
        };
        match self.dispatcher.start_mission(request.clone()).await {
            Ok(()) => {
                tracing::info!(
                    definition = %definition.id,
                    robot = %robot_id,
                    %occurrence,
                    "auto-scheduled mission dispatched"
                );
                Ok(request)
            }
            Err(e) => {
                self.release_occurrence(definition, occurrence).await;
                if let Err(release) = self.store.release_robot(robot_id, &claim).await {
                    tracing::error!(
                        robot = %robot_id,
                        error = %release,
                        "failed to release robot claim"
                    );
                }
                Err(e.into())
            }
        }
    }

    async fn release_occurrence(&self, definition: &MissionDefinition, occurrence: DateTime<Utc>) {
        let released = self
            .store
            .release_dispatched(&definition.id, occurrence, definition.last_dispatched)
            .await;
        if let Err(e) = released {
            tracing::error!(
                definition = %definition.id,
                %occurrence,
                error = %e,
                "failed to release dispatch claim"
            );
        }
    }

    fn window(&self) -> TimeDelta {
        TimeDelta::from_std(self.config.due_window).unwrap_or_else(|_| TimeDelta::weeks(1))
    }

    /// Re-evaluate every idle robot. Per-robot failures are logged.
    pub async fn tick(&self) -> Result<Vec<DispatchRequest>, EngineError> {
        let robots = self.store.robots().await?;
        let mut dispatched = Vec::new();
        for robot in robots.into_iter().filter(|r| r.is_idle()) {
            match self.evaluate_robot(&robot.id).await {
                Ok(Some(request)) => dispatched.push(request),
                Ok(None) => {}
                Err(e) if e.is_not_found() => {
                    tracing::warn!(robot = %robot.id, error = %e, "scheduler tick skipped robot");
                }
                Err(e) => {
                    tracing::error!(robot = %robot.id, error = %e, "scheduler tick failed for robot");
                }
            }
        }
        Ok(dispatched)
    }

    /// Next non-skipped occurrence; `None` without a recurrence rule.
    pub async fn next_run(
        &self,
        definition_id: &MissionDefinitionId,
    ) -> Result<Option<DateTime<Utc>>, EngineError> {
        let definition = self.definition(definition_id).await?;
        Ok(definition.next_run(self.clock.now()))
    }

    /// Skip the next future occurrence at `time_of_day`.
    ///
    /// Rejects times the recurrence rule never produces. Past skips are
    /// pruned as a side effect.
    pub async fn register_skip(
        &self,
        definition_id: &MissionDefinitionId,
        time_of_day: NaiveTime,
    ) -> Result<SkipException, EngineError> {
        let definition = self.definition(definition_id).await?;
        let Some(rule) = definition.auto_schedule.as_ref() else {
            return Err(EngineError::InvalidArgument(format!(
                "definition {definition_id} has no auto-schedule"
            )));
        };
        if !rule.produces_time_of_day(time_of_day) {
            return Err(EngineError::InvalidArgument(format!(
                "{time_of_day} is not a scheduled time of day for definition {definition_id}"
            )));
        }

        let now = self.clock.now();
        let occurrence = rule
            .occurrences_after(now)
            .find(|at| at.time() == time_of_day)
            .ok_or_else(|| {
                EngineError::InvalidArgument(format!(
                    "no upcoming occurrence at {time_of_day} for definition {definition_id}"
                ))
            })?;
        let skip = SkipException::at(occurrence);
        self.store
            .add_skip(definition_id, skip, now)
            .await?
            .found_or_else(|| EngineError::DefinitionNotFound(definition_id.to_string()))?;
        tracing::info!(definition = %definition_id, %occurrence, "occurrence skipped");
        Ok(skip)
    }

    async fn definition(
        &self,
        id: &MissionDefinitionId,
    ) -> Result<MissionDefinition, EngineError> {
        self.store
            .definition(id)
            .await?
            .found_or_else(|| EngineError::DefinitionNotFound(id.to_string()))
    }

    fn robot_lock(&self, robot_id: &RobotId) -> Arc<tokio::sync::Mutex<()>> {
        self.locks.lock().entry(robot_id.clone()).or_default().clone()
    }
}

#[cfg(test)]
#[path = "scheduler_tests.rs"]
mod tests;
