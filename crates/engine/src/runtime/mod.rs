// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Runtime that applies telemetry to the fleet model

mod handlers;

use crate::duration::DurationEstimator;
use crate::identity::IdentityResolver;
use crate::mission_run::MissionRunMachine;
use crate::reconcile::RobotReconciler;
use crate::retry::RetryPolicy;
use crate::scheduler::{AutoScheduler, SchedulerConfig};
use crate::telemetry::ScalarTelemetry;
use crate::tracker::TaskStepTracker;
use patrol_adapters::{DispatchAdapter, NotifyAdapter};
use patrol_core::{Clock, IdGen, UuidIdGen};
use patrol_storage::Store;

/// Engine tuning knobs
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Re-drive policy for completion steps that hit transient store failures
    pub completion: RetryPolicy,
    /// Recent terminal runs per robot model feeding the duration average
    pub duration_sample_runs: usize,
    pub scheduler: SchedulerConfig,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            completion: RetryPolicy::default(),
            duration_sample_runs: 50,
            scheduler: SchedulerConfig::default(),
        }
    }
}

/// Runtime collaborator dependencies
pub struct RuntimeDeps<S, N, D, G = UuidIdGen> {
    pub store: S,
    pub notifier: N,
    pub dispatcher: D,
    pub id_gen: G,
}

/// Owns one instance of every component; cheap to share behind an `Arc`.
pub struct Runtime<S, N, D, C: Clock, G = UuidIdGen> {
    pub(crate) store: S,
    pub(crate) identity: IdentityResolver<S>,
    pub(crate) reconciler: RobotReconciler<S, N, G>,
    pub(crate) missions: MissionRunMachine<S, N, C>,
    pub(crate) tracker: TaskStepTracker<S, N, C>,
    pub(crate) telemetry: ScalarTelemetry<S, N>,
    pub(crate) scheduler: AutoScheduler<S, D, C>,
    clock: C,
}

impl<S, N, D, C, G> Runtime<S, N, D, C, G>
where
    S: Store,
    N: NotifyAdapter,
    D: DispatchAdapter,
    C: Clock,
    G: IdGen,
{
    pub fn new(deps: RuntimeDeps<S, N, D, G>, clock: C, config: RuntimeConfig) -> Self {
        let RuntimeDeps {
            store,
            notifier,
            dispatcher,
            id_gen,
        } = deps;
        let estimator = DurationEstimator::new(store.clone(), config.duration_sample_runs);
        Self {
            identity: IdentityResolver::new(store.clone()),
            reconciler: RobotReconciler::new(store.clone(), notifier.clone(), id_gen),
            missions: MissionRunMachine::new(
                store.clone(),
                notifier.clone(),
                clock.clone(),
                config.completion,
                estimator,
            ),
            tracker: TaskStepTracker::new(store.clone(), notifier.clone(), clock.clone()),
            telemetry: ScalarTelemetry::new(store.clone(), notifier),
            scheduler: AutoScheduler::new(store.clone(), dispatcher, clock.clone(), config.scheduler),
            store,
            clock,
        }
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// The auto-scheduler, for signal sinks and the periodic tick
    pub fn scheduler(&self) -> &AutoScheduler<S, D, C> {
        &self.scheduler
    }
}

#[cfg(test)]
#[path = "../runtime_tests/mod.rs"]
mod tests;
