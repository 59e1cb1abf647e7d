// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared world setup for behavioral specs.

use std::sync::Arc;

use chrono::{NaiveTime, TimeZone, Utc, Weekday};
use patrol_adapters::{FakeDispatchAdapter, FakeNotifyAdapter};
use patrol_core::test_support::{definition, installation, robot};
use patrol_core::{
    AgentId, AutoScheduleFrequency, FakeClock, Robot, SequentialIdGen, TelemetryEvent,
};
use patrol_engine::{EngineError, Runtime, RuntimeConfig, RuntimeDeps, TelemetryRouter};
use patrol_storage::{MemoryStore, Store};

pub type SpecRuntime =
    Runtime<MemoryStore, FakeNotifyAdapter, FakeDispatchAdapter, FakeClock, SequentialIdGen>;

/// SITE-A with robot `robot-1` (agent R1) and `patrol-deck`, due Mondays at 08:00.
///
/// The clock reads Monday 2026-01-05 08:05 UTC.
pub struct World {
    pub runtime: Arc<SpecRuntime>,
    pub store: MemoryStore,
    pub notifier: FakeNotifyAdapter,
    pub dispatcher: FakeDispatchAdapter,
    pub clock: FakeClock,
}

impl World {
    pub async fn new() -> Self {
        let store = MemoryStore::default();
        store.insert_installation(installation("SITE-A")).await.unwrap();
        store.insert_robot(robot("robot-1", "R1", "SITE-A")).await.unwrap();
        let mut def = definition("patrol-deck", "SITE-A");
        def.auto_schedule = Some(AutoScheduleFrequency::new(
            vec![Weekday::Mon],
            vec![NaiveTime::from_hms_opt(8, 0, 0).unwrap()],
        ));
        store.insert_definition(def).await.unwrap();

        let notifier = FakeNotifyAdapter::new();
        let dispatcher = FakeDispatchAdapter::new();
        let clock = FakeClock::at(Utc.with_ymd_and_hms(2026, 1, 5, 8, 5, 0).unwrap());
        let runtime = Arc::new(Runtime::new(
            RuntimeDeps {
                store: store.clone(),
                notifier: notifier.clone(),
                dispatcher: dispatcher.clone(),
                id_gen: SequentialIdGen::new("robot-new"),
            },
            clock.clone(),
            RuntimeConfig::default(),
        ));
        Self {
            runtime,
            store,
            notifier,
            dispatcher,
            clock,
        }
    }

    pub async fn send(&self, event: TelemetryEvent) -> Result<(), EngineError> {
        self.runtime.handle_event(event).await.map(|_| ())
    }

    pub fn router(&self) -> TelemetryRouter {
        TelemetryRouter::spawn(Arc::clone(&self.runtime), Default::default())
    }

    pub async fn robot_by_agent(&self, agent: &str) -> Option<Robot> {
        self.store
            .robot_by_agent(&AgentId::new(agent))
            .await
            .unwrap()
            .found()
    }
}
