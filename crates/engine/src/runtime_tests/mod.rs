// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Runtime tests

mod mission;
mod robot;
mod scalars;

use super::*;
use crate::{EngineError, RuntimeConfig, RuntimeDeps};
use patrol_adapters::{FakeDispatchAdapter, FakeNotifyAdapter};
use patrol_core::test_support::{installation, mission_run, robot};
use patrol_core::{FakeClock, RobotId, SchedulerSignal, SequentialIdGen, TelemetryEvent};
use patrol_storage::MemoryStore;

type TestRuntime =
    Runtime<MemoryStore, FakeNotifyAdapter, FakeDispatchAdapter, FakeClock, SequentialIdGen>;

/// Test context holding the runtime and its fakes
struct TestContext {
    runtime: TestRuntime,
    store: MemoryStore,
    notifier: FakeNotifyAdapter,
    dispatcher: FakeDispatchAdapter,
    clock: FakeClock,
}

impl TestContext {
    async fn handle(&self, event: TelemetryEvent) -> Result<Vec<SchedulerSignal>, EngineError> {
        self.runtime.handle_event(event).await
    }

    async fn robot(&self, id: &str) -> patrol_core::Robot {
        self.store
            .robot(&RobotId::new(id))
            .await
            .unwrap()
            .found()
            .unwrap()
    }
}

/// SITE-A with robot `robot-1` (agent R1) and a pending run `run-1` (mission M1)
async fn setup() -> TestContext {
    let store = MemoryStore::default();
    store.insert_installation(installation("SITE-A")).await.unwrap();
    store.insert_installation(installation("SITE-B")).await.unwrap();
    store.insert_robot(robot("robot-1", "R1", "SITE-A")).await.unwrap();
    store
        .insert_run(mission_run("run-1", "M1", "robot-1"))
        .await
        .unwrap();

    let notifier = FakeNotifyAdapter::new();
    let dispatcher = FakeDispatchAdapter::new();
    let clock = FakeClock::new();
    let runtime = Runtime::new(
        RuntimeDeps {
            store: store.clone(),
            notifier: notifier.clone(),
            dispatcher: dispatcher.clone(),
            id_gen: SequentialIdGen::new("new-robot"),
        },
        clock.clone(),
        RuntimeConfig::default(),
    );
    TestContext {
        runtime,
        store,
        notifier,
        dispatcher,
        clock,
    }
}

#[tokio::test]
async fn unknown_event_is_a_no_op() {
    let ctx = setup().await;
    let writes = ctx.store.write_count();
    let signals = ctx.handle(TelemetryEvent::Unknown).await.unwrap();
    assert!(signals.is_empty());
    assert_eq!(ctx.store.write_count(), writes);
    assert!(ctx.notifier.calls().is_empty());
}

#[tokio::test]
async fn scheduler_shares_the_runtime_store_and_clock() {
    use chrono::{NaiveTime, Weekday};
    use patrol_core::test_support::definition;
    use patrol_core::AutoScheduleFrequency;

    let ctx = setup().await;
    let eight = NaiveTime::from_hms_opt(8, 0, 0).unwrap();
    let mut def = definition("def-1", "SITE-A");
    def.auto_schedule = Some(AutoScheduleFrequency::new(vec![Weekday::Mon], vec![eight]));
    ctx.store.insert_definition(def).await.unwrap();

    // FakeClock starts at Monday 00:00
    ctx.clock.advance(chrono::Duration::minutes(8 * 60 + 5));
    let signal = SchedulerSignal::RobotAvailable {
        robot_id: RobotId::new("robot-1"),
    };
    let request = ctx.runtime.scheduler().on_signal(&signal).await.unwrap();
    assert!(request.is_some());
    assert_eq!(ctx.dispatcher.calls().len(), 1);
}
