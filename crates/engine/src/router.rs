// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Telemetry event routing.
//!
//! Each telemetry kind has its own bounded queue. Every event is handled
//! in its own task; a shared semaphore caps how many run at once. A
//! failing or panicking handler is logged and affects no other event.
//! Scheduler signals produced by handlers are fed to the auto-scheduler
//! on a separate lane.

use crate::runtime::Runtime;
use patrol_adapters::{DispatchAdapter, NotifyAdapter};
use patrol_core::{Clock, IdGen, SchedulerSignal, TelemetryEvent, TelemetryKind};
use patrol_storage::Store;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{mpsc, Semaphore};
use tokio::task::{JoinHandle, JoinSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouterConfig {
    /// Maximum events handled concurrently across all kinds
    pub workers: usize,
    /// Queue depth per telemetry kind
    pub channel_capacity: usize,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            workers: 16,
            channel_capacity: 256,
        }
    }
}

#[derive(Debug, Error)]
pub enum RouterError {
    #[error("telemetry router is shut down")]
    Closed,
}

/// Cloneable sender side of the router
#[derive(Clone)]
pub struct RouterHandle {
    lanes: Arc<HashMap<TelemetryKind, mpsc::Sender<TelemetryEvent>>>,
}

impl RouterHandle {
    /// Queue an event on its kind's lane, waiting while the lane is full.
    ///
    /// Events with an unrecognized type are logged and dropped.
    pub async fn route(&self, event: TelemetryEvent) -> Result<(), RouterError> {
        let Some(kind) = event.kind() else {
            tracing::debug!("dropping telemetry event of unknown type");
            return Ok(());
        };
        let lane = self.lanes.get(&kind).ok_or(RouterError::Closed)?;
        lane.send(event).await.map_err(|_| RouterError::Closed)
    }
}

pub struct TelemetryRouter {
    handle: RouterHandle,
    workers: Vec<JoinHandle<()>>,
    signals: JoinHandle<()>,
}

impl TelemetryRouter {
    /// Start one lane per telemetry kind plus the signal lane.
    pub fn spawn<S, N, D, C, G>(runtime: Arc<Runtime<S, N, D, C, G>>, config: RouterConfig) -> Self
    where
        S: Store,
        N: NotifyAdapter,
        D: DispatchAdapter,
        C: Clock,
        G: IdGen,
    {
        let permits = Arc::new(Semaphore::new(config.workers.max(1)));
        let capacity = config.channel_capacity.max(1);
        let (signal_tx, signal_rx) = mpsc::channel(capacity);

        let mut lanes = HashMap::new();
        let mut workers = Vec::new();
        for kind in TelemetryKind::ALL {
            let (tx, rx) = mpsc::channel(capacity);
            lanes.insert(kind, tx);
            workers.push(tokio::spawn(run_lane(
                kind,
                rx,
                Arc::clone(&runtime),
                Arc::clone(&permits),
                signal_tx.clone(),
            )));
        }
        drop(signal_tx);

        let signals = tokio::spawn(run_signals(signal_rx, runtime));
        tracing::info!(
            workers = config.workers,
            capacity,
            "telemetry router started"
        );
        Self {
            handle: RouterHandle {
                lanes: Arc::new(lanes),
            },
            workers,
            signals,
        }
    }

    pub fn handle(&self) -> RouterHandle {
        self.handle.clone()
    }

    pub async fn route(&self, event: TelemetryEvent) -> Result<(), RouterError> {
        self.handle.route(event).await
    }

    /// Stop accepting events and wait until everything queued is handled,
    /// including the scheduler signals it produced.
    ///
    /// Lanes stay open while any [`RouterHandle`] is alive.
    pub async fn shutdown(self) {
        drop(self.handle);
        for worker in self.workers {
            if let Err(e) = worker.await {
                tracing::error!(error = %e, "telemetry lane failed");
            }
        }
        if let Err(e) = self.signals.await {
            tracing::error!(error = %e, "signal lane failed");
        }
        tracing::info!("telemetry router stopped");
    }
}

async fn run_lane<S, N, D, C, G>(
    kind: TelemetryKind,
    mut rx: mpsc::Receiver<TelemetryEvent>,
    runtime: Arc<Runtime<S, N, D, C, G>>,
    permits: Arc<Semaphore>,
    signal_tx: mpsc::Sender<SchedulerSignal>,
) where
    S: Store,
    N: NotifyAdapter,
    D: DispatchAdapter,
    C: Clock,
    G: IdGen,
{
    let mut in_flight = JoinSet::new();
    while let Some(event) = rx.recv().await {
        let Ok(permit) = Arc::clone(&permits).acquire_owned().await else {
            break;
        };
        let runtime = Arc::clone(&runtime);
        let signal_tx = signal_tx.clone();
        in_flight.spawn(async move {
            let _permit = permit;
            let summary = event.log_summary();
            let outcome = tokio::spawn(handle(runtime, event, signal_tx)).await;
            if let Err(e) = outcome {
                tracing::error!(event = %summary, error = %e, "telemetry handler panicked");
            }
        });
        while in_flight.try_join_next().is_some() {}
    }
    while in_flight.join_next().await.is_some() {}
    tracing::debug!(kind = %kind, "telemetry lane drained");
}

async fn handle<S, N, D, C, G>(
    runtime: Arc<Runtime<S, N, D, C, G>>,
    event: TelemetryEvent,
    signal_tx: mpsc::Sender<SchedulerSignal>,
) where
    S: Store,
    N: NotifyAdapter,
    D: DispatchAdapter,
    C: Clock,
    G: IdGen,
{
    let summary = event.log_summary();
    tracing::trace!(event = %summary, "handling telemetry");
    match runtime.handle_event(event).await {
        Ok(signals) => {
            for signal in signals {
                if signal_tx.send(signal).await.is_err() {
                    tracing::warn!(event = %summary, "signal lane closed, dropping signal");
                }
            }
        }
        Err(e) if e.is_not_found() => {
            tracing::warn!(event = %summary, error = %e, "dropping telemetry event");
        }
        Err(e) => {
            tracing::error!(event = %summary, error = %e, "telemetry handler failed");
        }
    }
}

async fn run_signals<S, N, D, C, G>(
    mut rx: mpsc::Receiver<SchedulerSignal>,
    runtime: Arc<Runtime<S, N, D, C, G>>,
) where
    S: Store,
    N: NotifyAdapter,
    D: DispatchAdapter,
    C: Clock,
    G: IdGen,
{
    let mut in_flight = JoinSet::new();
    while let Some(signal) = rx.recv().await {
        let scheduler = runtime.scheduler().clone();
        in_flight.spawn(async move {
            match scheduler.on_signal(&signal).await {
                Ok(_) => {}
                Err(e) if e.is_not_found() => {
                    tracing::warn!(signal = signal.name(), robot = %signal.robot_id(), error = %e, "scheduler signal dropped");
                }
                Err(e) => {
                    tracing::error!(signal = signal.name(), robot = %signal.robot_id(), error = %e, "scheduler evaluation failed");
                }
            }
        });
        while in_flight.try_join_next().is_some() {}
    }
    while in_flight.join_next().await.is_some() {}
}

#[cfg(test)]
#[path = "router_tests.rs"]
mod tests;
