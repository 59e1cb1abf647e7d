// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon lifecycle management: startup, checkpoint, shutdown.

use std::fs::File;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use fs2::FileExt;
use patrol_adapters::{
    BusNotifyAdapter, ChannelDispatchAdapter, DispatchRequest, Notification, TracedDispatch,
    TracedNotify,
};
use patrol_core::{SystemClock, UuidIdGen};
use patrol_engine::{Runtime, RuntimeDeps, TelemetryRouter};
use patrol_storage::{FleetState, MemoryStore, Snapshot, SnapshotError};
use thiserror::Error;
use tokio::net::UnixListener;
use tokio::sync::{broadcast, mpsc};
use tracing::{info, warn};

use patrol_daemon::config::{Config, ConfigError};
use patrol_daemon::wire::Outbound;

/// Daemon runtime with concrete adapter types (wrapped with tracing)
pub type DaemonRuntime = Runtime<
    MemoryStore,
    TracedNotify<BusNotifyAdapter>,
    TracedDispatch<ChannelDispatchAdapter>,
    SystemClock,
    UuidIdGen,
>;

/// How long shutdown waits for queued telemetry to drain
const DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

/// Daemon state during operation.
///
/// The listener is returned separately from startup to be spawned as a Listener task.
pub struct DaemonState {
    pub config: Config,
    // NOTE(lifetime): Held to maintain exclusive file lock; released on drop
    #[allow(dead_code)]
    lock_file: File,
    pub store: MemoryStore,
    pub runtime: Arc<DaemonRuntime>,
    pub router: TelemetryRouter,
    /// Fan-out of notifications and dispatch instructions to subscribers
    pub outbound: broadcast::Sender<Outbound>,
    pub start_time: Instant,
}

/// Result of daemon startup - includes both the daemon state and the listener.
pub struct StartupResult {
    pub daemon: DaemonState,
    /// The Unix socket listener to spawn as a task
    pub listener: UnixListener,
}

/// Lifecycle errors
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Failed to acquire lock: daemon already running?")]
    LockFailed(#[source] std::io::Error),

    #[error("Failed to bind socket at {0}: {1}")]
    BindFailed(PathBuf, std::io::Error),

    #[error("Snapshot error: {0}")]
    Snapshot(#[from] SnapshotError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl DaemonState {
    /// Drain queued telemetry, save a final snapshot, remove runtime files.
    pub async fn shutdown(self) -> Result<(), LifecycleError> {
        info!("Shutting down daemon...");

        if tokio::time::timeout(DRAIN_TIMEOUT, self.router.shutdown())
            .await
            .is_err()
        {
            warn!("telemetry did not drain within {:?}", DRAIN_TIMEOUT);
        }

        match checkpoint(&self.store, &self.config) {
            Ok(size_bytes) => info!(size_bytes, "saved final shutdown snapshot"),
            Err(e) => warn!("Failed to save shutdown snapshot: {}", e),
        }

        if self.config.socket_path.exists() {
            if let Err(e) = std::fs::remove_file(&self.config.socket_path) {
                warn!("Failed to remove socket file: {}", e);
            }
        }
        if self.config.lock_path.exists() {
            if let Err(e) = std::fs::remove_file(&self.config.lock_path) {
                warn!("Failed to remove PID file: {}", e);
            }
        }

        // Lock file is released when self.lock_file is dropped
        info!(
            uptime_secs = self.start_time.elapsed().as_secs(),
            "Daemon shutdown complete"
        );
        Ok(())
    }
}

/// Write the current fleet state to the snapshot file.
pub fn checkpoint(store: &MemoryStore, config: &Config) -> Result<u64, SnapshotError> {
    Snapshot::new(store.state(), Utc::now()).save(&config.snapshot_path)
}

/// Start the daemon
pub async fn startup(config: &Config) -> Result<StartupResult, LifecycleError> {
    match startup_inner(config).await {
        Ok(result) => Ok(result),
        Err(e) => {
            // Don't clean up if we failed to acquire the lock:
            // those files belong to the already-running daemon.
            if !matches!(e, LifecycleError::LockFailed(_)) {
                cleanup_on_failure(config);
            }
            Err(e)
        }
    }
}

async fn startup_inner(config: &Config) -> Result<StartupResult, LifecycleError> {
    std::fs::create_dir_all(&config.state_dir)?;

    // Acquire lock file FIRST - prevents races. Truncate only once held.
    let lock_file = std::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(false)
        .open(&config.lock_path)?;
    lock_file
        .try_lock_exclusive()
        .map_err(LifecycleError::LockFailed)?;
    let mut lock_file = lock_file;
    lock_file.set_len(0)?;
    writeln!(lock_file, "{}", std::process::id())?;
    let lock_file = lock_file;

    let state = match Snapshot::load(&config.snapshot_path)? {
        Some(snapshot) => {
            info!(
                created_at = %snapshot.created_at,
                robots = snapshot.state.robots.len(),
                runs = snapshot.state.runs.len(),
                definitions = snapshot.state.definitions.len(),
                "Loaded snapshot"
            );
            snapshot.state
        }
        None => {
            info!("No snapshot found, starting with empty state");
            FleetState::default()
        }
    };
    let store = MemoryStore::new(state);

    let settings = &config.settings;
    let capacity = settings.channel_capacity.max(1);
    let bus = BusNotifyAdapter::new(capacity);
    let (dispatcher, dispatch_rx) = ChannelDispatchAdapter::channel(capacity);
    let (outbound, _) = broadcast::channel(capacity);
    spawn_outbound_forwarder(bus.subscribe(), dispatch_rx, outbound.clone());

    let runtime = Arc::new(Runtime::new(
        RuntimeDeps {
            store: store.clone(),
            notifier: TracedNotify::new(bus),
            dispatcher: TracedDispatch::new(dispatcher),
            id_gen: UuidIdGen,
        },
        SystemClock,
        settings.runtime_config(),
    ));
    let router = TelemetryRouter::spawn(Arc::clone(&runtime), settings.router_config());

    // Remove stale socket and bind (LAST - only after all validation passes)
    if config.socket_path.exists() {
        std::fs::remove_file(&config.socket_path)?;
    }
    let listener = UnixListener::bind(&config.socket_path)
        .map_err(|e| LifecycleError::BindFailed(config.socket_path.clone(), e))?;

    info!("Daemon started");

    Ok(StartupResult {
        daemon: DaemonState {
            config: config.clone(),
            lock_file,
            store,
            runtime,
            router,
            outbound,
            start_time: Instant::now(),
        },
        listener,
    })
}

/// Forward notifications and dispatch instructions to socket subscribers.
fn spawn_outbound_forwarder(
    mut notifications: broadcast::Receiver<Notification>,
    mut dispatches: mpsc::Receiver<DispatchRequest>,
    outbound: broadcast::Sender<Outbound>,
) {
    tokio::spawn(async move {
        loop {
            let message = tokio::select! {
                received = notifications.recv() => match received {
                    Ok(notification) => Outbound::Notification(notification),
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(skipped, "notification forwarder lagged");
                        continue;
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                },
                received = dispatches.recv() => match received {
                    Some(request) => Outbound::Dispatch(request),
                    None => break,
                },
            };
            if let Err(broadcast::error::SendError(Outbound::Dispatch(request))) =
                outbound.send(message)
            {
                warn!(
                    definition = %request.definition_id,
                    robot = %request.robot_id,
                    "no dispatch subscriber connected, instruction dropped"
                );
            }
        }
    });
}

/// Clean up resources on startup failure
fn cleanup_on_failure(config: &Config) {
    if config.socket_path.exists() {
        let _ = std::fs::remove_file(&config.socket_path);
    }
    if config.lock_path.exists() {
        let _ = std::fs::remove_file(&config.lock_path);
    }
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;
