// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Patrol Daemon (patrold)
//!
//! Background process that ingests robot telemetry and dispatches
//! scheduled missions.
//!
//! Architecture:
//! - Listener Task: accepts socket connections, routes telemetry lines
//! - Router: per-kind lanes feeding a bounded worker pool
//! - Main loop: scheduler ticks, checkpoints, signal handling

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod lifecycle;
mod listener;

use std::time::Duration;

use patrol_daemon::config::{Config, ConfigError};
use patrol_storage::MemoryStore;
use tokio::signal::unix::{signal, SignalKind};
use tracing::{error, info};

use crate::lifecycle::{LifecycleError, StartupResult};
use crate::listener::Listener;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Handle info flags before any config/lock acquisition
    if let Some(arg) = std::env::args().nth(1) {
        match arg.as_str() {
            "--version" | "-V" | "-v" => {
                println!("patrold {}", env!("CARGO_PKG_VERSION"));
                return Ok(());
            }
            "--help" | "-h" | "help" => {
                println!("patrold {}", env!("CARGO_PKG_VERSION"));
                println!("Patrol Daemon - fleet telemetry reconciliation and mission auto-scheduling");
                println!();
                println!("USAGE:");
                println!("    patrold");
                println!();
                println!("Robot agents connect to the Unix socket in the state directory and");
                println!("write one JSON telemetry event per line. A client that sends");
                println!("{{\"type\":\"subscribe\"}} receives notifications and dispatch instructions.");
                println!();
                println!("ENVIRONMENT:");
                println!("    PATROL_STATE_DIR   State directory (default: $XDG_STATE_HOME/patrol)");
                println!("    PATROL_CONFIG      Settings file (default: <state dir>/patrol.toml)");
                println!("    RUST_LOG           Log filter (default: info)");
                println!();
                println!("OPTIONS:");
                println!("    -h, --help       Print help information");
                println!("    -v, --version    Print version information");
                return Ok(());
            }
            _ => {
                eprintln!("error: unexpected argument '{arg}'");
                eprintln!("Usage: patrold [--help | --version]");
                std::process::exit(1);
            }
        }
    }

    let config = Config::load()?;

    // Write startup marker to log (before tracing setup, so it is never buffered)
    write_startup_marker(&config)?;

    let log_guard = setup_logging(&config)?;

    info!("Starting patrol daemon");

    let StartupResult {
        daemon,
        listener: unix_listener,
    } = match lifecycle::startup(&config).await {
        Ok(r) => r,
        Err(LifecycleError::LockFailed(_)) => {
            let pid = std::fs::read_to_string(&config.lock_path)
                .unwrap_or_default()
                .trim()
                .to_string();
            eprintln!("patrold is already running");
            if !pid.is_empty() {
                eprintln!("  pid: {pid}");
            }
            std::process::exit(1);
        }
        Err(e) => {
            // Write error synchronously (tracing is non-blocking and may not flush in time)
            write_startup_error(&config, &e);
            error!("Failed to start daemon: {}", e);
            drop(log_guard);
            return Err(e.into());
        }
    };

    let listener = Listener::new(
        unix_listener,
        daemon.router.handle(),
        daemon.outbound.clone(),
    );
    let listener_task = tokio::spawn(listener.run());

    spawn_checkpoint(
        daemon.store.clone(),
        daemon.config.clone(),
        daemon.config.settings.checkpoint_interval(),
    );

    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;

    info!(
        "Daemon ready, listening on {}",
        config.socket_path.display()
    );

    // Signal ready for a supervising parent process
    println!("READY");

    // NOTE: Must be created outside the loop - tokio::select! re-evaluates
    // branches on each iteration, so a sleep() inside would reset on every
    // wakeup.
    let mut tick = tokio::time::interval(config.settings.tick_interval());

    loop {
        tokio::select! {
            _ = sigterm.recv() => {
                info!("Received SIGTERM, shutting down...");
                break;
            }

            _ = sigint.recv() => {
                info!("Received SIGINT, shutting down...");
                break;
            }

            _ = tick.tick() => {
                match daemon.runtime.scheduler().tick().await {
                    Ok(dispatched) if !dispatched.is_empty() => {
                        info!(count = dispatched.len(), "scheduler tick dispatched missions");
                    }
                    Ok(_) => {}
                    Err(e) => error!("Scheduler tick failed: {}", e),
                }
            }
        }
    }

    // Stop accepting new connections before draining the router
    listener_task.abort();
    daemon.shutdown().await?;
    info!("Daemon stopped");
    Ok(())
}

/// Spawn a task that periodically saves snapshots.
fn spawn_checkpoint(store: MemoryStore, config: Config, every: Duration) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        // First tick completes immediately
        interval.tick().await;

        loop {
            interval.tick().await;
            match lifecycle::checkpoint(&store, &config) {
                Ok(size_bytes) => tracing::debug!(size_bytes, "saved checkpoint snapshot"),
                Err(e) => tracing::warn!(error = %e, "failed to save checkpoint snapshot"),
            }
        }
    });
}

/// Startup marker prefix written to log before anything else.
/// Full format: "--- patrold: starting (pid: 12345) ---"
pub const STARTUP_MARKER_PREFIX: &str = "--- patrold: starting (pid: ";

/// Write startup marker to log file (appends to existing log)
fn write_startup_marker(config: &Config) -> Result<(), LifecycleError> {
    use std::io::Write;

    if let Some(parent) = config.log_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.log_path)?;
    writeln!(file, "{}{}) ---", STARTUP_MARKER_PREFIX, std::process::id())?;

    Ok(())
}

/// Write startup error synchronously to log file.
fn write_startup_error(config: &Config, error: &LifecycleError) {
    use std::io::Write;

    let Ok(mut file) = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.log_path)
    else {
        return;
    };
    let _ = writeln!(file, "ERROR Failed to start daemon: {}", error);
}

fn setup_logging(
    config: &Config,
) -> Result<tracing_appender::non_blocking::WorkerGuard, LifecycleError> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    if let Some(parent) = config.log_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let file_appender = tracing_appender::rolling::never(
        config
            .log_path
            .parent()
            .ok_or(LifecycleError::Config(ConfigError::NoStateDir))?,
        config
            .log_path
            .file_name()
            .ok_or(LifecycleError::Config(ConfigError::NoStateDir))?,
    );
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(non_blocking))
        .init();

    Ok(guard)
}

#[cfg(test)]
#[path = "main_tests.rs"]
mod tests;
