// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon configuration: file layout under the state directory plus
//! tunables read from an optional TOML file.

use std::path::{Path, PathBuf};
use std::time::Duration;

use patrol_engine::{RetryPolicy, RouterConfig, RuntimeConfig, SchedulerConfig};
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Could not determine state directory")]
    NoStateDir,

    #[error("Failed to read {0}: {1}")]
    Read(PathBuf, std::io::Error),

    #[error("Invalid settings in {0}: {1}")]
    Parse(PathBuf, toml::de::Error),
}

/// Tunables; every field has a default so the file is optional.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub workers: usize,
    pub channel_capacity: usize,
    pub checkpoint_secs: u64,
    pub scheduler: SchedulerSettings,
    pub completion: CompletionSettings,
    pub duration: DurationSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SchedulerSettings {
    pub tick_secs: u64,
    pub due_window_mins: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CompletionSettings {
    pub retry_attempts: u32,
    pub retry_backoff_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DurationSettings {
    pub sample_runs: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            workers: 16,
            channel_capacity: 256,
            checkpoint_secs: 60,
            scheduler: SchedulerSettings::default(),
            completion: CompletionSettings::default(),
            duration: DurationSettings::default(),
        }
    }
}

impl Default for SchedulerSettings {
    fn default() -> Self {
        Self {
            tick_secs: 30,
            due_window_mins: 60,
        }
    }
}

impl Default for CompletionSettings {
    fn default() -> Self {
        Self {
            retry_attempts: 0,
            retry_backoff_ms: 200,
        }
    }
}

impl Default for DurationSettings {
    fn default() -> Self {
        Self { sample_runs: 50 }
    }
}

impl Settings {
    pub fn from_toml(path: &Path, text: &str) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|e| ConfigError::Parse(path.to_path_buf(), e))
    }

    /// Read `path`; a missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(text) => Self::from_toml(path, &text),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(ConfigError::Read(path.to_path_buf(), e)),
        }
    }

    pub fn runtime_config(&self) -> RuntimeConfig {
        RuntimeConfig {
            completion: RetryPolicy {
                attempts: self.completion.retry_attempts,
                backoff: Duration::from_millis(self.completion.retry_backoff_ms),
            },
            duration_sample_runs: self.duration.sample_runs,
            scheduler: SchedulerConfig {
                due_window: Duration::from_secs(self.scheduler.due_window_mins * 60),
            },
        }
    }

    pub fn router_config(&self) -> RouterConfig {
        RouterConfig {
            workers: self.workers,
            channel_capacity: self.channel_capacity,
        }
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs(self.scheduler.tick_secs.max(1))
    }

    pub fn checkpoint_interval(&self) -> Duration {
        Duration::from_secs(self.checkpoint_secs.max(1))
    }
}

/// Daemon configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Root state directory (e.g. ~/.local/state/patrol)
    pub state_dir: PathBuf,
    /// Path to the telemetry Unix socket
    pub socket_path: PathBuf,
    /// Path to lock/PID file
    pub lock_path: PathBuf,
    /// Path to daemon log file
    pub log_path: PathBuf,
    /// Path to the fleet snapshot
    pub snapshot_path: PathBuf,
    pub settings: Settings,
}

impl Config {
    /// Resolve the state directory and read settings from `$PATROL_CONFIG`
    /// or `<state_dir>/patrol.toml`.
    pub fn load() -> Result<Self, ConfigError> {
        let state_dir = crate::env::state_dir()?;
        let settings_path =
            crate::env::config_path().unwrap_or_else(|| state_dir.join("patrol.toml"));
        let settings = Settings::load(&settings_path)?;
        Ok(Self::for_state_dir(state_dir, settings))
    }

    pub fn for_state_dir(state_dir: PathBuf, settings: Settings) -> Self {
        Self {
            socket_path: state_dir.join("daemon.sock"),
            lock_path: state_dir.join("daemon.pid"),
            log_path: state_dir.join("daemon.log"),
            snapshot_path: state_dir.join("snapshot.json.zst"),
            state_dir,
            settings,
        }
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
