// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the daemon crate.

use std::path::PathBuf;

use crate::config::ConfigError;

/// Resolve state directory: PATROL_STATE_DIR > XDG_STATE_HOME/patrol > ~/.local/state/patrol
pub fn state_dir() -> Result<PathBuf, ConfigError> {
    if let Ok(dir) = std::env::var("PATROL_STATE_DIR") {
        return Ok(PathBuf::from(dir));
    }
    if let Ok(xdg) = std::env::var("XDG_STATE_HOME") {
        return Ok(PathBuf::from(xdg).join("patrol"));
    }
    let home = std::env::var("HOME").map_err(|_| ConfigError::NoStateDir)?;
    Ok(PathBuf::from(home).join(".local/state/patrol"))
}

/// Explicit settings file, if PATROL_CONFIG is set
pub fn config_path() -> Option<PathBuf> {
    std::env::var_os("PATROL_CONFIG").map(PathBuf::from)
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
