// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Installations (sites) and the inspection areas within them

use serde::{Deserialize, Serialize};
use std::fmt;

crate::define_id! {
    /// Identifier of an inspection area within an installation.
    pub struct AreaId;
}

/// A site robots operate at.
///
/// Installations are compared by `code`; `name` is the human label agents
/// report in their robot-info telemetry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Installation {
    pub code: String,
    pub name: String,
}

impl Installation {
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
        }
    }

    /// Agents identify installations loosely: by name or by code, any case.
    pub fn matches_name(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name) || self.code.eq_ignore_ascii_case(name)
    }
}

impl fmt::Display for Installation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.code)
    }
}
