// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Mission definitions: reusable mission templates with optional recurrence

use crate::installation::AreaId;
use crate::mission::MissionRunId;
use crate::recurrence::AutoScheduleFrequency;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

crate::define_id! {
    /// Identifier of a mission definition.
    pub struct MissionDefinitionId;
}

/// Suppresses the single occurrence at `date` + `time_of_day` (UTC)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SkipException {
    pub date: NaiveDate,
    pub time_of_day: NaiveTime,
}

impl SkipException {
    pub fn at(instant: DateTime<Utc>) -> Self {
        Self {
            date: instant.date_naive(),
            time_of_day: instant.time(),
        }
    }

    pub fn matches(&self, instant: DateTime<Utc>) -> bool {
        self.date == instant.date_naive() && self.time_of_day == instant.time()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissionDefinition {
    pub id: MissionDefinitionId,
    pub name: String,
    #[serde(default)]
    pub comment: Option<String>,
    pub installation_code: String,
    #[serde(default)]
    pub area: Option<AreaId>,
    /// Desired interval between inspections, informational only.
    #[serde(default)]
    pub inspection_frequency: Option<std::time::Duration>,
    #[serde(default)]
    pub auto_schedule: Option<AutoScheduleFrequency>,
    #[serde(default)]
    pub skip_exceptions: Vec<SkipException>,
    #[serde(default)]
    pub last_run: Option<MissionRunId>,
    /// Scheduled instant of the most recently dispatched occurrence.
    #[serde(default)]
    pub last_dispatched: Option<DateTime<Utc>>,
    #[serde(default)]
    pub deprecated: bool,
}

impl MissionDefinition {
    pub fn new(
        id: impl Into<MissionDefinitionId>,
        name: impl Into<String>,
        installation_code: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            comment: None,
            installation_code: installation_code.into(),
            area: None,
            inspection_frequency: None,
            auto_schedule: None,
            skip_exceptions: Vec::new(),
            last_run: None,
            last_dispatched: None,
            deprecated: false,
        }
    }

    pub fn is_skipped(&self, occurrence: DateTime<Utc>) -> bool {
        self.skip_exceptions.iter().any(|s| s.matches(occurrence))
    }

    /// Next occurrence strictly after `now` that is not skipped.
    ///
    /// `None` when the definition has no (valid) recurrence rule.
    pub fn next_run(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let rule = self.auto_schedule.as_ref()?;
        rule.occurrences_after(now)
            .find(|occurrence| !self.is_skipped(*occurrence))
    }
}

#[cfg(test)]
#[path = "definition_tests.rs"]
mod tests;
