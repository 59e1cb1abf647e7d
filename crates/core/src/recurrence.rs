// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Weekly recurrence rule for auto-scheduled missions.
//!
//! All instants are UTC. A rule produces one occurrence per listed time of
//! day on every listed weekday.

use chrono::{DateTime, Datelike, Days, NaiveTime, Utc, Weekday};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecurrenceError {
    #[error("auto-schedule frequency must include at least one day of the week")]
    NoDays,
    #[error("auto-schedule frequency must include at least one time of day")]
    NoTimes,
}

/// Days of the week and times of day at which a definition should run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutoScheduleFrequency {
    pub days_of_week: Vec<Weekday>,
    pub times_of_day: Vec<NaiveTime>,
}

impl AutoScheduleFrequency {
    pub fn new(days_of_week: Vec<Weekday>, times_of_day: Vec<NaiveTime>) -> Self {
        Self {
            days_of_week,
            times_of_day,
        }
    }

    pub fn validate(&self) -> Result<(), RecurrenceError> {
        if self.days_of_week.is_empty() {
            return Err(RecurrenceError::NoDays);
        }
        if self.times_of_day.is_empty() {
            return Err(RecurrenceError::NoTimes);
        }
        Ok(())
    }

    /// Whether some occurrence of this rule falls at `time` on its day.
    pub fn produces_time_of_day(&self, time: NaiveTime) -> bool {
        self.validate().is_ok() && self.times_of_day.contains(&time)
    }

    fn sorted_times(&self) -> Vec<NaiveTime> {
        let mut times = self.times_of_day.clone();
        times.sort();
        times.dedup();
        times
    }

    /// Occurrences strictly after `after`, in ascending order.
    ///
    /// Unbounded for a valid rule, empty for an invalid one.
    pub fn occurrences_after(
        &self,
        after: DateTime<Utc>,
    ) -> impl Iterator<Item = DateTime<Utc>> + '_ {
        let times = self.sorted_times();
        let active = self.validate().is_ok();
        let start = after.date_naive();
        (0u64..)
            .take_while(move |_| active)
            .map_while(move |offset| start.checked_add_days(Days::new(offset)))
            .filter(move |date| self.days_of_week.contains(&date.weekday()))
            .flat_map(move |date| {
                times
                    .clone()
                    .into_iter()
                    .map(move |time| date.and_time(time).and_utc())
            })
            .filter(move |at| *at > after)
    }

    /// The most recent occurrence at or before `at`, looking back one week.
    pub fn latest_at_or_before(&self, at: DateTime<Utc>) -> Option<DateTime<Utc>> {
        if self.validate().is_err() {
            return None;
        }
        let times = self.sorted_times();
        let today = at.date_naive();
        (0u64..=7)
            .filter_map(|offset| today.checked_sub_days(Days::new(offset)))
            .filter(|date| self.days_of_week.contains(&date.weekday()))
            .find_map(|date| {
                times
                    .iter()
                    .rev()
                    .map(|time| date.and_time(*time).and_utc())
                    .find(|occurrence| *occurrence <= at)
            })
    }
}

#[cfg(test)]
#[path = "recurrence_tests.rs"]
mod tests;
