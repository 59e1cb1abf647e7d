// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use chrono::{TimeZone, Weekday};

fn daily_at_eight() -> MissionDefinition {
    let mut def = MissionDefinition::new("def-1", "Deck sweep", "SITE-A");
    def.auto_schedule = Some(AutoScheduleFrequency::new(
        vec![
            Weekday::Mon,
            Weekday::Tue,
            Weekday::Wed,
            Weekday::Thu,
            Weekday::Fri,
            Weekday::Sat,
            Weekday::Sun,
        ],
        vec![NaiveTime::from_hms_opt(8, 0, 0).unwrap()],
    ));
    def
}

#[test]
fn next_run_without_rule_is_never() {
    let def = MissionDefinition::new("def-1", "Ad hoc", "SITE-A");
    assert_eq!(def.next_run(Utc::now()), None);
}

#[test]
fn next_run_skips_registered_exception() {
    let mut def = daily_at_eight();
    let now = Utc.with_ymd_and_hms(2026, 1, 5, 9, 0, 0).unwrap();
    let tomorrow = Utc.with_ymd_and_hms(2026, 1, 6, 8, 0, 0).unwrap();
    assert_eq!(def.next_run(now), Some(tomorrow));

    def.skip_exceptions.push(SkipException::at(tomorrow));
    assert_eq!(
        def.next_run(now),
        Some(Utc.with_ymd_and_hms(2026, 1, 7, 8, 0, 0).unwrap())
    );
}

#[test]
fn skip_matches_exact_date_and_time() {
    let instant = Utc.with_ymd_and_hms(2026, 1, 6, 8, 0, 0).unwrap();
    let skip = SkipException::at(instant);
    assert!(skip.matches(instant));
    assert!(!skip.matches(instant + chrono::Duration::minutes(1)));
    assert!(!skip.matches(instant + chrono::Duration::days(7)));
}

proptest::proptest! {
    #[test]
    fn next_run_is_never_skipped(skipped_days in proptest::collection::vec(0i64..20, 0..15)) {
        let mut def = daily_at_eight();
        let base = Utc.with_ymd_and_hms(2026, 1, 5, 8, 0, 0).unwrap();
        for d in &skipped_days {
            def.skip_exceptions.push(SkipException::at(base + chrono::Duration::days(*d)));
        }
        let now = base - chrono::Duration::hours(1);
        let next = def.next_run(now).unwrap();
        proptest::prop_assert!(next > now);
        proptest::prop_assert!(!def.is_skipped(next));
    }
}
