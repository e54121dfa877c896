//! Property-based tests for the payroll engine.
//!
//! # How to run
//!
//! ```bash
//! cargo test --test properties
//! PROPTEST_CASES=5000 cargo test --test properties
//! ```
//!
//! Each property is named `prop_<function>_<invariant>`.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use proptest::prelude::*;
use rust_decimal::Decimal;
use serde_json::json;

use payroll_engine::calculation::{calculate_payroll, parse_assignment_range, resolve_hours};
use payroll_engine::config::{EngineSettings, PayPolicy};
use payroll_engine::models::{PayPeriod, PayrollInput, RawWorkRecord, RosterAssignment};

const WORKERS: [&str; 3] = ["A", "B", "C"];
const ROLES: [&str; 3] = ["dealer", "floor", "chip_runner"];

fn at(day: u32, hour: u32, minute: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 1, day)
        .unwrap()
        .and_time(NaiveTime::from_hms_opt(hour, minute, 0).unwrap())
}

fn clock() -> impl Strategy<Value = (u32, u32)> {
    (0u32..24, prop::sample::select(vec![0u32, 15, 30, 45]))
}

prop_compose! {
    fn raw_record()(
        id in 0usize..12,
        worker in 0usize..WORKERS.len(),
        role in 0usize..ROLES.len(),
        day in 1u32..=7,
        start in clock(),
        end in clock(),
    ) -> RawWorkRecord {
        RawWorkRecord(json!({
            "id": format!("r{}", id),
            "workerId": WORKERS[worker],
            "eventId": "event_1",
            "date": format!("2025-01-{:02}", day),
            "role": ROLES[role],
            "scheduledStartTime": format!("{:02}:{:02}", start.0, start.1),
            "scheduledEndTime": format!("{:02}:{:02}", end.0, end.1),
        }))
    }
}

prop_compose! {
    fn assignment()(
        worker in 0usize..WORKERS.len(),
        role in 0usize..ROLES.len(),
        day in 1u32..=7,
        range in prop_oneof![
            (clock(), clock()).prop_map(|(s, e)| format!("{:02}:{:02}-{:02}:{:02}", s.0, s.1, e.0, e.1)),
            Just("미정".to_string()),
            Just("TBD".to_string()),
        ],
    ) -> RosterAssignment {
        RosterAssignment {
            worker_id: WORKERS[worker].to_string(),
            worker_name: format!("Worker {}", WORKERS[worker]),
            role: ROLES[role].to_string(),
            date: NaiveDate::from_ymd_opt(2025, 1, day),
            time_range: Some(range),
            event_id: Some("event_1".to_string()),
        }
    }
}

fn input(records: Vec<RawWorkRecord>, roster: Vec<RosterAssignment>) -> PayrollInput {
    PayrollInput::new(
        records,
        roster,
        PayPolicy::default(),
        PayPeriod::from_iso("2025-01-01", "2025-01-31").unwrap(),
    )
}

// == Time Resolver =============================================================

proptest! {
    /// Same-date clock times always resolve to a span in [0, 24) hours.
    #[test]
    fn prop_resolve_hours_within_a_day(start in clock(), end in clock()) {
        let hours = resolve_hours(Some(at(1, start.0, start.1)), Some(at(1, end.0, end.1)));
        prop_assert!(hours >= Decimal::ZERO);
        prop_assert!(hours < Decimal::from(24));
    }

    /// Swapping start and end of a non-empty span gives the complement to 24h.
    #[test]
    fn prop_resolve_hours_complement(start in clock(), end in clock()) {
        prop_assume!(start != end);
        let forward = resolve_hours(Some(at(1, start.0, start.1)), Some(at(1, end.0, end.1)));
        let backward = resolve_hours(Some(at(1, end.0, end.1)), Some(at(1, start.0, start.1)));
        prop_assert_eq!(forward + backward, Decimal::from(24));
    }

    /// A parsed assignment range resolves to a positive span.
    #[test]
    fn prop_assignment_range_positive(start in clock(), end in clock()) {
        let range = format!("{}:{:02}~{}:{:02}", start.0, start.1, end.0, end.1);
        let date = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        match parse_assignment_range(&range, date, &EngineSettings::default()) {
            Some((s, e)) => prop_assert!(resolve_hours(Some(s), Some(e)) > Decimal::ZERO),
            None => prop_assert_eq!(start, end),
        }
    }
}

// == Pipeline ==================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Identical inputs give byte-identical lines and summary.
    #[test]
    fn prop_calculate_payroll_idempotent(
        records in prop::collection::vec(raw_record(), 0..16),
        roster in prop::collection::vec(assignment(), 0..6),
    ) {
        let input = input(records, roster);
        let settings = EngineSettings::default();
        let first = calculate_payroll(&input, &settings);
        let second = calculate_payroll(&input, &settings);
        prop_assert_eq!(
            serde_json::to_string(&first.lines).unwrap(),
            serde_json::to_string(&second.lines).unwrap()
        );
        prop_assert_eq!(
            serde_json::to_string(&first.summary).unwrap(),
            serde_json::to_string(&second.summary).unwrap()
        );
    }

    /// Lines are unique per (worker, role), pay nothing for zero hours, and
    /// the summary adds up.
    #[test]
    fn prop_calculate_payroll_lines_consistent(
        records in prop::collection::vec(raw_record(), 0..16),
        roster in prop::collection::vec(assignment(), 0..6),
    ) {
        let outcome = calculate_payroll(&input(records, roster), &EngineSettings::default());

        let mut keys: Vec<(&str, &str)> = outcome
            .lines
            .iter()
            .map(|l| (l.worker_id.as_str(), l.role.as_str()))
            .collect();
        let count = keys.len();
        keys.dedup();
        prop_assert_eq!(keys.len(), count);

        for line in &outcome.lines {
            prop_assert!(line.total_hours > Decimal::ZERO);
            prop_assert!(line.total_days >= 1);
            prop_assert_eq!(line.grand_total, line.base_pay + line.allowance_total);
        }

        let hours: Decimal = outcome.lines.iter().map(|l| l.total_hours).sum();
        let amount: Decimal = outcome.lines.iter().map(|l| l.grand_total).sum();
        prop_assert_eq!(outcome.summary.total_hours, hours);
        prop_assert_eq!(outcome.summary.total_amount, amount);
    }
}
