//! Time resolution functionality.
//!
//! This module turns the many shapes a time can arrive in into canonical
//! local instants, parses roster time ranges, and computes worked hours,
//! including shifts that cross midnight.

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use serde_json::Value;

use crate::config::EngineSettings;

use super::round_half_away;

/// Naive date-time layouts accepted for zone-less timestamps.
const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Computes the hours between two instants.
///
/// Returns zero when either instant is absent. When both instants fall on the
/// same calendar day and the end's time of day is earlier than the start's,
/// the shift is taken to cross midnight and 24 hours are added to the end.
/// Instants on different days use the raw difference. The result is rounded
/// to 2 decimal places, always carries a scale of 2 and is never negative.
///
/// # Arguments
///
/// * `start` - The start instant
/// * `end` - The end instant
///
/// # Examples
///
/// ```
/// use payroll_engine::calculation::resolve_hours;
/// use chrono::NaiveDateTime;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// let start = NaiveDateTime::parse_from_str("2025-01-01 22:00", "%Y-%m-%d %H:%M").unwrap();
/// let end = NaiveDateTime::parse_from_str("2025-01-01 02:00", "%Y-%m-%d %H:%M").unwrap();
///
/// assert_eq!(resolve_hours(Some(start), Some(end)), Decimal::from_str("4.00").unwrap());
/// assert_eq!(resolve_hours(Some(start), None), Decimal::ZERO);
/// ```
pub fn resolve_hours(start: Option<NaiveDateTime>, end: Option<NaiveDateTime>) -> Decimal {
    let (Some(start), Some(end)) = (start, end) else {
        return Decimal::ZERO;
    };

    let end = if end.date() == start.date() && end.time() < start.time() {
        end + Duration::hours(24)
    } else {
        end
    };

    let seconds = Decimal::from((end - start).num_seconds());
    let mut hours = round_half_away(seconds / Decimal::from(3600), 2).max(Decimal::ZERO);
    hours.rescale(2);
    hours
}

/// Parses a roster assignment time range such as `"10:00-18:00"`.
///
/// Accepts `-` or `~` as the separator, single-digit hours and `24:00` as
/// midnight. Both instants are anchored to `date`; a range whose end is
/// earlier than its start is a midnight-crossing shift and is resolved by
/// [`resolve_hours`].
///
/// Returns `None` for an undecided sentinel, a single time, a zero-length
/// range or anything malformed. `None` means "insufficient data", never
/// zero hours.
///
/// # Examples
///
/// ```
/// use payroll_engine::calculation::parse_assignment_range;
/// use payroll_engine::config::EngineSettings;
/// use chrono::NaiveDate;
///
/// let date = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
/// let settings = EngineSettings::default();
///
/// let (start, end) = parse_assignment_range("22:00~02:00", date, &settings).unwrap();
/// assert_eq!(start.to_string(), "2025-01-01 22:00:00");
/// assert_eq!(end.to_string(), "2025-01-01 02:00:00");
///
/// assert!(parse_assignment_range("undecided", date, &settings).is_none());
/// assert!(parse_assignment_range("10:00", date, &settings).is_none());
/// ```
pub fn parse_assignment_range(
    range: &str,
    date: NaiveDate,
    settings: &EngineSettings,
) -> Option<(NaiveDateTime, NaiveDateTime)> {
    let range = range.trim();
    if range.is_empty() || settings.is_undecided(range) {
        return None;
    }

    let mut parts = range.split(['-', '~']);
    let start = parse_clock(parts.next()?)?;
    let end = parse_clock(parts.next()?)?;
    if parts.next().is_some() || start == end {
        return None;
    }

    Some((date.and_time(start), date.and_time(end)))
}

/// Converts a raw time value into a local instant.
///
/// Supported shapes:
/// - RFC 3339 strings, converted to `offset`
/// - naive `YYYY-MM-DDTHH:MM[:SS]` or `YYYY-MM-DD HH:MM[:SS]` strings
/// - bare `HH:MM` strings, anchored to `anchor` (ignored without an anchor)
/// - numbers, read as epoch milliseconds
/// - timestamp objects `{seconds, nanoseconds}` or `{_seconds, _nanoseconds}`
///
/// # Examples
///
/// ```
/// use payroll_engine::calculation::parse_instant;
/// use chrono::{FixedOffset, NaiveDate};
/// use serde_json::json;
///
/// let kst = FixedOffset::east_opt(9 * 3600).unwrap();
/// let date = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
///
/// let instant = parse_instant(&json!("2025-01-01T01:00:00Z"), None, kst).unwrap();
/// assert_eq!(instant.to_string(), "2025-01-01 10:00:00");
///
/// let instant = parse_instant(&json!("18:30"), Some(date), kst).unwrap();
/// assert_eq!(instant.to_string(), "2025-01-01 18:30:00");
///
/// let instant = parse_instant(&json!({"seconds": 1735693200, "nanoseconds": 0}), None, kst).unwrap();
/// assert_eq!(instant.to_string(), "2025-01-01 10:00:00");
/// ```
pub fn parse_instant(
    value: &Value,
    anchor: Option<NaiveDate>,
    offset: FixedOffset,
) -> Option<NaiveDateTime> {
    match value {
        Value::String(text) => parse_instant_text(text.trim(), anchor, offset),
        Value::Number(number) => {
            let millis = number
                .as_i64()
                .or_else(|| number.as_f64().map(|f| f.trunc() as i64))?;
            DateTime::from_timestamp_millis(millis).map(|utc| utc.with_timezone(&offset).naive_local())
        }
        Value::Object(fields) => {
            let seconds = fields
                .get("seconds")
                .or_else(|| fields.get("_seconds"))
                .and_then(Value::as_i64)?;
            let nanos = fields
                .get("nanoseconds")
                .or_else(|| fields.get("_nanoseconds"))
                .and_then(Value::as_u64)
                .unwrap_or(0);
            let nanos = u32::try_from(nanos).ok()?;
            DateTime::from_timestamp(seconds, nanos).map(|utc| utc.with_timezone(&offset).naive_local())
        }
        _ => None,
    }
}

/// Converts a raw date value into a calendar date.
///
/// Accepts a `YYYY-MM-DD` string or any instant shape [`parse_instant`]
/// understands.
///
/// # Examples
///
/// ```
/// use payroll_engine::calculation::parse_date;
/// use chrono::{FixedOffset, NaiveDate};
/// use serde_json::json;
///
/// let kst = FixedOffset::east_opt(9 * 3600).unwrap();
/// let expected = NaiveDate::from_ymd_opt(2025, 1, 2).unwrap();
///
/// assert_eq!(parse_date(&json!("2025-01-02"), kst), Some(expected));
/// // 16:00 UTC on the 1st is already the 2nd in KST
/// assert_eq!(parse_date(&json!("2025-01-01T16:00:00Z"), kst), Some(expected));
/// ```
pub fn parse_date(value: &Value, offset: FixedOffset) -> Option<NaiveDate> {
    if let Value::String(text) = value {
        if let Ok(date) = NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d") {
            return Some(date);
        }
    }
    parse_instant(value, None, offset).map(|instant| instant.date())
}

fn parse_instant_text(
    text: &str,
    anchor: Option<NaiveDate>,
    offset: FixedOffset,
) -> Option<NaiveDateTime> {
    if text.is_empty() {
        return None;
    }
    if let Ok(zoned) = DateTime::parse_from_rfc3339(text) {
        return Some(zoned.with_timezone(&offset).naive_local());
    }
    if let Some(naive) = NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
    {
        return Some(naive);
    }
    let time = parse_clock(text)?;
    anchor.map(|date| date.and_time(time))
}

/// Parses `H:MM` or `HH:MM`; `24:00` is midnight.
pub(crate) fn parse_clock(text: &str) -> Option<NaiveTime> {
    let (hour, minute) = text.trim().split_once(':')?;
    if hour.is_empty() || hour.len() > 2 || minute.len() != 2 {
        return None;
    }
    if !hour.bytes().chain(minute.bytes()).all(|b| b.is_ascii_digit()) {
        return None;
    }
    let hour: u32 = hour.parse().ok()?;
    let minute: u32 = minute.parse().ok()?;
    match (hour, minute) {
        (24, 0) => NaiveTime::from_hms_opt(0, 0, 0),
        _ => NaiveTime::from_hms_opt(hour, minute, 0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn make_datetime(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn kst() -> FixedOffset {
        FixedOffset::east_opt(9 * 3600).unwrap()
    }

    #[test]
    fn test_regular_shift_hours() {
        let hours = resolve_hours(
            Some(make_datetime("2025-01-01 10:00")),
            Some(make_datetime("2025-01-01 18:00")),
        );
        assert_eq!(hours, dec("8.00"));
    }

    #[test]
    fn test_whole_hours_keep_two_places() {
        let hours = resolve_hours(
            Some(make_datetime("2025-01-01 10:00")),
            Some(make_datetime("2025-01-01 18:00")),
        );
        assert_eq!(hours.to_string(), "8.00");
        assert_eq!(serde_json::to_value(hours).unwrap(), serde_json::json!("8.00"));

        let clamped = resolve_hours(
            Some(make_datetime("2025-01-02 10:00")),
            Some(make_datetime("2025-01-01 18:00")),
        );
        assert_eq!(clamped.to_string(), "0.00");
    }

    #[test]
    fn test_same_day_midnight_crossing_adds_a_day() {
        let hours = resolve_hours(
            Some(make_datetime("2025-01-01 22:00")),
            Some(make_datetime("2025-01-01 02:00")),
        );
        assert_eq!(hours, dec("4.00"));
    }

    #[test]
    fn test_next_day_end_uses_raw_difference() {
        let hours = resolve_hours(
            Some(make_datetime("2025-01-01 18:00")),
            Some(make_datetime("2025-01-02 02:00")),
        );
        assert_eq!(hours, dec("8.00"));
    }

    #[test]
    fn test_end_before_start_on_earlier_day_clamps_to_zero() {
        let hours = resolve_hours(
            Some(make_datetime("2025-01-02 10:00")),
            Some(make_datetime("2025-01-01 18:00")),
        );
        assert_eq!(hours, Decimal::ZERO);
    }

    #[test]
    fn test_partial_hours_round_to_two_places() {
        // 10:00 to 17:20 is 7.333... hours
        let hours = resolve_hours(
            Some(make_datetime("2025-01-01 10:00")),
            Some(make_datetime("2025-01-01 17:20")),
        );
        assert_eq!(hours, dec("7.33"));

        // 10:00 to 10:45 is exactly 0.75
        let hours = resolve_hours(
            Some(make_datetime("2025-01-01 10:00")),
            Some(make_datetime("2025-01-01 10:45")),
        );
        assert_eq!(hours, dec("0.75"));
    }

    #[test]
    fn test_missing_instant_is_zero() {
        assert_eq!(resolve_hours(None, Some(make_datetime("2025-01-01 10:00"))), Decimal::ZERO);
        assert_eq!(resolve_hours(None, None), Decimal::ZERO);
    }

    #[test]
    fn test_parse_range_variants() {
        let settings = EngineSettings::default();
        let day = date(2025, 1, 1);

        let (start, end) = parse_assignment_range("10:00-18:00", day, &settings).unwrap();
        assert_eq!(resolve_hours(Some(start), Some(end)), dec("8.00"));

        let (start, end) = parse_assignment_range(" 9:30 ~ 17:00 ", day, &settings).unwrap();
        assert_eq!(start, make_datetime("2025-01-01 09:30"));
        assert_eq!(resolve_hours(Some(start), Some(end)), dec("7.50"));

        let (start, end) = parse_assignment_range("18:00-24:00", day, &settings).unwrap();
        assert_eq!(resolve_hours(Some(start), Some(end)), dec("6.00"));
    }

    #[test]
    fn test_parse_range_rejects_ambiguous_input() {
        let settings = EngineSettings::default();
        let day = date(2025, 1, 1);

        for range in ["", "미정", "TBD", "10:00", "10:00-", "10-18", "10:00-18:00-20:00", "25:00-26:00", "10:00-10:00", "ab:cd-ef:gh"] {
            assert!(
                parse_assignment_range(range, day, &settings).is_none(),
                "expected None for {:?}",
                range
            );
        }
    }

    #[test]
    fn test_parse_instant_rfc3339_converts_offset() {
        let instant = parse_instant(&json!("2025-01-01T13:00:00+00:00"), None, kst()).unwrap();
        assert_eq!(instant, make_datetime("2025-01-01 22:00"));
    }

    #[test]
    fn test_parse_instant_naive_strings() {
        let expected = make_datetime("2025-01-01 10:00");
        for text in ["2025-01-01T10:00", "2025-01-01T10:00:00", "2025-01-01 10:00", "2025-01-01 10:00:00.000"] {
            assert_eq!(parse_instant(&json!(text), None, kst()), Some(expected), "{}", text);
        }
    }

    #[test]
    fn test_parse_instant_bare_time_needs_anchor() {
        assert_eq!(parse_instant(&json!("10:00"), None, kst()), None);
        assert_eq!(
            parse_instant(&json!("10:00"), Some(date(2025, 1, 1)), kst()),
            Some(make_datetime("2025-01-01 10:00"))
        );
    }

    #[test]
    fn test_parse_instant_epoch_millis() {
        // 2025-01-01T01:00:00Z
        let instant = parse_instant(&json!(1_735_693_200_000_i64), None, kst()).unwrap();
        assert_eq!(instant, make_datetime("2025-01-01 10:00"));
    }

    #[test]
    fn test_parse_instant_underscored_timestamp_object() {
        let value = json!({ "_seconds": 1_735_693_200_i64, "_nanoseconds": 500_000_000 });
        let instant = parse_instant(&value, None, kst()).unwrap();
        assert_eq!(instant.format("%H:%M:%S%.3f").to_string(), "10:00:00.500");
    }

    #[test]
    fn test_parse_instant_rejects_garbage() {
        assert_eq!(parse_instant(&json!(null), None, kst()), None);
        assert_eq!(parse_instant(&json!("yesterday"), Some(date(2025, 1, 1)), kst()), None);
        assert_eq!(parse_instant(&json!({ "minutes": 5 }), None, kst()), None);
        assert_eq!(parse_instant(&json!(true), None, kst()), None);
    }

    #[test]
    fn test_parse_date_plain_string() {
        assert_eq!(parse_date(&json!("2025-03-09"), kst()), Some(date(2025, 3, 9)));
        assert_eq!(parse_date(&json!("March 9"), kst()), None);
    }

    #[test]
    fn test_parse_clock_midnight() {
        assert_eq!(parse_clock("24:00"), NaiveTime::from_hms_opt(0, 0, 0));
        assert_eq!(parse_clock("24:30"), None);
        assert_eq!(parse_clock("7:05"), NaiveTime::from_hms_opt(7, 5, 0));
    }
}
