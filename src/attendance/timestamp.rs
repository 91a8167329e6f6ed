//! Interpretation of operator-supplied timestamps.
//!
//! Privileged callers may backdate check-ins, check-outs and manual breaks.
//! Their timestamps arrive either as RFC 3339 instants or as naive wall-clock
//! values, which are read in the server's local timezone.

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};

use crate::error::{EngineError, EngineResult};

/// Naive formats accepted after RFC 3339, tried in order.
const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

/// Parses an operator-supplied timestamp.
///
/// Accepts RFC 3339, `YYYY-MM-DD[T ]HH:MM[:SS]` in server-local time, or a
/// bare `HH:MM` meaning that time today (server-local, relative to `now`).
///
/// # Example
///
/// ```
/// use workforce_engine::attendance::parse_operator_time;
/// use chrono::{TimeZone, Utc};
///
/// let now = Utc::now();
/// let parsed = parse_operator_time("check_in_at", "2026-01-15T09:00:00Z", now).unwrap();
/// assert_eq!(parsed, Utc.with_ymd_and_hms(2026, 1, 15, 9, 0, 0).unwrap());
///
/// assert!(parse_operator_time("check_in_at", "yesterday", now).is_err());
/// ```
pub fn parse_operator_time(
    field: &str,
    value: &str,
    now: DateTime<Utc>,
) -> EngineResult<DateTime<Utc>> {
    let value = value.trim();
    let invalid = || EngineError::invalid_input(format!("invalid {field}"));

    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Ok(parsed.with_timezone(&Utc));
    }

    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return local_to_utc(naive).ok_or_else(invalid);
        }
    }

    if let Ok(time) = NaiveTime::parse_from_str(value, "%H:%M") {
        let today = now.with_timezone(&Local).date_naive();
        return local_to_utc(today.and_time(time)).ok_or_else(invalid);
    }

    Err(invalid())
}

/// The `[start, end)` instants of the server-local calendar day containing
/// `instant`.
pub fn local_day_bounds(instant: DateTime<Utc>) -> EngineResult<(DateTime<Utc>, DateTime<Utc>)> {
    let date = instant.with_timezone(&Local).date_naive();
    let next = date
        .succ_opt()
        .ok_or_else(|| EngineError::invalid_input("date out of range"))?;
    Ok((local_midnight(date)?, local_midnight(next)?))
}

fn local_midnight(date: NaiveDate) -> EngineResult<DateTime<Utc>> {
    local_to_utc(date.and_time(NaiveTime::MIN))
        .ok_or_else(|| EngineError::internal(format!("no local midnight on {date}")))
}

fn local_to_utc(naive: NaiveDateTime) -> Option<DateTime<Utc>> {
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|local| local.with_timezone(&Utc))
}
