use chrono::{DateTime, NaiveDateTime, Utc};
use log::warn;

/// Fixed-length units, largest first. A month is always 30 days and a year 365.
const UNITS: [(i64, &str); 5] = [
    (31_536_000, "year"),
    (2_592_000, "month"),
    (86_400, "day"),
    (3_600, "hour"),
    (60, "minute"),
];

/// Formats the time between `then` and `now` as "3 hours ago".
///
/// Negative spans (clock skew, future timestamps) are not special-cased and
/// end up in the seconds form.
pub fn time_ago(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let span = now - then;
    let elapsed = match span.num_microseconds() {
        Some(micros) => micros.div_euclid(1_000_000),
        None => span.num_seconds(),
    };
    for (length, unit) in UNITS {
        let count = elapsed / length;
        if count >= 1 {
            return plural(count, unit);
        }
    }
    // Under a minute the wording never goes singular.
    format!("{} seconds ago", elapsed)
}

fn plural(count: i64, unit: &str) -> String {
    if count == 1 {
        format!("1 {} ago", unit)
    } else {
        format!("{} {}s ago", count, unit)
    }
}

/// Parses a BuddyPress activity date.
///
/// The service sends server timestamps without a zone marker; they are read as UTC.
pub fn parse_activity_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    match DateTime::parse_from_rfc3339(raw) {
        Ok(zoned) => {
            warn!(
                "activity date {:?} carries a zone offset, the service no longer sends naive UTC timestamps",
                raw
            );
            Some(zoned.with_timezone(&Utc))
        }
        Err(err) => {
            warn!("ignoring unparseable activity date {:?}: {}", raw, err);
            None
        }
    }
}
