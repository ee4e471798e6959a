//! Timestamp parsing for appointment scheduling columns.
//!
//! Source exports mix ISO 8601 timestamps (`2016-04-29T18:38:08Z`), plain
//! dates and US-style `MM/DD/YYYY` values. Anything that does not parse is
//! treated as missing.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};

const MILLIS_PER_DAY: i64 = 86_400_000;

const DATETIME_FORMATS: [&str; 8] = [
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d-%b-%Y"];

/// Parse a timestamp, returning `None` when no known format matches.
///
/// Offsets are converted to UTC. Date-only values are taken at midnight.
///
/// # Examples
///
/// ```
/// use noshow_transform::parse_timestamp;
///
/// assert!(parse_timestamp("2016-04-29T18:38:08Z").is_some());
/// assert!(parse_timestamp("04/29/2016").is_some());
/// assert!(parse_timestamp("not a date").is_none());
/// ```
pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(parsed.naive_utc());
    }
    let naive = trimmed.trim_end_matches('Z');
    for format in DATETIME_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(naive, format) {
            return Some(parsed);
        }
    }
    for format in DATE_FORMATS {
        if let Ok(parsed) = NaiveDate::parse_from_str(naive, format) {
            return Some(parsed.and_time(NaiveTime::MIN));
        }
    }
    None
}

/// Whole days from `scheduled` to `appointment`, rounded toward negative infinity.
///
/// Negative when the appointment precedes the scheduling time; such rows are
/// passed through unchanged.
pub fn elapsed_days(scheduled: NaiveDateTime, appointment: NaiveDateTime) -> i64 {
    (appointment - scheduled)
        .num_milliseconds()
        .div_euclid(MILLIS_PER_DAY)
}

/// Milliseconds since the Unix epoch, the storage unit for parsed date columns.
pub fn to_epoch_millis(value: NaiveDateTime) -> i64 {
    value.and_utc().timestamp_millis()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(value: &str) -> NaiveDateTime {
        parse_timestamp(value).expect(value)
    }

    #[test]
    fn parses_common_formats() {
        let expected = NaiveDate::from_ymd_opt(2016, 4, 29)
            .unwrap()
            .and_hms_opt(18, 38, 8)
            .unwrap();
        assert_eq!(ts("2016-04-29T18:38:08Z"), expected);
        assert_eq!(ts("2016-04-29 18:38:08"), expected);
        assert_eq!(ts("2016-04-29T20:38:08+02:00"), expected);
        assert_eq!(ts("04/29/2016 18:38:08"), expected);
        assert_eq!(
            ts("2016-04-29"),
            NaiveDate::from_ymd_opt(2016, 4, 29)
                .unwrap()
                .and_time(NaiveTime::MIN)
        );
        assert_eq!(ts("29-Apr-2016").date(), expected.date());
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(parse_timestamp(""), None);
        assert_eq!(parse_timestamp("   "), None);
        assert_eq!(parse_timestamp("2016-13-45"), None);
        assert_eq!(parse_timestamp("tomorrow"), None);
    }

    #[test]
    fn elapsed_days_counts_whole_days() {
        assert_eq!(elapsed_days(ts("2024-01-01"), ts("2024-01-04")), 3);
        assert_eq!(elapsed_days(ts("2024-01-01"), ts("2024-01-01")), 0);
    }

    #[test]
    fn elapsed_days_floors_negative_spans() {
        // Scheduled in the afternoon for an appointment dated that morning.
        assert_eq!(
            elapsed_days(ts("2016-04-29T18:38:08Z"), ts("2016-04-29T00:00:00Z")),
            -1
        );
        assert_eq!(elapsed_days(ts("2024-01-04"), ts("2024-01-01")), -3);
    }

    #[test]
    fn epoch_millis_of_epoch_is_zero() {
        assert_eq!(to_epoch_millis(ts("1970-01-01")), 0);
        assert_eq!(to_epoch_millis(ts("1970-01-02")), MILLIS_PER_DAY);
    }
}
