//! Canonical timestamps.
//!
//! Stored timestamps and range bounds are both rendered as
//! `YYYY-MM-DD HH:MM:SS` in local wall-clock time, so that plain string
//! comparison in SQL orders them correctly down to the second.

use chrono::{DateTime, Local, NaiveDateTime};

use crate::errors::{Error, Result};

pub const CANONICAL_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Naive layouts accepted for range bounds, tried in order. `%.f` also
/// matches an absent fraction.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Current local time in canonical form.
pub fn canonical_now() -> String {
    format_canonical(Local::now().naive_local())
}

/// Renders a wall-clock time, dropping any sub-second component.
pub fn format_canonical(dt: NaiveDateTime) -> String {
    dt.format(CANONICAL_FORMAT).to_string()
}

/// Normalizes a client-supplied timestamp to canonical form.
///
/// Offset-bearing (RFC 3339) inputs are converted to local time first;
/// naive inputs are taken as local wall-clock already.
pub fn normalize(input: &str) -> Result<String> {
    let trimmed = input.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(format_canonical(dt.with_timezone(&Local).naive_local()));
    }

    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(trimmed, fmt).ok())
        .map(format_canonical)
        .ok_or_else(|| Error::InvalidTimestamp(input.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_canonical_passes_through() {
        assert_eq!(
            normalize("2024-05-01 10:15:30").unwrap(),
            "2024-05-01 10:15:30"
        );
    }

    #[test]
    fn test_drops_sub_second_component() {
        assert_eq!(
            normalize("2024-05-01 10:15:30.987654").unwrap(),
            "2024-05-01 10:15:30"
        );
        assert_eq!(
            normalize("2024-05-01T10:15:30.5").unwrap(),
            "2024-05-01 10:15:30"
        );
    }

    #[test]
    fn test_t_separator_is_canonicalized() {
        assert_eq!(
            normalize("2024-05-01T10:15:30").unwrap(),
            "2024-05-01 10:15:30"
        );
    }

    #[test]
    fn test_minute_precision_input() {
        assert_eq!(normalize("2024-05-01T10:15").unwrap(), "2024-05-01 10:15:00");
        assert_eq!(normalize(" 2024-05-01 10:15 ").unwrap(), "2024-05-01 10:15:00");
    }

    #[test]
    fn test_offset_input_is_converted_to_local() {
        let expected = format_canonical(
            Utc.with_ymd_and_hms(2024, 5, 1, 10, 15, 30)
                .unwrap()
                .with_timezone(&Local)
                .naive_local(),
        );

        assert_eq!(normalize("2024-05-01T10:15:30.123Z").unwrap(), expected);
        assert_eq!(normalize("2024-05-01T12:15:30+02:00").unwrap(), expected);
    }

    #[test]
    fn test_normalize_is_idempotent() {
        for input in [
            "2024-05-01T10:15:30.123456",
            "2024-05-01 23:59:59.999",
            "2024-05-01T10:15:30.123Z",
            "2024-05-01T10:15",
        ] {
            let once = normalize(input).unwrap();
            let twice = normalize(&once).unwrap();
            assert_eq!(once, twice, "input {input}");
        }
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(matches!(
            normalize("yesterday"),
            Err(Error::InvalidTimestamp(_))
        ));
        assert!(normalize("2024-13-01 00:00:00").is_err());
        assert!(normalize("").is_err());
    }

    #[test]
    fn test_canonical_now_has_second_precision() {
        let now = canonical_now();
        assert_eq!(now.len(), "YYYY-MM-DD HH:MM:SS".len());
        assert!(!now.contains('.'));
        assert_eq!(normalize(&now).unwrap(), now);
    }
}
