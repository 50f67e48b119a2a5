/// Serde helpers for card timestamps.
///
/// Timestamps are written as RFC 3339. On read we also accept the shapes people
/// type by hand in an editor: `2026-03-01 09:30:00` and bare `2026-03-01`
/// (both taken as UTC).
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serializer};

pub type Timestamp = DateTime<FixedOffset>;

/// Current time with a UTC offset.
pub fn now() -> Timestamp {
    Utc::now().fixed_offset()
}

pub fn parse(raw: &str) -> Option<Timestamp> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts);
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Some(naive.and_utc().fixed_offset());
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S") {
        return Some(naive.and_utc().fixed_offset());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc().fixed_offset())
}

pub fn format(ts: &Timestamp) -> String {
    ts.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

pub fn serialize<S: Serializer>(ts: &Timestamp, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&format(ts))
}

pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Timestamp, D::Error> {
    let raw = String::deserialize(d)?;
    parse(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {raw}")))
}

/// Same as the parent module, for `Option<Timestamp>` fields.
pub mod option {
    use super::Timestamp;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(ts: &Option<Timestamp>, s: S) -> Result<S::Ok, S::Error> {
        match ts {
            Some(ts) => super::serialize(ts, s),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Timestamp>, D::Error> {
        let raw: Option<String> = Option::deserialize(d)?;
        match raw {
            None => Ok(None),
            Some(raw) if raw.trim().is_empty() => Ok(None),
            Some(raw) => super::parse(&raw)
                .map(Some)
                .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {raw}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_parse_rfc3339_keeps_offset() {
        let ts = parse("2026-03-01T09:30:00-05:00").unwrap();
        assert_eq!(ts.offset().local_minus_utc(), -5 * 3600);
        assert_eq!(ts.hour(), 9);
    }

    #[test]
    fn test_parse_date_only() {
        let ts = parse("2026-03-01").unwrap();
        assert_eq!((ts.year(), ts.month(), ts.day()), (2026, 3, 1));
        assert_eq!(ts.hour(), 0);
    }

    #[test]
    fn test_parse_space_separated() {
        let ts = parse("2026-03-01 14:05:09").unwrap();
        assert_eq!((ts.hour(), ts.minute(), ts.second()), (14, 5, 9));
    }

    #[test]
    fn test_parse_garbage() {
        assert!(parse("next tuesday").is_none());
    }

    #[test]
    fn test_format_roundtrip() {
        let ts = parse("2026-03-01T09:30:00Z").unwrap();
        assert_eq!(format(&ts), "2026-03-01T09:30:00Z");
        assert_eq!(parse(&format(&ts)), Some(ts));
    }
}
