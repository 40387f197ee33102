use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer};

/// Formats accepted from `<input type="datetime-local">`, read as UTC
const LOCAL_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M", "%Y-%m-%dT%H:%M:%S"];

/// Parse an event time: RFC 3339 with an offset, or a naive local form taken as UTC
pub fn parse_event_time(value: &str) -> Result<DateTime<Utc>, String> {
    let value = value.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.with_timezone(&Utc));
    }

    LOCAL_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .map(|naive| naive.and_utc())
        .ok_or_else(|| format!("unrecognised event time: {:?}", value))
}

pub fn deserialize_event_time<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_event_time(&raw).map_err(serde::de::Error::custom)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_rfc3339_normalises_to_utc() {
        let parsed = parse_event_time("2025-03-02T07:30:00+05:30").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2025, 3, 2, 2, 0, 0).unwrap());
    }

    #[test]
    fn test_parse_datetime_local() {
        let parsed = parse_event_time("2025-03-02T07:30").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2025, 3, 2, 7, 30, 0).unwrap());

        let with_seconds = parse_event_time(" 2025-03-02T07:30:15 ").unwrap();
        assert_eq!(with_seconds, Utc.with_ymd_and_hms(2025, 3, 2, 7, 30, 15).unwrap());
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_event_time("next sunday").is_err());
        assert!(parse_event_time("").is_err());
    }
}
