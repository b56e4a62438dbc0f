//! Timestamp parsing for API payloads.
//!
//! The API has shipped several timestamp shapes over time, so anything that
//! does not parse is logged and read as absent instead of failing the page.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Parses RFC 3339, naive `YYYY-MM-DDTHH:MM:SS` (UTC), `YYYY-MM-DD` or epoch milliseconds.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(ndt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(ndt.and_utc());
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|ndt| ndt.and_utc());
    }
    if let Ok(ms) = raw.parse::<i64>() {
        return DateTime::from_timestamp_millis(ms);
    }
    None
}

/// `deserialize_with` helper for optional timestamps.
pub fn deserialize_lenient<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    let parsed = match &value {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::String(s)) if s.trim().is_empty() => return Ok(None),
        Some(Value::String(s)) => parse_timestamp(s),
        Some(Value::Number(n)) => n.as_i64().and_then(DateTime::from_timestamp_millis),
        Some(_) => None,
    };

    if parsed.is_none()
        && let Some(v) = &value
    {
        log::warn!("Ignoring unparsable timestamp {v}, treating it as absent");
    }
    Ok(parsed)
}

/// Whole days until `expires_at`, rounded up.
pub fn days_remaining(expires_at: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    let ms = (expires_at - now).num_milliseconds();
    let day_ms = 24 * 60 * 60 * 1000;
    // ceil for negative values too
    ms.div_euclid(day_ms) + i64::from(ms.rem_euclid(day_ms) != 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[derive(Deserialize)]
    struct Holder {
        #[serde(default, deserialize_with = "deserialize_lenient")]
        at: Option<DateTime<Utc>>,
    }

    fn holder(json: &str) -> Option<DateTime<Utc>> {
        serde_json::from_str::<Holder>(json).unwrap().at
    }

    #[test]
    fn test_parse_timestamp_formats() {
        let expected = Utc.with_ymd_and_hms(2099, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(parse_timestamp("2099-01-01"), Some(expected));
        assert_eq!(parse_timestamp("2099-01-01T00:00:00Z"), Some(expected));
        assert_eq!(parse_timestamp("2099-01-01T02:00:00+02:00"), Some(expected));
        assert_eq!(parse_timestamp("2099-01-01T00:00:00"), Some(expected));
        assert_eq!(
            parse_timestamp(&expected.timestamp_millis().to_string()),
            Some(expected)
        );
        assert_eq!(parse_timestamp("not a date"), None);
        assert_eq!(parse_timestamp("   "), None);
    }

    #[test]
    fn test_deserialize_lenient() {
        assert!(holder("{}").is_none());
        assert!(holder(r#"{"at": null}"#).is_none());
        assert!(holder(r#"{"at": ""}"#).is_none());
        assert!(holder(r#"{"at": "garbage"}"#).is_none());
        assert!(holder(r#"{"at": true}"#).is_none());
        assert_eq!(
            holder(r#"{"at": 1600000000000}"#),
            DateTime::from_timestamp_millis(1_600_000_000_000)
        );
        assert_eq!(
            holder(r#"{"at": "2020-01-01"}"#),
            Some(Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_days_remaining_rounds_up() {
        let now = Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap();
        assert_eq!(days_remaining(now + Duration::days(3), now), 3);
        assert_eq!(days_remaining(now + Duration::hours(25), now), 2);
        assert_eq!(days_remaining(now + Duration::minutes(1), now), 1);
        assert_eq!(days_remaining(now, now), 0);
    }
}
