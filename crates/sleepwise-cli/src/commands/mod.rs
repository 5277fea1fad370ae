pub mod config;
pub mod daily;
pub mod sessions;
pub mod stats;
pub mod validate;

use std::path::Path;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime};
use serde::de::DeserializeOwned;
use sleepwise_core::{AnalysisConfig, Event};

/// Read and deserialize a JSON file.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, Box<dyn std::error::Error>> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("cannot read {}: {e}", path.display()))?;
    let value = serde_json::from_str(&content)
        .map_err(|e| format!("invalid JSON in {}: {e}", path.display()))?;
    Ok(value)
}

/// Read an event list (a JSON array of events).
pub fn read_events(path: &Path) -> Result<Vec<Event>, Box<dyn std::error::Error>> {
    let events: Vec<Event> = read_json(path)?;
    tracing::debug!(count = events.len(), path = %path.display(), "read events");
    Ok(events)
}

pub fn load_config(path: Option<&Path>) -> Result<AnalysisConfig, Box<dyn std::error::Error>> {
    Ok(AnalysisConfig::load_from(path)?)
}

/// Parse an RFC 3339 instant or a bare `YYYY-MM-DD` (midnight UTC).
pub fn parse_instant(s: &str) -> Result<DateTime<FixedOffset>, String> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt);
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map(|d| d.and_time(NaiveTime::MIN).and_utc().fixed_offset())
        .map_err(|_| format!("invalid date '{s}', expected RFC 3339 or YYYY-MM-DD"))
}

pub fn print_json<T: serde::Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_instant_accepts_both_forms() {
        let dt = parse_instant("2024-03-10T19:30:00-05:00").unwrap();
        assert_eq!(dt.offset().local_minus_utc(), -5 * 3600);

        let dt = parse_instant("2024-03-10").unwrap();
        assert_eq!(dt.to_rfc3339(), "2024-03-10T00:00:00+00:00");

        assert!(parse_instant("10/03/2024").is_err());
    }
}
