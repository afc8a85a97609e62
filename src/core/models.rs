use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

pub const REQUEST_LOG_CAPACITY: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceId {
    Weather,
    Notes,
}

impl SourceId {
    pub const ALL: [SourceId; 2] = [SourceId::Weather, SourceId::Notes];

    pub fn name(&self) -> &'static str {
        match self {
            SourceId::Weather => "Weather",
            SourceId::Notes => "Notes",
        }
    }

    /// Storage key holding this source's freshness record.
    pub fn storage_key(&self) -> &'static str {
        match self {
            SourceId::Weather => "cachedWeatherData",
            SourceId::Notes => "cachedNotesData",
        }
    }

    /// Only weather calls are recorded in the request log.
    pub fn records_requests(&self) -> bool {
        matches!(self, SourceId::Weather)
    }

    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_lowercase().as_str() {
            "weather" => Some(SourceId::Weather),
            "notes" => Some(SourceId::Notes),
            _ => None,
        }
    }
}

impl std::fmt::Display for SourceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceId::Weather => f.write_str("weather"),
            SourceId::Notes => f.write_str("notes"),
        }
    }
}

/// Last successfully fetched payload together with the time it was fetched.
/// Both halves are always written as one unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FreshnessRecord {
    pub last_fetched_at: DateTime<Utc>,
    pub payload: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestLogEntry {
    pub time: DateTime<Utc>,
}

impl RequestLogEntry {
    pub fn at(time: DateTime<Utc>) -> Self {
        Self { time }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestLog {
    entries: VecDeque<RequestLogEntry>,
}

impl RequestLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: RequestLogEntry, capacity: usize) {
        self.entries.push_back(entry);
        while self.entries.len() > capacity {
            self.entries.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> impl Iterator<Item = &RequestLogEntry> {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn base_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 14, 8, 0, 0).unwrap()
    }

    #[test]
    fn test_request_log_keeps_last_ten_in_order() {
        let mut log = RequestLog::new();
        for i in 0..15 {
            log.push(
                RequestLogEntry::at(base_time() + Duration::minutes(i)),
                REQUEST_LOG_CAPACITY,
            );
            assert!(log.len() <= REQUEST_LOG_CAPACITY);
        }

        let times: Vec<_> = log.entries().map(|e| e.time).collect();
        let expected: Vec<_> = (5..15).map(|i| base_time() + Duration::minutes(i)).collect();
        assert_eq!(times, expected);
    }

    #[test]
    fn test_request_log_under_capacity() {
        let mut log = RequestLog::new();
        log.push(RequestLogEntry::at(base_time()), REQUEST_LOG_CAPACITY);
        log.push(
            RequestLogEntry::at(base_time() + Duration::seconds(1)),
            REQUEST_LOG_CAPACITY,
        );
        assert_eq!(log.len(), 2);
        assert!(!log.is_empty());
    }

    #[test]
    fn test_request_log_serializes_as_array() {
        let mut log = RequestLog::new();
        log.push(RequestLogEntry::at(base_time()), REQUEST_LOG_CAPACITY);

        let json = serde_json::to_value(&log).unwrap();
        assert!(json.is_array());
        assert_eq!(json[0]["time"], "2025-03-14T08:00:00Z");
    }

    #[test]
    fn test_source_policies() {
        assert!(SourceId::Weather.records_requests());
        assert!(!SourceId::Notes.records_requests());
        assert_ne!(SourceId::Weather.storage_key(), SourceId::Notes.storage_key());
    }

    #[test]
    fn test_source_parse() {
        assert_eq!(SourceId::parse("Weather"), Some(SourceId::Weather));
        assert_eq!(SourceId::parse(" notes "), Some(SourceId::Notes));
        assert_eq!(SourceId::parse("clock"), None);
    }
}
