use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Event as submitted to an ActivityWatch bucket.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewEvent {
    pub timestamp: DateTime<FixedOffset>,
    /// Seconds
    pub duration: i64,
    pub data: Map<String, Value>,
}

/// Event as returned when listing a bucket.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredEvent {
    #[serde(default)]
    pub id: Option<i64>,
    pub timestamp: DateTime<FixedOffset>,
    /// Seconds; the server reports fractional durations
    pub duration: f64,
    #[serde(default)]
    pub data: Map<String, Value>,
}

impl StoredEvent {
    /// The identity recorded when the event was imported, if any.
    pub fn identity(&self) -> Option<&str> {
        self.data.get("uid").and_then(Value::as_str)
    }
}
