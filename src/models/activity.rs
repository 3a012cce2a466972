//! Workout activity record built from one exported CSV row.

use chrono::{DateTime, FixedOffset};
use std::collections::BTreeMap;

use crate::models::event::NewEvent;

/// Normalized activity ready to be submitted as one event.
#[derive(Debug, Clone, PartialEq)]
pub struct ActivityRecord {
    /// Activity type label (e.g. `HKWorkoutActivityTypeRunning`)
    pub title: String,
    pub start_time: DateTime<FixedOffset>,
    /// `endDate - startDate`, truncated to whole seconds
    pub duration_seconds: i64,
    /// Product, source, energy, distance and weather fields; never absent, empty when missing
    pub attributes: BTreeMap<String, String>,
    start_raw: String,
    end_raw: String,
}

impl ActivityRecord {
    pub fn new(
        title: String,
        start_raw: String,
        end_raw: String,
        start_time: DateTime<FixedOffset>,
        end_time: DateTime<FixedOffset>,
        attributes: BTreeMap<String, String>,
    ) -> Self {
        Self {
            title,
            start_time,
            duration_seconds: (end_time - start_time).num_seconds(),
            attributes,
            start_raw,
            end_raw,
        }
    }

    /// Dedup key, always recomputed from the raw `startDate`, `endDate` and
    /// `activityType` strings exactly as read from the file.
    pub fn identity(&self) -> String {
        format!("{}_{}_{}", self.start_raw, self.end_raw, self.title)
    }

    pub fn into_event(self) -> NewEvent {
        let uid = self.identity();
        let mut data = serde_json::Map::new();
        data.insert("title".to_string(), self.title.into());
        data.insert("uid".to_string(), uid.into());
        for (key, value) in self.attributes {
            data.insert(key, value.into());
        }

        NewEvent {
            timestamp: self.start_time,
            duration: self.duration_seconds,
            data,
        }
    }
}
