//! Identity keys and the set of identities already present in a bucket.
//!
//! The canonical identity is `"{startDate}_{endDate}_{activityType}"` built from
//! the raw CSV strings. Existing events are never re-keyed from their parsed
//! timestamps; their stored `uid` is taken as-is.

use std::collections::HashSet;

use crate::models::activity::ActivityRecord;
use crate::models::event::StoredEvent;

pub fn identity(record: &ActivityRecord) -> String {
    record.identity()
}

/// Identities stored in the bucket when a file import started.
#[derive(Debug, Default, Clone)]
pub struct ProcessedIdentitySet {
    identities: HashSet<String>,
}

impl ProcessedIdentitySet {
    pub fn from_events(events: &[StoredEvent]) -> Self {
        let identities = events
            .iter()
            .filter_map(StoredEvent::identity)
            .map(str::to_string)
            .collect();
        Self { identities }
    }

    pub fn is_duplicate(&self, identity: &str) -> bool {
        self.identities.contains(identity)
    }

    pub fn len(&self) -> usize {
        self.identities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.identities.is_empty()
    }
}
