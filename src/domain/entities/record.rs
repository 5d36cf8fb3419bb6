//! Stored analytics records: registered destinations and the clicks that resolve to them.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// Format used for click timestamps (minute resolution).
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";

/// `parent_id` value of a click that matched no registered destination.
pub const ORPHAN_PARENT_ID: u64 = 0;

/// One uniquely registered destination URL.
///
/// Created on the first registration of a URL. Re-registering the same URL
/// (even under another short code) only bumps `registration_count`; the first
/// short code wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParentRecord {
    pub id: u64,
    pub url: String,
    pub short_url: String,
    pub registration_count: u64,
}

impl ParentRecord {
    /// Creates a freshly registered destination with a count of one.
    pub fn new(id: u64, url: String, short_url: String) -> Self {
        Self {
            id,
            url,
            short_url,
            registration_count: 1,
        }
    }

    /// Display value used by the `Destination` report dimension.
    pub fn destination_label(&self) -> String {
        format!("{} ({})", self.url, self.short_url)
    }
}

/// One click (short code resolution) event.
///
/// `parent_id` is resolved once, at write time, and never relinked afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChildRecord {
    pub id: u64,
    pub parent_id: u64,
    pub source_ip: String,
    pub timestamp: String,
}

impl ChildRecord {
    pub fn new(id: u64, parent_id: u64, source_ip: String, timestamp: String) -> Self {
        Self {
            id,
            parent_id,
            source_ip,
            timestamp,
        }
    }

    /// Returns true if the click matched no registered destination.
    pub fn is_orphan(&self) -> bool {
        self.parent_id == ORPHAN_PARENT_ID
    }

    /// The `HH:MM` part of the timestamp (everything after the date).
    ///
    /// Falls back to the whole value when the timestamp has no date prefix.
    pub fn time_of_day(&self) -> &str {
        self.timestamp
            .split_once(' ')
            .map(|(_, time)| time)
            .unwrap_or(&self.timestamp)
    }
}

/// A stored record of either kind, sharing one id space.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Record {
    Parent(ParentRecord),
    Child(ChildRecord),
}

impl Record {
    pub fn id(&self) -> u64 {
        match self {
            Record::Parent(parent) => parent.id,
            Record::Child(child) => child.id,
        }
    }

    pub fn as_parent(&self) -> Option<&ParentRecord> {
        match self {
            Record::Parent(parent) => Some(parent),
            Record::Child(_) => None,
        }
    }

    pub fn as_child(&self) -> Option<&ChildRecord> {
        match self {
            Record::Child(child) => Some(child),
            Record::Parent(_) => None,
        }
    }
}

/// Formats a receipt time the way click timestamps are stored.
pub fn format_timestamp(at: DateTime<Local>) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}
