//! Core domain entities representing the analytics data model.
//!
//! Two record kinds share a single id space:
//!
//! - [`ParentRecord`] - One registered destination URL and its short code
//! - [`ChildRecord`] - One click, linked to its parent by URL at write time
//!
//! [`Record`] wraps both kinds so the store can keep them in one ordered
//! collection, which is also the persisted layout.

pub mod record;

pub use record::{
    ChildRecord, ORPHAN_PARENT_ID, ParentRecord, Record, TIMESTAMP_FORMAT, format_timestamp,
};
