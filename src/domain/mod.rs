//! Domain layer containing the analytics data model and aggregation logic.
//!
//! Nothing in here touches files or sockets; storage is reached through the
//! repository traits.
//!
//! # Architecture
//!
//! - [`entities`] - Parent (registration) and child (click) records
//! - [`dimension`] - Report grouping axes
//! - [`report`] - Rollup tree and the pure report builder
//! - [`ingest_event`] - Notifications received from the redirect front end
//! - [`repositories`] - Storage trait definitions
//!
//! # Event Flow
//!
//! 1. The front end sends an [`ingest_event::IngestEvent`] to the gateway
//! 2. The gateway forwards it to [`crate::application::services::EventStore`]
//! 3. The store links clicks to parents and persists via [`repositories::RecordRepository`]
//! 4. [`report::build_report`] aggregates a snapshot on demand

pub mod dimension;
pub mod entities;
pub mod ingest_event;
pub mod report;
pub mod repositories;
