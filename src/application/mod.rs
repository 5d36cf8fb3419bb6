//! Application layer services implementing the collector's operations.
//!
//! Services coordinate repositories and domain logic and give HTTP handlers
//! and the ingestion gateway a narrow API.
//!
//! # Available Services
//!
//! - [`services::event_store::EventStore`] - Record ids, deduplication, click linkage
//! - [`services::report_service::ReportService`] - Build, store and fetch rollup reports

pub mod services;
