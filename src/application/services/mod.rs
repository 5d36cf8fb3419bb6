//! Business logic services for the application layer.

pub mod event_store;
pub mod report_service;

pub use event_store::{EventStore, StoreCounts};
pub use report_service::ReportService;
