//! Repository trait definitions for the domain layer.
//!
//! These traits abstract durable storage so the event store and report
//! service can be exercised against mocks. Concrete implementations live in
//! `crate::infrastructure::persistence`.
//!
//! # Available Repositories
//!
//! - [`RecordRepository`] - The full ordered record collection
//! - [`ReportRepository`] - The last built rollup report

pub mod record_repository;
pub mod report_repository;

pub use record_repository::RecordRepository;
pub use report_repository::ReportRepository;

#[cfg(test)]
pub use record_repository::MockRecordRepository;
#[cfg(test)]
pub use report_repository::MockReportRepository;
