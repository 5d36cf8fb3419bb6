//! File-backed repository implementations.
//!
//! Both repositories persist pretty-printed JSON and replace their file
//! atomically on every write.
//!
//! # Repositories
//!
//! - [`JsonRecordRepository`] - The full ordered record collection
//! - [`JsonReportRepository`] - The last built report

mod json_file;
pub mod json_record_repository;
pub mod json_report_repository;

pub use json_record_repository::JsonRecordRepository;
pub use json_report_repository::JsonReportRepository;
