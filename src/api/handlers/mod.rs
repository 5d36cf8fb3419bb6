//! HTTP request handlers for API endpoints.

pub mod health;
pub mod report;

pub use health::health_handler;
pub use report::{build_report_handler, last_report_handler};
