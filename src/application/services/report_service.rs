//! Report building and retrieval service.

use std::sync::Arc;

use serde_json::json;

use crate::application::services::EventStore;
use crate::domain::dimension::parse_dimensions;
use crate::domain::report::{Report, build_report};
use crate::domain::repositories::{RecordRepository, ReportRepository};
use crate::error::AppError;

/// Service behind the report endpoints.
///
/// Retrieval is two-step: [`ReportService::build_and_store`] aggregates a
/// fresh snapshot and overwrites the stored report, and
/// [`ReportService::last_report`] reads back whatever was stored last.
pub struct ReportService<R: RecordRepository, P: ReportRepository> {
    event_store: Arc<EventStore<R>>,
    report_repository: Arc<P>,
}

impl<R: RecordRepository, P: ReportRepository> ReportService<R, P> {
    /// Creates a new report service.
    pub fn new(event_store: Arc<EventStore<R>>, report_repository: Arc<P>) -> Self {
        Self {
            event_store,
            report_repository,
        }
    }

    /// Builds a rollup over the current records and stores it.
    ///
    /// Unknown dimension names are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] if the report cannot be persisted.
    pub async fn build_and_store<S: AsRef<str>>(&self, names: &[S]) -> Result<Report, AppError> {
        let dimensions = parse_dimensions(names);
        let records = self.event_store.snapshot().await;

        let report = build_report(&dimensions, &records);
        tracing::info!(
            dimensions = ?dimensions,
            records = records.len(),
            groups = report.groups().len(),
            "Report built"
        );

        self.report_repository.save(&report).await?;

        Ok(report)
    }

    /// Returns the most recently stored report.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no report has been built yet.
    /// Returns [`AppError::Internal`] if the stored report cannot be read.
    pub async fn last_report(&self) -> Result<Report, AppError> {
        self.report_repository.load_last().await?.ok_or_else(|| {
            AppError::not_found(
                "No report has been built yet",
                json!({ "hint": "POST /report first" }),
            )
        })
    }

    /// Returns true if a built report is available.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] if the stored report cannot be read.
    pub async fn has_report(&self) -> Result<bool, AppError> {
        Ok(self.report_repository.load_last().await?.is_some())
    }
}
