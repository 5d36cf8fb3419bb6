//! Shared state injected into HTTP handlers.

use std::sync::Arc;

use crate::application::services::{EventStore, ReportService};
use crate::infrastructure::persistence::{JsonRecordRepository, JsonReportRepository};

/// Event store backed by the JSON records file.
pub type FileEventStore = EventStore<JsonRecordRepository>;

/// Report service backed by the JSON records and report files.
pub type FileReportService = ReportService<JsonRecordRepository, JsonReportRepository>;

#[derive(Clone)]
pub struct AppState {
    pub event_store: Arc<FileEventStore>,
    pub report_service: Arc<FileReportService>,
}

impl AppState {
    /// Wires the report service to `event_store` and `report_repository`.
    pub fn new(event_store: Arc<FileEventStore>, report_repository: Arc<JsonReportRepository>) -> Self {
        let report_service = Arc::new(ReportService::new(event_store.clone(), report_repository));
        Self {
            event_store,
            report_service,
        }
    }
}
