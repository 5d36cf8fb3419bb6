#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;
use link_analytics::application::services::EventStore;
use link_analytics::infrastructure::persistence::{JsonRecordRepository, JsonReportRepository};
use link_analytics::state::{AppState, FileEventStore};

pub fn records_path(dir: &Path) -> std::path::PathBuf {
    dir.join("connections.json")
}

pub fn report_path(dir: &Path) -> std::path::PathBuf {
    dir.join("report.json")
}

pub async fn open_store(dir: &Path) -> Arc<FileEventStore> {
    let repo = Arc::new(JsonRecordRepository::new(records_path(dir)));
    Arc::new(EventStore::open(repo).await.unwrap())
}

pub async fn create_test_state(dir: &Path) -> AppState {
    let event_store = open_store(dir).await;
    let report_repo = Arc::new(JsonReportRepository::new(report_path(dir)));
    AppState::new(event_store, report_repo)
}

/// Registers `http://a.com` and records three linked clicks and one orphan.
pub async fn seed_clicks(store: &FileEventStore) {
    store.record_registration("http://a.com", "abc123").await.unwrap();
    store
        .record_click("http://a.com", "1.2.3.4", "2024-01-01 10:30")
        .await
        .unwrap();
    store
        .record_click("http://a.com", "1.2.3.4", "2024-01-01 10:31")
        .await
        .unwrap();
    store
        .record_click("http://a.com", "5.6.7.8", "2024-01-01 10:30")
        .await
        .unwrap();
    store
        .record_click("http://unknown.com", "9.9.9.9", "2024-01-01 10:30")
        .await
        .unwrap();
}
