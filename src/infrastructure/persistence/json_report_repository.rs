//! JSON file implementation of the report repository.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use super::json_file::JsonFile;
use crate::domain::report::Report;
use crate::domain::repositories::ReportRepository;
use crate::error::StoreError;

/// Keeps the last built report in a single, overwritten JSON file.
pub struct JsonReportRepository {
    file: JsonFile,
}

impl JsonReportRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            file: JsonFile::new(path.into()),
        }
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }
}

#[async_trait]
impl ReportRepository for JsonReportRepository {
    async fn save(&self, report: &Report) -> Result<(), StoreError> {
        let mut contents = serde_json::to_vec_pretty(report)?;
        contents.push(b'\n');
        self.file.write_atomic(&contents).await
    }

    async fn load_last(&self) -> Result<Option<Report>, StoreError> {
        self.file.read_optional()
            .await?
            .map(|bytes| serde_json::from_slice(&bytes).map_err(StoreError::from))
            .transpose()
    }
}
