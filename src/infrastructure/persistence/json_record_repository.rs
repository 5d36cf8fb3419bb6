//! JSON file implementation of the record repository.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use super::json_file::JsonFile;
use crate::domain::entities::Record;
use crate::domain::repositories::RecordRepository;
use crate::error::StoreError;

/// Stores the whole record collection as one pretty-printed JSON array.
///
/// Every save rewrites the file, which costs O(n) per event. The format is
/// kept human-readable on purpose; switch to an append log only if record
/// volume outgrows full rewrites.
pub struct JsonRecordRepository {
    file: JsonFile,
}

impl JsonRecordRepository {
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
impl RecordRepository for JsonRecordRepository {
    async fn load(&self) -> Result<Vec<Record>, StoreError> {
        match self.file.read_optional().await? {
            Some(bytes) => Ok(serde_json::from_slice(&bytes)?),
            None => Ok(Vec::new()),
        }
    }

    async fn save(&self, records: &[Record]) -> Result<(), StoreError> {
        let contents = serde_json::to_vec_pretty(records)?;
        self.file.write_atomic(&contents).await
    }
}
