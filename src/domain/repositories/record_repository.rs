//! Repository trait for the durable record collection.

use crate::domain::entities::Record;
use crate::error::StoreError;
use async_trait::async_trait;

/// Durable storage for the full, ordered record collection.
///
/// Persistence is a whole-collection rewrite: every mutation of the event
/// store hands the complete record sequence to [`RecordRepository::save`].
/// Implementations must replace the previous contents atomically, so that a
/// failed save leaves the last successful snapshot intact.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::JsonRecordRepository`] - pretty-printed JSON file
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RecordRepository: Send + Sync {
    /// Loads all records in insertion order.
    ///
    /// Returns an empty collection when nothing has been persisted yet.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if the storage cannot be read.
    /// Returns [`StoreError::Serialization`] if the stored data is malformed.
    async fn load(&self) -> Result<Vec<Record>, StoreError>;

    /// Replaces the stored collection with `records`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if the storage cannot be written.
    async fn save(&self, records: &[Record]) -> Result<(), StoreError>;
}
