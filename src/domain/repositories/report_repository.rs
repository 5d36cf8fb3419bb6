//! Repository trait for the most recently built report.

use crate::domain::report::Report;
use crate::error::StoreError;
use async_trait::async_trait;

/// Durable slot holding the last built report.
///
/// Each build overwrites the slot. The fetch path reads it back without
/// rebuilding.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReportRepository: Send + Sync {
    /// Overwrites the stored report.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if the storage cannot be written.
    async fn save(&self, report: &Report) -> Result<(), StoreError>;

    /// Reads the stored report.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(report))` if a build has been stored
    /// - `Ok(None)` if no report has been built yet
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] or [`StoreError::Serialization`] if the slot
    /// exists but cannot be read back.
    async fn load_last(&self) -> Result<Option<Report>, StoreError>;
}
