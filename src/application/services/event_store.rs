//! Single-writer event store owning record ids, deduplication and linkage.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::domain::entities::{ChildRecord, ORPHAN_PARENT_ID, ParentRecord, Record};
use crate::domain::repositories::RecordRepository;
use crate::error::StoreError;

/// Counts of stored records, used for health reporting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreCounts {
    pub parents: usize,
    pub clicks: usize,
    pub orphan_clicks: usize,
}

/// In-memory state guarded by the store lock.
struct StoreState {
    records: Vec<Record>,
    /// Destination URL to the position of its parent in `records`.
    url_index: HashMap<String, usize>,
    last_id: u64,
}

impl StoreState {
    fn from_records(records: Vec<Record>) -> Result<Self, StoreError> {
        let mut seen = HashSet::with_capacity(records.len());
        let mut url_index = HashMap::new();
        let mut last_id = 0;

        for (position, record) in records.iter().enumerate() {
            let id = record.id();
            if id == 0 {
                return Err(StoreError::Corrupt(format!(
                    "record at position {} has id 0",
                    position
                )));
            }
            if !seen.insert(id) {
                return Err(StoreError::Corrupt(format!("duplicate record id {}", id)));
            }
            last_id = last_id.max(id);

            if let Record::Parent(parent) = record {
                // First registration of a URL wins.
                url_index.entry(parent.url.clone()).or_insert(position);
            }
        }

        Ok(Self {
            records,
            url_index,
            last_id,
        })
    }

    fn parent_at(&self, position: usize) -> Result<&ParentRecord, StoreError> {
        self.records
            .get(position)
            .and_then(Record::as_parent)
            .ok_or_else(|| {
                StoreError::Corrupt(format!("url index points at non-parent {}", position))
            })
    }

    fn parent_at_mut(&mut self, position: usize) -> Result<&mut ParentRecord, StoreError> {
        match self.records.get_mut(position) {
            Some(Record::Parent(parent)) => Ok(parent),
            _ => Err(StoreError::Corrupt(format!(
                "url index points at non-parent {}",
                position
            ))),
        }
    }
}

/// The single source of truth for all analytics records.
///
/// Every mutation and every snapshot goes through one async mutex, and the
/// durable rewrite happens while that lock is held. A mutation whose write
/// fails is rolled back before the lock is released, so callers never
/// observe a half-applied event.
///
/// Ids come from one counter shared by parents and clicks: the highest id
/// ever stored plus one. Ids are never reused.
pub struct EventStore<R: RecordRepository> {
    repository: Arc<R>,
    state: Mutex<StoreState>,
}

impl<R: RecordRepository> EventStore<R> {
    /// Loads the persisted records and verifies the storage is writable.
    ///
    /// The loaded collection is written straight back, so an unwritable
    /// location fails here rather than on the first event.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Corrupt`] if stored ids are zero or duplicated.
    /// Returns [`StoreError::Io`] or [`StoreError::Serialization`] if loading
    /// or the verification write fails.
    pub async fn open(repository: Arc<R>) -> Result<Self, StoreError> {
        let records = repository.load().await?;
        let state = StoreState::from_records(records)?;

        repository.save(&state.records).await?;

        info!(
            records = state.records.len(),
            destinations = state.url_index.len(),
            last_id = state.last_id,
            "Event store opened"
        );

        Ok(Self {
            repository,
            state: Mutex::new(state),
        })
    }

    /// Records a registration of `url` under `short_code`.
    ///
    /// A URL that is already registered keeps its original record and short
    /// code; only its `registration_count` is incremented and no id is
    /// consumed.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if persisting fails. The store is unchanged in
    /// that case.
    pub async fn record_registration(
        &self,
        url: &str,
        short_code: &str,
    ) -> Result<ParentRecord, StoreError> {
        let mut state = self.state.lock().await;

        if let Some(&position) = state.url_index.get(url) {
            state.parent_at_mut(position)?.registration_count += 1;

            if let Err(e) = self.repository.save(&state.records).await {
                state.parent_at_mut(position)?.registration_count -= 1;
                return Err(e);
            }

            let parent = state.parent_at(position)?.clone();
            debug!(
                id = parent.id,
                count = parent.registration_count,
                "Repeated registration of {}",
                url
            );
            return Ok(parent);
        }

        let parent = ParentRecord::new(state.last_id + 1, url.to_string(), short_code.to_string());
        state.records.push(Record::Parent(parent.clone()));

        if let Err(e) = self.repository.save(&state.records).await {
            state.records.pop();
            return Err(e);
        }

        let position = state.records.len() - 1;
        state.url_index.insert(parent.url.clone(), position);
        state.last_id = parent.id;

        Ok(parent)
    }

    /// Records a click that resolved to `destination_url`.
    ///
    /// The parent is looked up once, now. A click on a URL that was never
    /// registered is stored with `parent_id == 0` and later excluded from
    /// reports; it is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if persisting fails. The store is unchanged in
    /// that case.
    pub async fn record_click(
        &self,
        destination_url: &str,
        source_ip: &str,
        timestamp: &str,
    ) -> Result<ChildRecord, StoreError> {
        let mut state = self.state.lock().await;

        let parent_id = match state.url_index.get(destination_url) {
            Some(&position) => state.parent_at(position)?.id,
            None => {
                warn!("Click on unregistered destination {}", destination_url);
                ORPHAN_PARENT_ID
            }
        };

        let click = ChildRecord::new(
            state.last_id + 1,
            parent_id,
            source_ip.to_string(),
            timestamp.to_string(),
        );
        state.records.push(Record::Child(click.clone()));

        if let Err(e) = self.repository.save(&state.records).await {
            state.records.pop();
            return Err(e);
        }

        state.last_id = click.id;

        Ok(click)
    }

    /// Returns a point-in-time copy of all records in insertion order.
    ///
    /// The lock is held only for the copy; callers aggregate lock-free.
    pub async fn snapshot(&self) -> Vec<Record> {
        self.state.lock().await.records.clone()
    }

    /// Counts stored parents, clicks and orphan clicks.
    pub async fn counts(&self) -> StoreCounts {
        let state = self.state.lock().await;
        state
            .records
            .iter()
            .fold(StoreCounts::default(), |mut counts, record| {
                match record {
                    Record::Parent(_) => counts.parents += 1,
                    Record::Child(child) => {
                        counts.clicks += 1;
                        if child.is_orphan() {
                            counts.orphan_clicks += 1;
                        }
                    }
                }
                counts
            })
    }
}
