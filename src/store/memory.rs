//! In-process content store with an ordered write journal.

use crate::error::StorageError;
use crate::item::ContentItem;
use crate::store::{ContentQuery, ContentStore};
use crate::types::{LogicalId, RowId, VersionNumber};
use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

/// Flag state of a row at the moment it was written
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteRecord {
    pub row_id: RowId,
    pub logical_id: LogicalId,
    pub number: VersionNumber,
    pub latest: bool,
    pub published: bool,
}

impl From<&ContentItem> for WriteRecord {
    fn from(item: &ContentItem) -> Self {
        Self {
            row_id: item.row_id,
            logical_id: item.logical_id,
            number: item.number,
            latest: item.latest,
            published: item.published,
        }
    }
}

pub struct MemoryContentStore {
    rows: RwLock<BTreeMap<RowId, ContentItem>>,
    journal: Mutex<Vec<WriteRecord>>,
    next_row_id: AtomicU64,
}

impl Default for MemoryContentStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryContentStore {
    pub fn new() -> Self {
        Self {
            rows: RwLock::new(BTreeMap::new()),
            journal: Mutex::new(Vec::new()),
            next_row_id: AtomicU64::new(1),
        }
    }

    /// Every write in the order it was issued
    pub fn writes(&self) -> Vec<WriteRecord> {
        self.journal.lock().clone()
    }

    pub fn write_count(&self) -> usize {
        self.journal.lock().len()
    }

    pub fn clear_writes(&self) {
        self.journal.lock().clear();
    }

    /// Every stored row, by row id
    pub fn rows(&self) -> Vec<ContentItem> {
        self.rows.read().values().cloned().collect()
    }

    /// Rows of one logical item, by version number
    pub fn rows_for(&self, logical_id: LogicalId) -> Vec<ContentItem> {
        let mut rows: Vec<ContentItem> = self
            .rows
            .read()
            .values()
            .filter(|r| r.logical_id == logical_id)
            .cloned()
            .collect();
        rows.sort_by_key(|r| r.number);
        rows
    }
}

#[async_trait]
impl ContentStore for MemoryContentStore {
    async fn fetch(&self, row_id: RowId) -> Result<Option<ContentItem>, StorageError> {
        Ok(self.rows.read().get(&row_id).cloned())
    }

    async fn query(&self, query: &ContentQuery) -> Result<Vec<ContentItem>, StorageError> {
        let mut matches: Vec<ContentItem> = self
            .rows
            .read()
            .values()
            .filter(|r| query.matches(r))
            .cloned()
            .collect();
        matches.sort_by_key(|r| (r.number, r.row_id));
        Ok(matches)
    }

    async fn save(&self, item: &ContentItem) -> Result<RowId, StorageError> {
        let mut row = item.clone();
        if row.row_id == 0 {
            row.row_id = self.next_row_id.fetch_add(1, Ordering::SeqCst);
        }
        let row_id = row.row_id;
        self.journal.lock().push(WriteRecord::from(&row));
        self.rows.write().insert(row_id, row);
        Ok(row_id)
    }
}
