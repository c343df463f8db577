//! Persistence layer for the Content Store

use crate::error::StorageError;
use crate::item::ContentItem;
use crate::store::{ContentQuery, ContentStore};
use crate::types::{LogicalId, RowId};
use async_trait::async_trait;
use sled::{Db, Tree};
use std::path::Path;
use tracing::trace;

const TREE_ITEMS: &str = "content_items";
const TREE_INDEX: &str = "content_index";

/// Sled-based implementation of ContentStore
///
/// Rows live in `content_items` keyed by big-endian row id and are encoded as
/// JSON. `content_index` maps `logical_id ‖ row_id` (both big-endian) to an
/// empty value so that all rows of a logical item are one prefix scan away.
#[derive(Clone)]
pub struct SledContentStore {
    db: Db,
    items: Tree,
    index: Tree,
    flush_on_save: bool,
}

impl SledContentStore {
    /// Open (or create) a sled database at the given path
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StorageError> {
        let db = sled::open(path).map_err(|e| {
            StorageError::IoError(std::io::Error::new(
                std::io::ErrorKind::Other,
                format!("Failed to open sled database: {}", e),
            ))
        })?;
        Self::new(db)
    }

    /// Use an already-open database (shared with e.g. the id allocator)
    pub fn new(db: Db) -> Result<Self, StorageError> {
        let items = db.open_tree(TREE_ITEMS)?;
        let index = db.open_tree(TREE_INDEX)?;
        Ok(Self {
            db,
            items,
            index,
            flush_on_save: false,
        })
    }

    /// Flush to disk after every save instead of relying on sled's background flusher
    pub fn flush_on_save(mut self, enabled: bool) -> Self {
        self.flush_on_save = enabled;
        self
    }

    /// Get the underlying sled database (for advanced operations)
    pub fn db(&self) -> &Db {
        &self.db
    }

    /// Flush all pending writes to disk
    pub fn flush(&self) -> Result<(), StorageError> {
        self.db.flush()?;
        Ok(())
    }

    /// Number of stored rows
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn get_row(&self, row_id: RowId) -> Result<Option<ContentItem>, StorageError> {
        match self.items.get(row_id.to_be_bytes())? {
            Some(raw) => Ok(Some(serde_json::from_slice(&raw)?)),
            None => Ok(None),
        }
    }

    fn row_ids_for(&self, logical_id: LogicalId) -> Result<Vec<RowId>, StorageError> {
        let mut row_ids = Vec::new();
        for entry in self.index.scan_prefix(logical_id.to_be_bytes()) {
            let (key, _) = entry?;
            row_ids.push(decode_row_id(&key)?);
        }
        Ok(row_ids)
    }
}

#[async_trait]
impl ContentStore for SledContentStore {
    async fn fetch(&self, row_id: RowId) -> Result<Option<ContentItem>, StorageError> {
        self.get_row(row_id)
    }

    async fn query(&self, query: &ContentQuery) -> Result<Vec<ContentItem>, StorageError> {
        let mut matches = Vec::new();
        for row_id in self.row_ids_for(query.logical_id)? {
            // Index entries are written before rows; a missing row is an
            // interrupted save and is skipped.
            if let Some(row) = self.get_row(row_id)? {
                if query.matches(&row) {
                    matches.push(row);
                }
            }
        }
        matches.sort_by_key(|r| (r.number, r.row_id));
        Ok(matches)
    }

    async fn save(&self, item: &ContentItem) -> Result<RowId, StorageError> {
        let mut row = item.clone();
        if row.row_id == 0 {
            // generate_id starts at 0, which is reserved for unsaved rows
            row.row_id = self.db.generate_id()? + 1;
        }

        let value = serde_json::to_vec(&row)?;
        self.index
            .insert(index_key(row.logical_id, row.row_id), &[] as &[u8])?;
        self.items.insert(row.row_id.to_be_bytes(), value)?;
        if self.flush_on_save {
            self.db.flush()?;
        }

        trace!(
            row_id = row.row_id,
            logical_id = row.logical_id,
            number = row.number,
            "Saved content row"
        );
        Ok(row.row_id)
    }
}

fn index_key(logical_id: LogicalId, row_id: RowId) -> [u8; 16] {
    let mut key = [0u8; 16];
    key[..8].copy_from_slice(&logical_id.to_be_bytes());
    key[8..].copy_from_slice(&row_id.to_be_bytes());
    key
}

fn decode_row_id(key: &[u8]) -> Result<RowId, StorageError> {
    let bytes: [u8; 8] = key
        .get(8..16)
        .and_then(|b| b.try_into().ok())
        .ok_or_else(|| {
            StorageError::IoError(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                "Invalid content index key length".to_string(),
            ))
        })?;
    Ok(RowId::from_be_bytes(bytes))
}
