//! Content Session
//!
//! Identity map for one unit of work. Every row materialized during the
//! session is indexed by row id, by (logical id, number) and, while it is
//! published, by logical id. Entries are never evicted; the whole map is
//! dropped with its owning manager.

use crate::item::ItemHandle;
use crate::types::{LogicalId, RowId, VersionNumber};
use std::collections::HashMap;

/// Key under which a cached row can be recalled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionKey {
    Row(RowId),
    Version(LogicalId, VersionNumber),
    Published(LogicalId),
}

#[derive(Default)]
pub struct ContentSession {
    by_row: HashMap<RowId, ItemHandle>,
    by_version: HashMap<(LogicalId, VersionNumber), ItemHandle>,
    by_published: HashMap<LogicalId, ItemHandle>,
}

impl ContentSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index an item under every key it currently derives.
    ///
    /// Unsaved items (row id 0) are not cached.
    pub fn store(&mut self, item: &ItemHandle) {
        let (row_id, logical_id, number, published) = {
            let row = item.read();
            (row.row_id, row.logical_id, row.number, row.published)
        };
        if row_id == 0 {
            return;
        }

        self.by_row.insert(row_id, item.clone());
        self.by_version.insert((logical_id, number), item.clone());
        if published {
            self.by_published.insert(logical_id, item.clone());
        }
    }

    pub fn try_get_by_row_id(&self, row_id: RowId) -> Option<ItemHandle> {
        self.by_row.get(&row_id).cloned()
    }

    pub fn try_get_by_version(
        &self,
        logical_id: LogicalId,
        number: VersionNumber,
    ) -> Option<ItemHandle> {
        self.by_version.get(&(logical_id, number)).cloned()
    }

    /// The cached published row, if it is still published.
    pub fn try_get_by_published(&self, logical_id: LogicalId) -> Option<ItemHandle> {
        self.by_published
            .get(&logical_id)
            .filter(|item| item.is_published())
            .cloned()
    }

    pub fn recall(&self, key: SessionKey) -> Option<ItemHandle> {
        match key {
            SessionKey::Row(row_id) => self.try_get_by_row_id(row_id),
            SessionKey::Version(logical_id, number) => self.try_get_by_version(logical_id, number),
            SessionKey::Published(logical_id) => self.try_get_by_published(logical_id),
        }
    }

    pub fn len(&self) -> usize {
        self.by_row.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_row.is_empty()
    }
}
