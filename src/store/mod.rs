//! Content Store
//!
//! Persistence port for version rows. Rows are upserted by row id and queried
//! through the (logical id, number, latest, published) index. Rows are never
//! deleted through this port.

pub mod memory;
pub mod persistence;

pub use memory::{MemoryContentStore, WriteRecord};
pub use persistence::SledContentStore;

use crate::error::StorageError;
use crate::item::ContentItem;
use crate::types::{LogicalId, RowId, VersionNumber};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Conjunctive predicate over the version index of one logical item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentQuery {
    pub logical_id: LogicalId,
    pub number: Option<VersionNumber>,
    pub latest: Option<bool>,
    pub published: Option<bool>,
    /// Restrict to rows that are published or latest.
    pub active: bool,
}

impl ContentQuery {
    /// Match every row of a logical item
    pub fn for_item(logical_id: LogicalId) -> Self {
        Self {
            logical_id,
            number: None,
            latest: None,
            published: None,
            active: false,
        }
    }

    pub fn number(mut self, number: VersionNumber) -> Self {
        self.number = Some(number);
        self
    }

    pub fn latest(mut self, latest: bool) -> Self {
        self.latest = Some(latest);
        self
    }

    pub fn published(mut self, published: bool) -> Self {
        self.published = Some(published);
        self
    }

    pub fn active(mut self) -> Self {
        self.active = true;
        self
    }

    pub fn matches(&self, item: &ContentItem) -> bool {
        item.logical_id == self.logical_id
            && self.number.map_or(true, |n| item.number == n)
            && self.latest.map_or(true, |l| item.latest == l)
            && self.published.map_or(true, |p| item.published == p)
            && (!self.active || item.published || item.latest)
    }
}

/// Persistence port consumed by the content manager
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Fetch a single row by its storage id
    async fn fetch(&self, row_id: RowId) -> Result<Option<ContentItem>, StorageError>;

    /// First row matching the query, by ascending version number
    async fn query_first(&self, query: &ContentQuery) -> Result<Option<ContentItem>, StorageError> {
        Ok(self.query(query).await?.into_iter().next())
    }

    /// All rows matching the query, by ascending version number
    async fn query(&self, query: &ContentQuery) -> Result<Vec<ContentItem>, StorageError>;

    /// Upsert a row by row id. A row id of 0 receives a fresh storage id,
    /// which is returned.
    async fn save(&self, item: &ContentItem) -> Result<RowId, StorageError>;
}
