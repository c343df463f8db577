//! Content Items
//!
//! A `ContentItem` is one stored version row of a logical item. Rows of the same
//! logical item share a `logical_id` and are ordered by `number`. The dynamic
//! payload is a map of aspect name to structured JSON, filled in by handlers
//! while the item is activated or loaded.

use crate::definition::ContentTypeDefinition;
use crate::error::ContentError;
use crate::types::{LogicalId, RowId, VersionNumber};
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// One persisted (or about to be persisted) version row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentItem {
    pub row_id: RowId,
    pub logical_id: LogicalId,
    pub number: VersionNumber,
    pub latest: bool,
    pub published: bool,
    pub content_type: String,
    #[serde(default)]
    pub aspects: BTreeMap<String, Value>,
}

impl ContentItem {
    /// Create an unsaved, unversioned item of the given type
    pub fn new(content_type: impl Into<String>) -> Self {
        Self {
            row_id: 0,
            logical_id: 0,
            number: 0,
            latest: false,
            published: false,
            content_type: content_type.into(),
            aspects: BTreeMap::new(),
        }
    }

    /// A draft is a latest row that is not published.
    pub fn is_draft(&self) -> bool {
        self.latest && !self.published
    }

    pub fn is_persisted(&self) -> bool {
        self.row_id != 0
    }

    pub fn has_aspect(&self, name: &str) -> bool {
        self.aspects.contains_key(name)
    }

    /// Attach a raw aspect value, replacing any previous value under the same name.
    pub fn weld(&mut self, name: impl Into<String>, value: Value) {
        self.aspects.insert(name.into(), value);
    }

    pub fn remove_aspect(&mut self, name: &str) -> Option<Value> {
        self.aspects.remove(name)
    }

    /// Read an aspect as a typed value.
    ///
    /// Returns `Ok(None)` when the aspect is absent and an error when it is
    /// present but does not match `T`.
    pub fn aspect<T: DeserializeOwned>(&self, name: &str) -> Result<Option<T>, ContentError> {
        match self.aspects.get(name) {
            Some(value) => serde_json::from_value(value.clone())
                .map(Some)
                .map_err(|e| ContentError::Aspect {
                    name: name.to_string(),
                    message: e.to_string(),
                }),
            None => Ok(None),
        }
    }

    /// Store a typed value as an aspect.
    pub fn set_aspect<T: Serialize>(&mut self, name: &str, value: &T) -> Result<(), ContentError> {
        let value = serde_json::to_value(value).map_err(|e| ContentError::Aspect {
            name: name.to_string(),
            message: e.to_string(),
        })?;
        self.weld(name, value);
        Ok(())
    }
}

/// Shared, mutable reference to a content item within one session.
///
/// Cloning a handle does not clone the item; two handles are the same item
/// when [`ItemHandle::ptr_eq`] holds.
#[derive(Clone)]
pub struct ItemHandle(Arc<RwLock<ContentItem>>);

impl ItemHandle {
    pub fn new(item: ContentItem) -> Self {
        Self(Arc::new(RwLock::new(item)))
    }

    pub fn read(&self) -> RwLockReadGuard<'_, ContentItem> {
        self.0.read()
    }

    pub fn write(&self) -> RwLockWriteGuard<'_, ContentItem> {
        self.0.write()
    }

    /// Clone the current state of the row, e.g. to hand it to storage.
    pub fn snapshot(&self) -> ContentItem {
        self.0.read().clone()
    }

    pub fn ptr_eq(&self, other: &ItemHandle) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    pub fn row_id(&self) -> RowId {
        self.0.read().row_id
    }

    pub fn logical_id(&self) -> LogicalId {
        self.0.read().logical_id
    }

    pub fn number(&self) -> VersionNumber {
        self.0.read().number
    }

    pub fn is_latest(&self) -> bool {
        self.0.read().latest
    }

    pub fn is_published(&self) -> bool {
        self.0.read().published
    }

    pub fn content_type(&self) -> String {
        self.0.read().content_type.clone()
    }
}

impl fmt::Debug for ItemHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ItemHandle").field(&*self.0.read()).finish()
    }
}

impl From<ContentItem> for ItemHandle {
    fn from(item: ContentItem) -> Self {
        ItemHandle::new(item)
    }
}

/// Assembles a new item for a type definition.
///
/// Activating handlers receive the builder and weld the aspects the type needs
/// before the item is built.
#[derive(Debug, Clone)]
pub struct ContentItemBuilder {
    definition: ContentTypeDefinition,
    item: ContentItem,
}

impl ContentItemBuilder {
    pub fn new(definition: ContentTypeDefinition) -> Self {
        let item = ContentItem::new(definition.name.clone());
        Self { definition, item }
    }

    pub fn definition(&self) -> &ContentTypeDefinition {
        &self.definition
    }

    pub fn weld(&mut self, name: impl Into<String>, value: Value) -> &mut Self {
        self.item.weld(name, value);
        self
    }

    pub fn has_aspect(&self, name: &str) -> bool {
        self.item.has_aspect(name)
    }

    pub fn build(self) -> ContentItem {
        self.item
    }
}
