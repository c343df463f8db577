//! Per-phase handler contexts.

use crate::definition::ContentTypeDefinition;
use crate::item::{ContentItemBuilder, ItemHandle};
use crate::metadata::ContentItemMetadata;
use crate::session::ContentSession;

/// Before the item exists: handlers weld aspects onto the builder.
#[derive(Debug)]
pub struct ActivatingContentContext {
    pub content_type: String,
    pub definition: ContentTypeDefinition,
    pub builder: ContentItemBuilder,
}

#[derive(Debug)]
pub struct ActivatedContentContext {
    pub content_type: String,
    pub item: ItemHandle,
}

/// Shared by the Initializing and Initialized phases
#[derive(Debug)]
pub struct InitializingContentContext {
    pub content_type: String,
    pub item: ItemHandle,
}

/// Loading and Loaded phases.
///
/// The item is already in the session when handlers run, so a handler that
/// follows a reference back to this row finds the partially loaded instance
/// in `session` instead of loading it again.
pub struct LoadContentContext<'a> {
    pub item: ItemHandle,
    pub session: &'a ContentSession,
}

#[derive(Debug)]
pub struct CreateContentContext {
    pub item: ItemHandle,
}

/// Publishing, Published, Unpublishing and Unpublished phases
#[derive(Debug)]
pub struct PublishContentContext {
    /// The item the operation was invoked on
    pub item: ItemHandle,
    /// The row becoming published; `None` while unpublishing
    pub publishing: Option<ItemHandle>,
    /// The row that was published before the operation, if any
    pub previous: Option<ItemHandle>,
    /// Set by a Publishing handler to abort the publish
    pub cancel: bool,
}

impl PublishContentContext {
    pub fn new(item: ItemHandle, previous: Option<ItemHandle>) -> Self {
        Self {
            publishing: Some(item.clone()),
            item,
            previous,
            cancel: false,
        }
    }
}

#[derive(Debug)]
pub struct VersionContentContext {
    pub content_type: String,
    pub existing: ItemHandle,
    pub building: ItemHandle,
}

#[derive(Debug)]
pub struct RemoveContentContext {
    pub item: ItemHandle,
}

#[derive(Debug)]
pub struct ContentItemMetadataContext {
    pub item: ItemHandle,
    pub metadata: ContentItemMetadata,
}
