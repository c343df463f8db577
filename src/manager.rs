//! Content Manager
//!
//! Orchestrates version resolution, creation and state transitions of content
//! items for one unit of work. Each manager owns its [`ContentSession`], so
//! rows loaded through it are shared instances for the lifetime of the
//! manager. Every transition is bracketed by handler phases.

use crate::definition::{ContentDefinitionStore, ContentTypeDefinition, ContentTypeDefinitionBuilder};
use crate::error::ContentError;
use crate::handlers::{
    invoke, ActivatedContentContext, ActivatingContentContext, ContentHandler,
    ContentItemMetadataContext, CreateContentContext, InitializingContentContext,
    LoadContentContext, Phase, PublishContentContext, RemoveContentContext, VersionContentContext,
};
use crate::ids::IdAllocator;
use crate::item::{ContentItem, ContentItemBuilder, ItemHandle};
use crate::metadata::ContentItemMetadata;
use crate::session::ContentSession;
use crate::store::{ContentQuery, ContentStore};
use crate::types::{LogicalId, RowId};
use crate::version::{self, Lookup, VersionOptions};
use std::sync::Arc;
use tracing::{debug, instrument, trace};

/// Result of forking a new version from an existing row.
///
/// Neither row is persisted yet; the caller saves both.
#[derive(Debug, Clone)]
pub struct NewVersion {
    /// The new latest row
    pub building: ItemHandle,
    /// The former latest row, already demoted in memory
    pub previous_latest: Option<ItemHandle>,
}

pub struct ContentManager {
    store: Arc<dyn ContentStore>,
    definitions: Arc<dyn ContentDefinitionStore>,
    ids: Arc<dyn IdAllocator>,
    handlers: Arc<Vec<Arc<dyn ContentHandler>>>,
    session: ContentSession,
}

impl ContentManager {
    pub fn new(
        store: Arc<dyn ContentStore>,
        definitions: Arc<dyn ContentDefinitionStore>,
        ids: Arc<dyn IdAllocator>,
        handlers: Arc<Vec<Arc<dyn ContentHandler>>>,
    ) -> Self {
        Self {
            store,
            definitions,
            ids,
            handlers,
            session: ContentSession::new(),
        }
    }

    pub fn session(&self) -> &ContentSession {
        &self.session
    }

    pub fn handlers(&self) -> &[Arc<dyn ContentHandler>] {
        &self.handlers
    }

    pub fn list_type_definitions(&self) -> Vec<ContentTypeDefinition> {
        self.definitions.list_type_definitions()
    }

    /// Build a new, unsaved item of the given type.
    ///
    /// Unknown types get a definition carrying only their name. The item
    /// receives a fresh logical id but no row id and no version number.
    pub fn new_item(&self, content_type: &str) -> Result<ItemHandle, ContentError> {
        let definition = self
            .definitions
            .get_type_definition(content_type)
            .unwrap_or_else(|| ContentTypeDefinitionBuilder::new().named(content_type).build());

        let mut activating = ActivatingContentContext {
            content_type: definition.name.clone(),
            builder: ContentItemBuilder::new(definition.clone()),
            definition,
        };
        invoke(&self.handlers, Phase::Activating, |h| h.activating(&mut activating));

        let item = ItemHandle::new(activating.builder.build());
        let logical_id = self.ids.next_id()?;
        item.write().logical_id = logical_id;

        let mut activated = ActivatedContentContext {
            content_type: content_type.to_string(),
            item,
        };
        invoke(&self.handlers, Phase::Activated, |h| h.activated(&mut activated));

        let mut initializing = InitializingContentContext {
            content_type: activated.content_type,
            item: activated.item,
        };
        invoke(&self.handlers, Phase::Initializing, |h| {
            h.initializing(&mut initializing)
        });
        invoke(&self.handlers, Phase::Initialized, |h| {
            h.initialized(&mut initializing)
        });

        debug!(logical_id, content_type, "Activated new content item");
        Ok(initializing.item)
    }

    /// The published version of a logical item
    pub async fn get_published(
        &mut self,
        logical_id: LogicalId,
    ) -> Result<Option<ItemHandle>, ContentError> {
        self.get(logical_id, VersionOptions::Published).await
    }

    /// Resolve one version of a logical item.
    ///
    /// Returns `Ok(None)` when no row matches. With
    /// [`VersionOptions::DraftRequired`] a published latest row is forked into
    /// a new draft, and both rows are written.
    #[instrument(skip(self))]
    pub async fn get(
        &mut self,
        logical_id: LogicalId,
        options: VersionOptions,
    ) -> Result<Option<ItemHandle>, ContentError> {
        let selection = version::select(logical_id, options);

        if let Some(key) = selection.recall {
            if let Some(item) = self.session.recall(key) {
                trace!(?key, "Recalled content item from session");
                return Ok(Some(item));
            }
        }

        let found = match selection.lookup {
            Lookup::Row(row_id) => self.store.fetch(row_id).await?,
            Lookup::Query(query) => self.store.query_first(&query).await?,
        };
        let Some(found) = found else {
            debug!("No content item version matched");
            return Ok(None);
        };

        let item = match self.session.try_get_by_row_id(found.row_id) {
            Some(recalled) => recalled,
            None => {
                let item = ItemHandle::new(found);
                // Cached before loading so that handlers following references
                // back to this row see this instance.
                self.session.store(&item);
                self.load(&item);
                item
            }
        };

        if !options.is_draft_required() {
            return Ok(Some(item));
        }

        if item.is_published() {
            let NewVersion {
                building,
                previous_latest,
            } = self.build_new_version(&item).await?;

            self.save(&item).await?;
            if let Some(previous) = previous_latest.filter(|p| !p.ptr_eq(&item)) {
                self.save(&previous).await?;
            }
            self.save(&building).await?;
            self.session.store(&building);

            debug!(
                row_id = building.row_id(),
                number = building.number(),
                "Materialized draft from published version"
            );
            return Ok(Some(building));
        }

        self.save(&item).await?;
        Ok(Some(item))
    }

    /// Fork a new latest version from `existing`.
    ///
    /// The current latest row (if any) is demoted in memory and the new row
    /// takes the next version number. Nothing is written.
    #[instrument(skip(self, existing), fields(logical_id = existing.logical_id()))]
    pub async fn build_new_version(
        &mut self,
        existing: &ItemHandle,
    ) -> Result<NewVersion, ContentError> {
        let (content_type, logical_id, is_latest) = {
            let row = existing.read();
            (row.content_type.clone(), row.logical_id, row.latest)
        };

        let building = self.new_item(&content_type)?;

        let previous_latest = if is_latest {
            Some(existing.clone())
        } else {
            let query = ContentQuery::for_item(logical_id).latest(true);
            self.store
                .query_first(&query)
                .await?
                .map(|row| self.adopt(row))
        };

        let number = match &previous_latest {
            Some(latest) => {
                let mut row = latest.write();
                row.latest = false;
                row.number + 1
            }
            None => 1,
        };

        {
            let mut row = building.write();
            row.logical_id = logical_id;
            row.number = number;
            row.latest = true;
        }

        let mut context = VersionContentContext {
            content_type,
            existing: existing.clone(),
            building,
        };
        invoke(&self.handlers, Phase::Versioning, |h| h.versioning(&mut context));
        invoke(&self.handlers, Phase::Versioned, |h| h.versioned(&mut context));

        debug!(number, "Built new content item version");
        Ok(NewVersion {
            building: context.building,
            previous_latest,
        })
    }

    /// Persist a new item.
    ///
    /// An unversioned item becomes version 1, latest and published.
    /// `Number(n)` overrides the number, the draft modes clear `published`, and
    /// `Published` additionally runs the publish phases (there is no previous
    /// row to demote on first publish).
    #[instrument(skip(self, item), fields(logical_id = item.logical_id()))]
    pub async fn create(
        &mut self,
        item: &ItemHandle,
        options: VersionOptions,
    ) -> Result<(), ContentError> {
        {
            let mut row = item.write();
            if row.number == 0 {
                row.number = 1;
                row.latest = true;
                row.published = true;
            }
            if let Some(number) = options.version_number() {
                row.number = number;
            }
            if options.is_draft() {
                row.published = false;
            }
        }

        let mut context = CreateContentContext { item: item.clone() };
        invoke(&self.handlers, Phase::Creating, |h| h.creating(&mut context));
        invoke(&self.handlers, Phase::Created, |h| h.created(&mut context));

        if options.is_published() {
            let mut publish = PublishContentContext::new(item.clone(), None);
            invoke(&self.handlers, Phase::Publishing, |h| h.publishing(&mut publish));
            if publish.cancel {
                debug!("Publishing cancel ignored on create");
            }
            invoke(&self.handlers, Phase::Published, |h| h.published(&mut publish));
        }

        let row_id = self.save(item).await?;
        self.session.store(item);

        debug!(row_id, number = item.number(), "Created content item");
        Ok(())
    }

    /// Make `item` the published version of its logical item.
    ///
    /// No-op when it already is. A Publishing handler may cancel, in which case
    /// nothing is written and Published does not run. The previously published
    /// row is written before `item`.
    #[instrument(skip(self, item), fields(logical_id = item.logical_id(), row_id = item.row_id()))]
    pub async fn publish(&mut self, item: &ItemHandle) -> Result<(), ContentError> {
        if item.is_published() {
            return Ok(());
        }

        let query = ContentQuery::for_item(item.logical_id()).published(true);
        let previous = self
            .store
            .query_first(&query)
            .await?
            .map(|row| self.adopt(row));

        let mut context = PublishContentContext::new(item.clone(), previous.clone());
        invoke(&self.handlers, Phase::Publishing, |h| h.publishing(&mut context));

        if context.cancel {
            debug!("Publish canceled by handler");
            return Ok(());
        }

        if let Some(previous) = &previous {
            previous.write().published = false;
            self.save(previous).await?;
            self.refresh(previous);
        }

        item.write().published = true;
        self.save(item).await?;
        self.refresh(item);

        invoke(&self.handlers, Phase::Published, |h| h.published(&mut context));

        debug!(number = item.number(), "Published content item");
        Ok(())
    }

    /// Withdraw the published version of `item`'s logical item.
    ///
    /// The published row is found from `item` itself or via a published
    /// lookup; without one nothing happens. The published row's flag is
    /// cleared, but the row written is `item`.
    #[instrument(skip(self, item), fields(logical_id = item.logical_id(), row_id = item.row_id()))]
    pub async fn unpublish(&mut self, item: &ItemHandle) -> Result<(), ContentError> {
        let published = if item.is_published() {
            Some(item.clone())
        } else {
            self.get(item.logical_id(), VersionOptions::Published).await?
        };

        let Some(published) = published else {
            debug!("No published version to unpublish");
            return Ok(());
        };

        let mut context = PublishContentContext {
            item: item.clone(),
            publishing: None,
            previous: Some(published.clone()),
            cancel: false,
        };
        invoke(&self.handlers, Phase::Unpublishing, |h| {
            h.unpublishing(&mut context)
        });

        published.write().published = false;
        self.save(item).await?;

        invoke(&self.handlers, Phase::Unpublished, |h| {
            h.unpublished(&mut context)
        });

        debug!(unpublished_row = published.row_id(), "Unpublished content item");
        Ok(())
    }

    /// Retire a logical item: every published or latest row loses both flags.
    /// Rows stay in storage.
    #[instrument(skip(self, item), fields(logical_id = item.logical_id()))]
    pub async fn remove(&mut self, item: &ItemHandle) -> Result<(), ContentError> {
        let query = ContentQuery::for_item(item.logical_id()).active();
        let versions: Vec<ItemHandle> = self
            .store
            .query(&query)
            .await?
            .into_iter()
            .map(|row| self.adopt(row))
            .collect();

        let mut context = RemoveContentContext { item: item.clone() };
        invoke(&self.handlers, Phase::Removing, |h| h.removing(&mut context));

        for version in &versions {
            {
                let mut row = version.write();
                row.published = false;
                row.latest = false;
            }
            self.save(version).await?;
        }

        invoke(&self.handlers, Phase::Removed, |h| h.removed(&mut context));

        debug!(versions = versions.len(), "Removed content item");
        Ok(())
    }

    /// Let handlers describe an item (display text, routes).
    pub fn get_metadata(&self, item: &ItemHandle) -> ContentItemMetadata {
        let mut context = ContentItemMetadataContext {
            item: item.clone(),
            metadata: ContentItemMetadata::new(),
        };
        invoke(&self.handlers, Phase::GetMetadata, |h| {
            h.get_content_item_metadata(&mut context)
        });
        context.metadata
    }

    fn load(&self, item: &ItemHandle) {
        let mut context = LoadContentContext {
            item: item.clone(),
            session: &self.session,
        };
        invoke(&self.handlers, Phase::Loading, |h| h.loading(&mut context));
        invoke(&self.handlers, Phase::Loaded, |h| h.loaded(&mut context));
    }

    /// Prefer the session's instance of a row fetched from storage.
    fn adopt(&self, row: ContentItem) -> ItemHandle {
        self.session
            .try_get_by_row_id(row.row_id)
            .unwrap_or_else(|| ItemHandle::new(row))
    }

    /// Re-index a row the session already holds after its flags changed.
    fn refresh(&mut self, item: &ItemHandle) {
        let cached = self
            .session
            .try_get_by_row_id(item.row_id())
            .is_some_and(|c| c.ptr_eq(item));
        if cached {
            self.session.store(item);
        }
    }

    async fn save(&self, item: &ItemHandle) -> Result<RowId, ContentError> {
        let snapshot = item.snapshot();
        let row_id = self.store.save(&snapshot).await?;
        if snapshot.row_id != row_id {
            item.write().row_id = row_id;
        }
        trace!(
            row_id,
            number = snapshot.number,
            latest = snapshot.latest,
            published = snapshot.published,
            "Saved content item"
        );
        Ok(row_id)
    }
}
