//! Content Runtime
//!
//! Process-wide wiring of the ports shared by every unit of work: the content
//! store, the logical id allocator, the type definitions and the ordered
//! handler list. Each unit of work gets its own [`ContentManager`] (and with
//! it its own session cache) from [`ContentRuntime::session`].

use crate::config::FolioConfig;
use crate::definition::{ContentDefinitionStore, MemoryDefinitionStore};
use crate::error::ContentError;
use crate::handlers::ContentHandler;
use crate::ids::{IdAllocator, LinearBlockIdAllocator, SequentialIdAllocator};
use crate::manager::ContentManager;
use crate::store::{ContentStore, MemoryContentStore, SledContentStore};
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub struct ContentRuntime {
    store: Arc<dyn ContentStore>,
    definitions: Arc<dyn ContentDefinitionStore>,
    ids: Arc<dyn IdAllocator>,
    handlers: Arc<Vec<Arc<dyn ContentHandler>>>,
}

impl ContentRuntime {
    pub fn new(
        store: Arc<dyn ContentStore>,
        definitions: Arc<dyn ContentDefinitionStore>,
        ids: Arc<dyn IdAllocator>,
    ) -> Self {
        Self {
            store,
            definitions,
            ids,
            handlers: Arc::new(Vec::new()),
        }
    }

    /// Memory store, sequential ids and an empty definition registry
    pub fn in_memory() -> Self {
        Self::new(
            Arc::new(MemoryContentStore::new()),
            Arc::new(MemoryDefinitionStore::new()),
            Arc::new(SequentialIdAllocator::new()),
        )
    }

    /// Open the sled database named by the configuration and wire the sled
    /// store and the block id allocator against it.
    pub fn open(config: &FolioConfig) -> Result<Self, ContentError> {
        config.validate().map_err(|errors| {
            let messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            ContentError::Config(format!(
                "Configuration validation failed:\n{}",
                messages.join("\n")
            ))
        })?;

        let db = sled::open(&config.storage.path).map_err(|e| {
            ContentError::Config(format!(
                "Failed to open content store at {:?}: {}",
                config.storage.path, e
            ))
        })?;
        let store = SledContentStore::new(db.clone())?.flush_on_save(config.storage.flush_on_save);
        let ids = LinearBlockIdAllocator::new(&db, config.identifiers.block_size)?;

        info!(
            path = %config.storage.path.display(),
            block_size = config.identifiers.block_size,
            "Opened content store"
        );
        Ok(Self::new(
            Arc::new(store),
            Arc::new(MemoryDefinitionStore::new()),
            Arc::new(ids),
        ))
    }

    pub fn with_definitions(mut self, definitions: Arc<dyn ContentDefinitionStore>) -> Self {
        self.definitions = definitions;
        self
    }

    /// Append a handler; handlers run in registration order.
    pub fn with_handler(mut self, handler: Arc<dyn ContentHandler>) -> Self {
        Arc::make_mut(&mut self.handlers).push(handler);
        self
    }

    pub fn store(&self) -> &Arc<dyn ContentStore> {
        &self.store
    }

    pub fn definitions(&self) -> &Arc<dyn ContentDefinitionStore> {
        &self.definitions
    }

    /// Begin a unit of work with a fresh session cache
    pub fn session(&self) -> ContentManager {
        ContentManager::new(
            Arc::clone(&self.store),
            Arc::clone(&self.definitions),
            Arc::clone(&self.ids),
            Arc::clone(&self.handlers),
        )
    }
}
