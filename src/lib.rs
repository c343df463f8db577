//! Folio: Versioned Content Store
//!
//! Stores logical content items as numbered version rows (drafts and a
//! published row), resolves versions through a per-session identity map, and
//! brackets every state change with ordered lifecycle handler phases.

pub mod config;
pub mod definition;
pub mod error;
pub mod handlers;
pub mod ids;
pub mod item;
pub mod logging;
pub mod manager;
pub mod metadata;
pub mod runtime;
pub mod session;
pub mod store;
pub mod types;
pub mod version;

pub use error::{ContentError, StorageError};
pub use handlers::{ContentHandler, HandlerResult};
pub use item::{ContentItem, ItemHandle};
pub use manager::{ContentManager, NewVersion};
pub use runtime::ContentRuntime;
pub use version::VersionOptions;
