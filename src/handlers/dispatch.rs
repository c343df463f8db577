//! Phase dispatch with per-handler failure isolation.

use super::{ContentHandler, HandlerResult};
use std::fmt;
use std::sync::Arc;
use tracing::{error, trace};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Activating,
    Activated,
    Initializing,
    Initialized,
    Loading,
    Loaded,
    Creating,
    Created,
    Publishing,
    Published,
    Unpublishing,
    Unpublished,
    Versioning,
    Versioned,
    Removing,
    Removed,
    GetMetadata,
}

impl Phase {
    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Activating => "activating",
            Phase::Activated => "activated",
            Phase::Initializing => "initializing",
            Phase::Initialized => "initialized",
            Phase::Loading => "loading",
            Phase::Loaded => "loaded",
            Phase::Creating => "creating",
            Phase::Created => "created",
            Phase::Publishing => "publishing",
            Phase::Published => "published",
            Phase::Unpublishing => "unpublishing",
            Phase::Unpublished => "unpublished",
            Phase::Versioning => "versioning",
            Phase::Versioned => "versioned",
            Phase::Removing => "removing",
            Phase::Removed => "removed",
            Phase::GetMetadata => "get_metadata",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Run one phase on every handler in order.
///
/// A failing handler is logged and skipped; later handlers still run and
/// whatever earlier handlers did to the context stands.
pub fn invoke<F>(handlers: &[Arc<dyn ContentHandler>], phase: Phase, mut call: F)
where
    F: FnMut(&dyn ContentHandler) -> HandlerResult,
{
    for handler in handlers {
        trace!(phase = %phase, handler = handler.name(), "Invoking content handler");
        if let Err(err) = call(handler.as_ref()) {
            error!(
                phase = %phase,
                handler = handler.name(),
                error = %err,
                "Content handler failed"
            );
        }
    }
}
