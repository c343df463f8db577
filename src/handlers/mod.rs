//! Lifecycle Handlers
//!
//! Extensions observe and shape content items by implementing
//! [`ContentHandler`]. The manager invokes one method per lifecycle phase on
//! every registered handler, in registration order. All methods default to
//! no-ops, so a handler only overrides the phases it cares about.

mod context;
mod dispatch;

pub use context::{
    ActivatedContentContext, ActivatingContentContext, ContentItemMetadataContext,
    CreateContentContext, InitializingContentContext, LoadContentContext, PublishContentContext,
    RemoveContentContext, VersionContentContext,
};
pub use dispatch::{invoke, Phase};

/// Outcome of one handler invocation. Failures are logged and never abort the phase.
pub type HandlerResult = anyhow::Result<()>;

#[allow(unused_variables)]
pub trait ContentHandler: Send + Sync {
    /// Name used when logging failures
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    fn activating(&self, context: &mut ActivatingContentContext) -> HandlerResult {
        Ok(())
    }

    fn activated(&self, context: &mut ActivatedContentContext) -> HandlerResult {
        Ok(())
    }

    fn initializing(&self, context: &mut InitializingContentContext) -> HandlerResult {
        Ok(())
    }

    fn initialized(&self, context: &mut InitializingContentContext) -> HandlerResult {
        Ok(())
    }

    fn loading(&self, context: &mut LoadContentContext<'_>) -> HandlerResult {
        Ok(())
    }

    fn loaded(&self, context: &mut LoadContentContext<'_>) -> HandlerResult {
        Ok(())
    }

    fn creating(&self, context: &mut CreateContentContext) -> HandlerResult {
        Ok(())
    }

    fn created(&self, context: &mut CreateContentContext) -> HandlerResult {
        Ok(())
    }

    /// May veto the publish by setting `context.cancel`
    fn publishing(&self, context: &mut PublishContentContext) -> HandlerResult {
        Ok(())
    }

    fn published(&self, context: &mut PublishContentContext) -> HandlerResult {
        Ok(())
    }

    /// `context.publishing` is `None`: the published row is being withdrawn, not replaced
    fn unpublishing(&self, context: &mut PublishContentContext) -> HandlerResult {
        Ok(())
    }

    fn unpublished(&self, context: &mut PublishContentContext) -> HandlerResult {
        Ok(())
    }

    fn versioning(&self, context: &mut VersionContentContext) -> HandlerResult {
        Ok(())
    }

    fn versioned(&self, context: &mut VersionContentContext) -> HandlerResult {
        Ok(())
    }

    fn removing(&self, context: &mut RemoveContentContext) -> HandlerResult {
        Ok(())
    }

    fn removed(&self, context: &mut RemoveContentContext) -> HandlerResult {
        Ok(())
    }

    fn get_content_item_metadata(&self, context: &mut ContentItemMetadataContext) -> HandlerResult {
        Ok(())
    }
}
