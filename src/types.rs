//! Identifier types shared across the content store.

/// Storage-assigned handle of one persisted version row. `0` means "not yet persisted".
pub type RowId = u64;

/// Stable identifier shared by every version of one logical content item.
/// `0` means "not yet assigned".
pub type LogicalId = u64;

/// Ordering key among sibling versions. `0` means "never versioned".
pub type VersionNumber = u32;
