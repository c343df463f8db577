//! Version Selection
//!
//! Maps a (logical id, [`VersionOptions`]) request to the session key worth
//! checking first and the storage lookup to fall back to.

use crate::session::SessionKey;
use crate::store::ContentQuery;
use crate::types::{LogicalId, RowId, VersionNumber};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which version of a logical item a request wants. Exactly one mode applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VersionOptions {
    /// A specific stored row
    VersionRecord(RowId),
    /// A specific version number
    Number(VersionNumber),
    /// The latest row, draft or published
    Latest,
    /// The latest row only when it is a draft; never creates one
    Draft,
    /// The latest row, forking a new draft when the latest is published
    DraftRequired,
    /// The published row
    #[default]
    Published,
}

impl VersionOptions {
    pub fn is_published(&self) -> bool {
        matches!(self, VersionOptions::Published)
    }

    pub fn is_latest(&self) -> bool {
        matches!(self, VersionOptions::Latest)
    }

    /// True for both draft modes
    pub fn is_draft(&self) -> bool {
        matches!(self, VersionOptions::Draft | VersionOptions::DraftRequired)
    }

    /// Reads in this mode may write a new draft row
    pub fn is_draft_required(&self) -> bool {
        matches!(self, VersionOptions::DraftRequired)
    }

    pub fn version_number(&self) -> Option<VersionNumber> {
        match self {
            VersionOptions::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn version_record(&self) -> Option<RowId> {
        match self {
            VersionOptions::VersionRecord(id) => Some(*id),
            _ => None,
        }
    }
}

impl fmt::Display for VersionOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VersionOptions::VersionRecord(id) => write!(f, "row:{}", id),
            VersionOptions::Number(n) => write!(f, "number:{}", n),
            VersionOptions::Latest => f.write_str("latest"),
            VersionOptions::Draft => f.write_str("draft"),
            VersionOptions::DraftRequired => f.write_str("draft-required"),
            VersionOptions::Published => f.write_str("published"),
        }
    }
}

/// Storage access needed when the session cache has no answer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup {
    Row(RowId),
    Query(ContentQuery),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VersionSelection {
    /// Session key that short-circuits storage when present
    pub recall: Option<SessionKey>,
    pub lookup: Lookup,
}

/// Resolve the lookup strategy for a request. Pure; touches neither the
/// session nor storage.
pub fn select(logical_id: LogicalId, options: VersionOptions) -> VersionSelection {
    let item = ContentQuery::for_item(logical_id);
    match options {
        VersionOptions::VersionRecord(row_id) => VersionSelection {
            recall: Some(SessionKey::Row(row_id)),
            lookup: Lookup::Row(row_id),
        },
        VersionOptions::Number(number) => VersionSelection {
            recall: Some(SessionKey::Version(logical_id, number)),
            lookup: Lookup::Query(item.number(number)),
        },
        VersionOptions::Latest => VersionSelection {
            recall: None,
            lookup: Lookup::Query(item.latest(true)),
        },
        VersionOptions::Draft => VersionSelection {
            recall: None,
            lookup: Lookup::Query(item.published(false).latest(true)),
        },
        // Whatever is latest; the caller forks it if it turns out to be published
        VersionOptions::DraftRequired => VersionSelection {
            recall: None,
            lookup: Lookup::Query(item.latest(true)),
        },
        VersionOptions::Published => VersionSelection {
            recall: Some(SessionKey::Published(logical_id)),
            lookup: Lookup::Query(item.published(true)),
        },
    }
}
