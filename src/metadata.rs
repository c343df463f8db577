//! Content Item Metadata
//!
//! Aggregate filled in by handlers during the metadata phase: display text and
//! the route values a presentation layer uses to link to an item.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Ordered route values, e.g. `area`, `controller`, `action`, `id`.
pub type RouteValues = BTreeMap<String, String>;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentItemMetadata {
    pub display_text: Option<String>,
    pub display_route: Option<RouteValues>,
    pub edit_route: Option<RouteValues>,
    pub create_route: Option<RouteValues>,
    pub remove_route: Option<RouteValues>,
}

impl ContentItemMetadata {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Build a [`RouteValues`] map from key/value pairs.
pub fn route_values<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> RouteValues
where
    K: Into<String>,
    V: Into<String>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}
