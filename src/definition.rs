//! Content Type Definitions
//!
//! Type definitions are owned by the host; the content store only looks them up
//! when fabricating new items and lists them for callers.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// A named part attached to a content type, with free-form settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentTypePartDefinition {
    pub name: String,
    #[serde(default)]
    pub settings: Value,
}

impl ContentTypePartDefinition {
    pub fn display_name(&self) -> Option<&str> {
        self.settings.get("DisplayName").and_then(Value::as_str)
    }

    pub fn description(&self) -> Option<&str> {
        self.settings.get("Description").and_then(Value::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentTypeDefinition {
    pub name: String,
    pub display_name: String,
    #[serde(default)]
    pub parts: Vec<ContentTypePartDefinition>,
    #[serde(default)]
    pub settings: Value,
}

impl ContentTypeDefinition {
    pub fn part(&self, name: &str) -> Option<&ContentTypePartDefinition> {
        self.parts.iter().find(|p| p.name == name)
    }
}

/// Fluent builder for [`ContentTypeDefinition`]
#[derive(Debug, Default)]
pub struct ContentTypeDefinitionBuilder {
    name: String,
    display_name: Option<String>,
    parts: Vec<ContentTypePartDefinition>,
    settings: Map<String, Value>,
}

impl ContentTypeDefinitionBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing definition
    pub fn from_definition(definition: &ContentTypeDefinition) -> Self {
        Self {
            name: definition.name.clone(),
            display_name: Some(definition.display_name.clone()),
            parts: definition.parts.clone(),
            settings: definition.settings.as_object().cloned().unwrap_or_default(),
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }

    pub fn with_part(self, part_name: impl Into<String>) -> Self {
        self.with_part_settings(part_name, Value::Object(Map::new()))
    }

    /// Attach a part, replacing a previously attached part of the same name.
    pub fn with_part_settings(mut self, part_name: impl Into<String>, settings: Value) -> Self {
        let part = ContentTypePartDefinition {
            name: part_name.into(),
            settings,
        };
        match self.parts.iter_mut().find(|p| p.name == part.name) {
            Some(existing) => *existing = part,
            None => self.parts.push(part),
        }
        self
    }

    pub fn remove_part(mut self, part_name: &str) -> Self {
        self.parts.retain(|p| p.name != part_name);
        self
    }

    pub fn with_setting(mut self, name: impl Into<String>, value: Value) -> Self {
        self.settings.insert(name.into(), value);
        self
    }

    pub fn build(self) -> ContentTypeDefinition {
        let display_name = self.display_name.unwrap_or_else(|| self.name.clone());
        ContentTypeDefinition {
            name: self.name,
            display_name,
            parts: self.parts,
            settings: Value::Object(self.settings),
        }
    }
}

/// Type definition lookup port
pub trait ContentDefinitionStore: Send + Sync {
    fn get_type_definition(&self, name: &str) -> Option<ContentTypeDefinition>;
    fn list_type_definitions(&self) -> Vec<ContentTypeDefinition>;
}

/// In-process definition registry
#[derive(Default)]
pub struct MemoryDefinitionStore {
    types: RwLock<BTreeMap<String, ContentTypeDefinition>>,
}

impl MemoryDefinitionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_definitions(definitions: impl IntoIterator<Item = ContentTypeDefinition>) -> Self {
        let store = Self::new();
        for definition in definitions {
            store.store_type_definition(definition);
        }
        store
    }

    pub fn store_type_definition(&self, definition: ContentTypeDefinition) {
        self.types.write().insert(definition.name.clone(), definition);
    }

    pub fn remove_type_definition(&self, name: &str) -> Option<ContentTypeDefinition> {
        self.types.write().remove(name)
    }
}

impl ContentDefinitionStore for MemoryDefinitionStore {
    fn get_type_definition(&self, name: &str) -> Option<ContentTypeDefinition> {
        self.types.read().get(name).cloned()
    }

    fn list_type_definitions(&self) -> Vec<ContentTypeDefinition> {
        self.types.read().values().cloned().collect()
    }
}
