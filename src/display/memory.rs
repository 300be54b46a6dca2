//! In-memory display surface, also used for JSON output

use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};

use super::{DisplayField, DisplaySurface};

/// Field map with an optional allowlist of fields the surface carries
#[derive(Debug, Default, Clone)]
pub struct MemorySurface {
    fields: BTreeMap<DisplayField, String>,
    allowed: Option<BTreeSet<DisplayField>>,
}

impl MemorySurface {
    /// A surface carrying every field
    pub fn new() -> Self {
        Self::default()
    }

    /// A surface carrying only the given fields
    pub fn with_fields(fields: impl IntoIterator<Item = DisplayField>) -> Self {
        Self {
            fields: BTreeMap::new(),
            allowed: Some(fields.into_iter().collect()),
        }
    }

    pub fn get(&self, field: DisplayField) -> Option<&str> {
        self.fields.get(&field).map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Fields as a `{ "field_id": "text" }` object
    pub fn to_json(&self) -> Value {
        let map: Map<String, Value> = self
            .fields
            .iter()
            .map(|(field, text)| (field.id().to_string(), Value::String(text.clone())))
            .collect();
        Value::Object(map)
    }
}

impl DisplaySurface for MemorySurface {
    fn set(&mut self, field: DisplayField, text: String) -> bool {
        if let Some(allowed) = &self.allowed {
            if !allowed.contains(&field) {
                return false;
            }
        }
        self.fields.insert(field, text);
        true
    }
}
