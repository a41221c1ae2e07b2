//! `context.json` manifest types and parsing.
//!
//! Parsing happens in two steps. The body must be valid JSON or the whole
//! request fails. Past that point nothing fails: a missing or mistyped
//! `context` member becomes an empty mapping plus a warning, and a mistyped
//! entry is kept as an [`EntrySlot::Invalid`] so it can be rendered with its
//! error.

use crate::error::{ExplorerError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

/// Warning attached when the manifest lacks a `context` object.
pub const SCHEMA_WARNING: &str =
    "Warning: The context.json file does not follow the expected schema.";

/// One named content-extraction profile.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    #[serde(default)]
    pub summary: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plugin_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_path: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path_patterns: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude_path_patterns: Option<Vec<String>>,
    /// Any JSON number; emitted in its plain decimal form.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_file_size: Option<Number>,
}

/// `extends` accepts a single reference or a list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Extends {
    One(String),
    Many(Vec<String>),
}

/// A manifest entry as read from the document.
#[derive(Debug, Clone, PartialEq)]
pub enum EntrySlot {
    Valid(Entry),
    /// The value under this slug did not match the entry shape.
    Invalid { message: String },
}

/// Parsed `context.json`.
#[derive(Debug, Clone, Default)]
pub struct Manifest {
    pub schema: Option<String>,
    pub extends: Option<Extends>,
    /// Entries keyed by slug, in document order.
    pub context: Vec<(String, EntrySlot)>,
    pub attribution: Option<String>,
    /// Set when the document did not carry a `context` object.
    pub warning: Option<String>,
}

impl Manifest {
    /// Parse a manifest body.
    ///
    /// Fails only when the body is not JSON at all.
    pub fn parse(body: &str) -> Result<Self> {
        let value: Value =
            serde_json::from_str(body).map_err(|e| ExplorerError::ManifestParse {
                message: e.to_string(),
            })?;
        Ok(Self::from_value(value))
    }

    /// Build a manifest from an already-parsed JSON document.
    pub fn from_value(value: Value) -> Self {
        let mut root = match value {
            Value::Object(map) => map,
            _ => return Self::schema_mismatch(),
        };

        let context = match root.remove("context") {
            Some(Value::Object(entries)) => entries,
            _ => return Self::schema_mismatch(),
        };

        Self {
            schema: take_string(&mut root, "$schema"),
            extends: root
                .remove("extends")
                .and_then(|v| serde_json::from_value(v).ok()),
            context: parse_entries(context),
            attribution: take_string(&mut root, "attribution"),
            warning: None,
        }
    }

    fn schema_mismatch() -> Self {
        Self {
            warning: Some(SCHEMA_WARNING.to_string()),
            ..Self::default()
        }
    }

    /// Number of entries, valid or not.
    pub fn len(&self) -> usize {
        self.context.len()
    }

    pub fn is_empty(&self) -> bool {
        self.context.is_empty()
    }
}

fn parse_entries(entries: Map<String, Value>) -> Vec<(String, EntrySlot)> {
    entries
        .into_iter()
        .map(|(slug, value)| {
            let slot = match serde_json::from_value::<Entry>(value) {
                Ok(entry) => EntrySlot::Valid(entry),
                Err(e) => EntrySlot::Invalid {
                    message: e.to_string(),
                },
            };
            (slug, slot)
        })
        .collect()
}

fn take_string(map: &mut Map<String, Value>, key: &str) -> Option<String> {
    match map.remove(key) {
        Some(Value::String(s)) => Some(s),
        _ => None,
    }
}
