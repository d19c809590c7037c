//! Per-deployment field-mapping overrides (`--map map.json`).
//!
//! The mapping file is a JSON object whose values are ordered candidate-key
//! lists: `{"sku": ["g:custom_sku", "my_sku"], "group": ["g:series"]}`.
//! Two keys are special: `"tags"` holds tag templates rendered by the group
//! mapper (`"Linea:${brand}"`), and `"group"` short-circuits the grouping
//! strategy chain entirely.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::error::FeedError;

static PLACEHOLDER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{(\w+)\}").expect("valid placeholder regex"));

/// Ordered candidate-key overrides for logical field names.
#[derive(Debug, Clone, Default)]
pub struct MappingTable {
    entries: HashMap<String, Vec<String>>,
}

impl MappingTable {
    /// Parses a mapping table from the JSON text of a `--map` file.
    ///
    /// # Errors
    ///
    /// Returns [`FeedError::MappingFile`] when the text is not a JSON object
    /// of string arrays.
    pub fn from_json_str(json: &str, path: &str) -> Result<Self, FeedError> {
        let entries: HashMap<String, Vec<String>> =
            serde_json::from_str(json).map_err(|e| FeedError::MappingFile {
                path: path.to_string(),
                reason: e.to_string(),
            })?;
        Ok(Self { entries })
    }

    /// Loads and parses a mapping file from disk.
    ///
    /// # Errors
    ///
    /// Returns [`FeedError::MappingFile`] on read or parse failure.
    pub fn load(path: &str) -> Result<Self, FeedError> {
        let json = std::fs::read_to_string(path).map_err(|e| FeedError::MappingFile {
            path: path.to_string(),
            reason: e.to_string(),
        })?;
        Self::from_json_str(&json, path)
    }

    /// Override candidate keys for `logical`, if the table has an entry.
    #[must_use]
    pub fn candidates(&self, logical: &str) -> Option<&[String]> {
        self.entries.get(logical).map(Vec::as_slice)
    }

    /// Tag templates from the reserved `"tags"` entry; empty when absent.
    #[must_use]
    pub fn tag_templates(&self) -> &[String] {
        self.entries.get("tags").map_or(&[], Vec::as_slice)
    }
}

/// Renders tag templates by substituting `${name}` placeholders from
/// `values`; unknown placeholders render as empty, and fully-empty renders
/// are dropped.
#[must_use]
pub fn render_tag_templates(templates: &[String], values: &HashMap<&str, &str>) -> Vec<String> {
    templates
        .iter()
        .map(|t| {
            PLACEHOLDER_RE
                .replace_all(t, |caps: &Captures<'_>| {
                    values.get(&caps[1]).copied().unwrap_or("")
                })
                .into_owned()
        })
        .filter(|rendered| !rendered.is_empty())
        .collect()
}
