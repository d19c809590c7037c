//! Grouping engine: partitions flat feed items into parent-product groups.
//!
//! Key derivation is strategy-driven (explicit group id, MPN, parent
//! reference, normalized title+brand, identifier prefix, capture regex, or
//! an auto chain). Whatever the strategy yields, every item lands in
//! exactly one group: a null key falls back to the item's own identifier.

use std::collections::HashMap;
use std::str::FromStr;

use regex::Regex;

use crate::error::FeedError;
use crate::mapping::MappingTable;
use crate::resolve::resolve_str;
use crate::text::normalize_key_text;
use crate::types::{FlatItem, Group};

/// How variants are aggregated into parent products.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GroupStrategy {
    /// Explicit group id, else parent reference, else MPN, else id prefix.
    #[default]
    Auto,
    ItemGroupId,
    Mpn,
    Parent,
    TitleBrand,
    IdPrefix,
    Regex,
}

impl FromStr for GroupStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "auto" => Ok(Self::Auto),
            "item_group_id" => Ok(Self::ItemGroupId),
            "mpn" => Ok(Self::Mpn),
            "parent" => Ok(Self::Parent),
            "titlebrand" => Ok(Self::TitleBrand),
            "idprefix" => Ok(Self::IdPrefix),
            "regex" => Ok(Self::Regex),
            other => Err(format!(
                "unknown grouping strategy \"{other}\" (expected auto|item_group_id|mpn|parent|titlebrand|idprefix|regex)"
            )),
        }
    }
}

impl std::fmt::Display for GroupStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Auto => "auto",
            Self::ItemGroupId => "item_group_id",
            Self::Mpn => "mpn",
            Self::Parent => "parent",
            Self::TitleBrand => "titlebrand",
            Self::IdPrefix => "idprefix",
            Self::Regex => "regex",
        };
        f.write_str(s)
    }
}

/// Grouping configuration: the strategy plus the identifier-derivation knobs.
#[derive(Debug, Clone)]
pub struct GroupConfig {
    pub strategy: GroupStrategy,
    /// Separator for `idprefix` derivation.
    pub id_separator: String,
    /// Number of leading segments kept by `idprefix` derivation.
    pub id_parts: usize,
    /// Capture regex for `regex` derivation; group 1 is the key.
    pub id_pattern: Option<Regex>,
}

impl Default for GroupConfig {
    fn default() -> Self {
        Self {
            strategy: GroupStrategy::default(),
            id_separator: "-".to_string(),
            id_parts: 2,
            id_pattern: None,
        }
    }
}

impl GroupConfig {
    /// Compiles `pattern` into the config.
    ///
    /// # Errors
    ///
    /// Returns [`FeedError::InvalidGroupRegex`] when the pattern does not
    /// compile; rejected up front so a typo cannot silently degrade to
    /// prefix grouping mid-run.
    pub fn with_pattern(mut self, pattern: &str) -> Result<Self, FeedError> {
        let compiled = Regex::new(pattern).map_err(|e| FeedError::InvalidGroupRegex {
            pattern: pattern.to_string(),
            source: e,
        })?;
        self.id_pattern = Some(compiled);
        Ok(self)
    }
}

/// Derives a group key from the item identifier: capture regex first (when
/// configured and matching), then the first `id_parts` separator-delimited
/// segments, then the identifier unchanged.
fn base_from_id(id: &str, cfg: &GroupConfig) -> String {
    if let Some(re) = &cfg.id_pattern {
        if let Some(caps) = re.captures(id) {
            if let Some(m) = caps.get(1) {
                return m.as_str().to_string();
            }
        }
    }
    if cfg.id_parts > 0 && !cfg.id_separator.is_empty() {
        let parts: Vec<&str> = id.split(cfg.id_separator.as_str()).collect();
        if parts.len() >= cfg.id_parts {
            return parts[..cfg.id_parts].join(&cfg.id_separator);
        }
    }
    id.to_string()
}

/// Computes the grouping key for one item, or `None` when the strategy
/// cannot derive one. A `"group"` entry in the mapping table short-circuits
/// the strategy chain.
#[must_use]
pub fn compute_group_key(item: &FlatItem, cfg: &GroupConfig, map: &MappingTable) -> Option<String> {
    if let Some(mapped) = resolve_str(item, "group", map, &[]) {
        return Some(mapped.to_string());
    }

    let id = resolve_str(item, "id", map, &["g:id"]).unwrap_or("");
    let igid = resolve_str(item, "item_group_id", map, &["g:item_group_id"]);
    let parent = resolve_str(item, "parent", map, &["g:parent_sku", "g:parent", "g:item_group"]);
    let mpn = resolve_str(item, "mpn", map, &["g:mpn"]);

    match cfg.strategy {
        GroupStrategy::ItemGroupId => igid.map(str::to_string),
        GroupStrategy::Mpn => mpn.map(str::to_string),
        GroupStrategy::Parent => parent.map(str::to_string),
        GroupStrategy::TitleBrand => {
            let title = resolve_str(item, "title", map, &["g:title"]).unwrap_or("");
            let brand = resolve_str(item, "brand", map, &["g:brand"]).unwrap_or("");
            Some(format!(
                "{}|{}",
                normalize_key_text(title),
                normalize_key_text(brand)
            ))
        }
        GroupStrategy::IdPrefix | GroupStrategy::Regex => Some(base_from_id(id, cfg)),
        GroupStrategy::Auto => igid
            .or(parent)
            .or(mpn)
            .map(str::to_string)
            .or_else(|| Some(base_from_id(id, cfg))),
    }
    .filter(|key| !key.is_empty())
}

/// Partitions `items` into groups, preserving feed order: groups appear in
/// order of first occurrence, members in feed order. An item whose strategy
/// yields no key falls back to its own identifier, so nothing is dropped.
#[must_use]
pub fn group_items(items: Vec<FlatItem>, cfg: &GroupConfig, map: &MappingTable) -> Vec<Group> {
    let mut groups: Vec<Group> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for item in items {
        let key = compute_group_key(&item, cfg, map).unwrap_or_else(|| {
            resolve_str(&item, "id", map, &["g:id"])
                .unwrap_or_default()
                .to_string()
        });
        match index.get(&key) {
            Some(&i) => groups[i].variants.push(item),
            None => {
                index.insert(key.clone(), groups.len());
                groups.push(Group {
                    group_id: key,
                    variants: vec![item],
                });
            }
        }
    }

    groups
}
