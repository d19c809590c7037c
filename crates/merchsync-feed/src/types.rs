//! Flat feed records and grouped variants.
//!
//! A Google Merchant item has no fixed schema: fields vary by namespace
//! prefix (`g:price` vs `price` vs `item_price`) and by per-deployment
//! mapping overrides. [`FlatItem`] therefore stores whatever child elements
//! the feed carried, and all typed access goes through [`crate::resolve`].

use std::collections::BTreeMap;

/// A single field value on a [`FlatItem`].
///
/// Repeated elements (e.g. `g:additional_image_link`) accumulate into
/// `Many`; everything else is `Single`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Single(String),
    Many(Vec<String>),
}

impl FieldValue {
    /// Iterates the value as a flat sequence of strings.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        let slice: &[String] = match self {
            FieldValue::Single(s) => std::slice::from_ref(s),
            FieldValue::Many(v) => v.as_slice(),
        };
        slice.iter().map(String::as_str)
    }

    /// First element with non-blank content, trimmed.
    #[must_use]
    pub fn first_non_blank(&self) -> Option<&str> {
        self.iter().map(str::trim).find(|s| !s.is_empty())
    }

    /// `true` when every element is blank after trimming.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.first_non_blank().is_none()
    }
}

/// One inbound sellable unit: an associative field-name → value record.
/// Immutable once parsing has finished; [`FlatItem::insert`] exists for the
/// parser and for test construction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlatItem {
    fields: BTreeMap<String, FieldValue>,
}

impl FlatItem {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a field value. A repeated key upgrades the entry to
    /// [`FieldValue::Many`], preserving occurrence order.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let value = value.into();
        match self.fields.entry(key.into()) {
            std::collections::btree_map::Entry::Vacant(e) => {
                e.insert(FieldValue::Single(value));
            }
            std::collections::btree_map::Entry::Occupied(mut e) => {
                let slot = e.get_mut();
                match slot {
                    FieldValue::Single(prev) => {
                        let prev = std::mem::take(prev);
                        *slot = FieldValue::Many(vec![prev, value]);
                    }
                    FieldValue::Many(values) => values.push(value),
                }
            }
        }
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.fields.get(key)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// A set of feed items believed to be variants of one parent product.
///
/// `group_id` is the derived grouping key (exact string equality defines
/// membership); `variants` preserve feed order of first appearance.
#[derive(Debug, Clone)]
pub struct Group {
    pub group_id: String,
    pub variants: Vec<FlatItem>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_single_then_get() {
        let mut item = FlatItem::new();
        item.insert("g:id", "SKU100-RED");
        assert_eq!(
            item.get("g:id"),
            Some(&FieldValue::Single("SKU100-RED".to_string()))
        );
    }

    #[test]
    fn repeated_insert_accumulates_in_order() {
        let mut item = FlatItem::new();
        item.insert("g:additional_image_link", "https://a/1.jpg");
        item.insert("g:additional_image_link", "https://a/2.jpg");
        item.insert("g:additional_image_link", "https://a/3.jpg");
        let value = item.get("g:additional_image_link").unwrap();
        let collected: Vec<&str> = value.iter().collect();
        assert_eq!(
            collected,
            vec!["https://a/1.jpg", "https://a/2.jpg", "https://a/3.jpg"]
        );
    }

    #[test]
    fn first_non_blank_skips_blank_entries() {
        let value = FieldValue::Many(vec!["  ".to_string(), " x ".to_string()]);
        assert_eq!(value.first_non_blank(), Some("x"));
    }

    #[test]
    fn blank_when_all_entries_blank() {
        let value = FieldValue::Many(vec![String::new(), "   ".to_string()]);
        assert!(value.is_blank());
        assert!(FieldValue::Single("  ".to_string()).is_blank());
    }
}
