//! Ordered-candidate field resolution.
//!
//! Every component that needs a field off a [`FlatItem`] goes through
//! [`resolve_value`]/[`resolve_str`] — nothing reads the record map
//! directly. A logical name first consults the [`MappingTable`] override
//! list, then the caller's default candidate keys. A candidate prefixed
//! `g:` is a namespaced lookup that tolerates feeds which drop or rewrite
//! the namespace: `g:price` tries `g:price`, `price`, `item_price`.

use crate::mapping::MappingTable;
use crate::types::{FieldValue, FlatItem};

/// Namespaced lookup: `g:<key>`, bare `<key>`, `item_<key>`, first present wins.
fn namespaced<'a>(item: &'a FlatItem, key: &str) -> Option<&'a FieldValue> {
    item.get(&format!("g:{key}"))
        .or_else(|| item.get(key))
        .or_else(|| item.get(&format!("item_{key}")))
}

/// Looks up one candidate key against the record.
fn by_key<'a>(item: &'a FlatItem, key: &str) -> Option<&'a FieldValue> {
    if let Some(bare) = key.strip_prefix("g:") {
        return namespaced(item, bare);
    }
    item.get(key)
        .or_else(|| item.get(&key.to_lowercase()))
        .or_else(|| item.get(&key.to_uppercase()))
}

/// Resolves `logical` to its raw field value.
///
/// Tries the mapping-table override keys for `logical` when present,
/// otherwise `default_keys`, in order; the first candidate whose value is
/// non-blank wins.
#[must_use]
pub fn resolve_value<'a>(
    item: &'a FlatItem,
    logical: &str,
    map: &MappingTable,
    default_keys: &[&str],
) -> Option<&'a FieldValue> {
    if let Some(overrides) = map.candidates(logical) {
        for key in overrides {
            if let Some(value) = by_key(item, key) {
                if !value.is_blank() {
                    return Some(value);
                }
            }
        }
        return None;
    }
    for key in default_keys {
        if let Some(value) = by_key(item, key) {
            if !value.is_blank() {
                return Some(value);
            }
        }
    }
    None
}

/// Resolves `logical` to a trimmed scalar string.
///
/// Multi-valued fields resolve through their first non-blank element.
#[must_use]
pub fn resolve_str<'a>(
    item: &'a FlatItem,
    logical: &str,
    map: &MappingTable,
    default_keys: &[&str],
) -> Option<&'a str> {
    resolve_value(item, logical, map, default_keys).and_then(FieldValue::first_non_blank)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(pairs: &[(&str, &str)]) -> FlatItem {
        let mut it = FlatItem::new();
        for (k, v) in pairs {
            it.insert(*k, *v);
        }
        it
    }

    fn empty_map() -> MappingTable {
        MappingTable::default()
    }

    #[test]
    fn default_candidates_tried_in_order() {
        let it = item(&[("g:sale_price", "EUR 10"), ("g:price", "EUR 20")]);
        let got = resolve_str(&it, "price", &empty_map(), &["g:sale_price", "g:price"]);
        assert_eq!(got, Some("EUR 10"));
    }

    #[test]
    fn blank_candidate_falls_through_to_next() {
        let it = item(&[("g:sale_price", "   "), ("g:price", "EUR 20")]);
        let got = resolve_str(&it, "price", &empty_map(), &["g:sale_price", "g:price"]);
        assert_eq!(got, Some("EUR 20"));
    }

    #[test]
    fn namespaced_candidate_tries_bare_and_item_spellings() {
        let bare = item(&[("price", "5")]);
        assert_eq!(resolve_str(&bare, "price", &empty_map(), &["g:price"]), Some("5"));

        let prefixed = item(&[("item_price", "7")]);
        assert_eq!(
            resolve_str(&prefixed, "price", &empty_map(), &["g:price"]),
            Some("7")
        );
    }

    #[test]
    fn override_table_replaces_default_chain() {
        let it = item(&[("my_sku", "ABC-1"), ("g:mpn", "MPN-9")]);
        let map = MappingTable::from_json_str(r#"{"sku": ["my_sku"]}"#, "map.json").unwrap();
        assert_eq!(resolve_str(&it, "sku", &map, &["g:mpn"]), Some("ABC-1"));
    }

    #[test]
    fn override_table_entry_exhausted_does_not_fall_back_to_defaults() {
        // An explicit (but unmatched) override list wins over the default chain.
        let it = item(&[("g:mpn", "MPN-9")]);
        let map = MappingTable::from_json_str(r#"{"sku": ["my_sku"]}"#, "map.json").unwrap();
        assert_eq!(resolve_str(&it, "sku", &map, &["g:mpn"]), None);
    }

    #[test]
    fn case_insensitive_direct_key_lookup() {
        let it = item(&[("SKU", "X-1")]);
        assert_eq!(resolve_str(&it, "sku", &empty_map(), &["sku"]), Some("X-1"));
    }

    #[test]
    fn missing_everywhere_resolves_to_none() {
        let it = item(&[("g:title", "Anvil")]);
        assert_eq!(resolve_str(&it, "sku", &empty_map(), &["g:sku"]), None);
    }

    #[test]
    fn multi_valued_field_resolves_first_non_blank_element() {
        let mut it = FlatItem::new();
        it.insert("g:additional_image_link", "  ");
        it.insert("g:additional_image_link", "https://a/2.jpg");
        assert_eq!(
            resolve_str(&it, "additional_images", &empty_map(), &["g:additional_image_link"]),
            Some("https://a/2.jpg")
        );
    }
}
