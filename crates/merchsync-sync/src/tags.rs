//! Idempotent tag merging.

use std::collections::HashSet;

/// Case-sensitive, order-stable set union of two comma-separated tag lines:
/// existing tags first, then incoming ones not already present. Preserves
/// operator-added tags (including the `GMGroup:` anchor) across runs.
#[must_use]
pub fn merge_tags(existing: &str, incoming: &str) -> String {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut merged: Vec<&str> = Vec::new();
    for tag in existing.split(',').chain(incoming.split(',')) {
        let tag = tag.trim();
        if !tag.is_empty() && seen.insert(tag) {
            merged.push(tag);
        }
    }
    merged.join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn union_keeps_existing_first_and_drops_duplicates() {
        let merged = merge_tags("Foo, GMGroup:X", "Bar, GMGroup:X");
        assert_eq!(merged, "Foo, GMGroup:X, Bar");
    }

    #[test]
    fn empty_existing_yields_incoming() {
        assert_eq!(merge_tags("", "A, B"), "A, B");
    }

    #[test]
    fn empty_incoming_normalizes_existing() {
        assert_eq!(merge_tags("A,B ,  C", ""), "A, B, C");
    }

    #[test]
    fn merge_is_case_sensitive() {
        assert_eq!(merge_tags("brand:acme", "Brand:Acme"), "brand:acme, Brand:Acme");
    }

    #[test]
    fn anchor_tag_survives_merge_exactly_once() {
        let merged = merge_tags("GMGroup:G1, Manual", "Brand:Acme, GMGroup:G1");
        assert_eq!(merged.matches("GMGroup:G1").count(), 1);
        assert!(merged.contains("Manual"));
    }
}
