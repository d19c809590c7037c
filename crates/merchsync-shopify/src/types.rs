//! Shopify Admin API shapes used by the reconciliation and stock engines.
//!
//! ## Observed shapes
//!
//! ### Tags
//! The Admin REST API returns product tags as a **comma-separated string**
//! (unlike the public `products.json` endpoint, which returns an array).
//! Tag merging therefore splits on `,` and re-joins with `", "`.
//!
//! ### `compare_at_price`
//! `null` when no compare-at price is set; a decimal string otherwise. A
//! patch must be able to send an explicit `null` to clear it, hence the
//! double-`Option` on [`VariantPatch::compare_at_price`].
//!
//! ### Identifiers
//! REST responses carry numeric ids; GraphQL returns gids like
//! `gid://shopify/ProductVariant/42`. Lookup hits normalize to numeric ids
//! at the client boundary so the engines never see gids.

use serde::{Deserialize, Serialize};

/// Envelope for REST `{"product": …}` responses.
#[derive(Debug, Deserialize)]
pub struct ProductEnvelope {
    pub product: RemoteProduct,
}

/// Envelope for REST `{"variant": …}` responses.
#[derive(Debug, Deserialize)]
pub struct VariantEnvelope {
    pub variant: RemoteVariant,
}

/// A product as currently stored in the catalog — the authoritative prior
/// state reconciliation diffs against.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteProduct {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub body_html: Option<String>,
    #[serde(default)]
    pub vendor: Option<String>,
    #[serde(default)]
    pub product_type: Option<String>,
    /// Comma-separated tag line as stored; may be empty.
    #[serde(default)]
    pub tags: String,
    #[serde(default)]
    pub handle: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub variants: Vec<RemoteVariant>,
}

/// A variant as currently stored in the catalog.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteVariant {
    pub id: i64,
    /// May be empty on variants created outside the feed flow.
    #[serde(default)]
    pub sku: Option<String>,
    #[serde(default)]
    pub price: String,
    #[serde(default)]
    pub compare_at_price: Option<String>,
    #[serde(default)]
    pub inventory_management: Option<String>,
    #[serde(default)]
    pub inventory_item_id: Option<i64>,
}

/// A GraphQL SKU-lookup hit, ids already normalized from gids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantHit {
    pub variant_id: i64,
    pub product_id: i64,
}

/// A GraphQL tag-lookup hit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductHit {
    pub product_id: i64,
}

/// Parent-level update: all fields are always sent — the reconciler decides
/// field-by-field whether to carry the mapped value or keep the prior one.
#[derive(Debug, Clone, Serialize)]
pub struct ProductPatch {
    pub title: String,
    pub body_html: String,
    pub vendor: String,
    pub product_type: String,
    pub tags: String,
}

/// Field-level variant update. `None` fields are omitted from the payload;
/// `compare_at_price` distinguishes "leave untouched" (outer `None`) from
/// "clear on the catalog" (inner `None`, serialized as JSON `null`).
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct VariantPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compare_at_price: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inventory_management: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
}

impl VariantPatch {
    /// `true` when the diff found nothing to update.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.price.is_none()
            && self.compare_at_price.is_none()
            && self.inventory_management.is_none()
            && self.sku.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variant_patch_default_is_empty() {
        assert!(VariantPatch::default().is_empty());
    }

    #[test]
    fn variant_patch_with_any_field_is_not_empty() {
        let patch = VariantPatch {
            price: Some("19.90".to_string()),
            ..VariantPatch::default()
        };
        assert!(!patch.is_empty());
    }

    #[test]
    fn variant_patch_serializes_clear_as_null() {
        let patch = VariantPatch {
            compare_at_price: Some(None),
            ..VariantPatch::default()
        };
        let json = serde_json::to_value(&patch).unwrap();
        assert!(json.get("price").is_none());
        assert_eq!(json["compare_at_price"], serde_json::Value::Null);
    }

    #[test]
    fn remote_product_deserializes_with_missing_optionals() {
        let json = r#"{"id": 7, "title": "Anvil", "tags": "a, b", "variants": [
            {"id": 1, "sku": "A1", "price": "10.00"}
        ]}"#;
        let product: RemoteProduct = serde_json::from_str(json).unwrap();
        assert_eq!(product.id, 7);
        assert_eq!(product.tags, "a, b");
        assert!(product.variants[0].inventory_management.is_none());
    }
}
