use serde::{Deserialize, Serialize};

/// A feed group mapped into the shape the catalog accepts: one parent product
/// plus its variant set. Serializes directly as the Admin REST `product`
/// payload, so wire field names (`body_html`, `compare_at_price`, …) are used
/// throughout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MappedProduct {
    pub title: String,
    /// Raw HTML description from the feed; empty string when absent.
    pub body_html: String,
    pub vendor: String,
    pub product_type: String,
    pub images: Vec<MappedImage>,
    /// Option axes, at most two (`Colore`, `Taglia`). Omitted entirely when
    /// no variant carries an option value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<ProductOption>>,
    pub variants: Vec<MappedVariant>,
    /// Comma-joined tag line; always contains the `GMGroup:<id>` anchor.
    pub tags: String,
    /// Deterministic slug, `gm-` + slugified group key.
    pub handle: String,
    pub status: String,
}

impl MappedProduct {
    /// Returns the normalized SKUs of all variants, in mapped order.
    #[must_use]
    pub fn skus(&self) -> Vec<&str> {
        self.variants.iter().map(|v| v.sku.as_str()).collect()
    }

    /// Returns `true` when no variant survived SKU normalization.
    #[must_use]
    pub fn has_no_skus(&self) -> bool {
        self.variants.is_empty()
    }
}

/// A single sellable variant under a [`MappedProduct`].
///
/// The SKU is the natural key for reconciliation and is always non-empty:
/// feed items without a resolvable SKU are dropped by the mapper before this
/// type is constructed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MappedVariant {
    /// Normalized SKU: trimmed, inner whitespace stripped, upper-cased.
    pub sku: String,
    /// Decimal price string, e.g. `"19.90"`. `"0"` when the feed price was
    /// unparseable.
    pub price: String,
    /// Pre-sale price; only present when it exceeds `price` (or `price` was
    /// absent), so the storefront never shows a "was cheaper" strike-through.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compare_at_price: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub barcode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub option1: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub option2: Option<String>,
    /// Always `"shopify"`: stock is tracked by the catalog.
    pub inventory_management: String,
    /// Always `"deny"`: no overselling.
    pub inventory_policy: String,
}

/// A product image by CDN/source URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappedImage {
    pub src: String,
}

/// An option axis declared on the parent (name only; values live on variants).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductOption {
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_variant(sku: &str) -> MappedVariant {
        MappedVariant {
            sku: sku.to_string(),
            price: "19.90".to_string(),
            compare_at_price: None,
            barcode: None,
            option1: None,
            option2: None,
            inventory_management: "shopify".to_string(),
            inventory_policy: "deny".to_string(),
        }
    }

    fn make_product(variants: Vec<MappedVariant>) -> MappedProduct {
        MappedProduct {
            title: "Acme Anvil".to_string(),
            body_html: "<p>Drop-forged.</p>".to_string(),
            vendor: "Acme".to_string(),
            product_type: "Hardware".to_string(),
            images: vec![],
            options: None,
            variants,
            tags: "Brand:Acme, GMGroup:ANV".to_string(),
            handle: "gm-anv".to_string(),
            status: "active".to_string(),
        }
    }

    #[test]
    fn skus_returns_mapped_order() {
        let product = make_product(vec![make_variant("A2"), make_variant("A1")]);
        assert_eq!(product.skus(), vec!["A2", "A1"]);
    }

    #[test]
    fn has_no_skus_true_when_empty() {
        assert!(make_product(vec![]).has_no_skus());
    }

    #[test]
    fn serialize_omits_absent_optional_fields() {
        let product = make_product(vec![make_variant("A1")]);
        let json = serde_json::to_value(&product).expect("serialization failed");
        assert!(json.get("options").is_none(), "options should be omitted");
        let variant = &json["variants"][0];
        assert!(variant.get("compare_at_price").is_none());
        assert!(variant.get("barcode").is_none());
        assert!(variant.get("option1").is_none());
        assert_eq!(variant["inventory_management"], "shopify");
        assert_eq!(variant["inventory_policy"], "deny");
    }

    #[test]
    fn serialize_uses_wire_field_names() {
        let mut product = make_product(vec![make_variant("A1")]);
        product.images = vec![MappedImage {
            src: "https://cdn.example.com/a.jpg".to_string(),
        }];
        product.options = Some(vec![ProductOption {
            name: "Colore".to_string(),
        }]);
        let json = serde_json::to_value(&product).expect("serialization failed");
        assert_eq!(json["body_html"], "<p>Drop-forged.</p>");
        assert_eq!(json["images"][0]["src"], "https://cdn.example.com/a.jpg");
        assert_eq!(json["options"][0]["name"], "Colore");
    }
}
