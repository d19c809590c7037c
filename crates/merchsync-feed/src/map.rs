//! Group mapper: one feed group into a [`MappedProduct`].
//!
//! The first variant of the group is the canonical source for parent-level
//! fields; per-variant fields (SKU, price, options, barcode) resolve from
//! each item. Variants without a resolvable SKU are dropped here — the SKU
//! is the reconciliation natural key and an empty one can never match.

use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::Decimal;

use merchsync_core::{MappedImage, MappedProduct, MappedVariant, ProductOption};

use crate::mapping::{render_tag_templates, MappingTable};
use crate::price::parse_price;
use crate::resolve::{resolve_str, resolve_value};
use crate::text::{normalize_sku, slugify};
use crate::types::{FieldValue, FlatItem, Group};

static IMAGE_SEP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[|;,]+").expect("valid image separator regex"));
static URL_BOUNDARY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\s+(https?://)").expect("valid url boundary regex"));
static ABSOLUTE_URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^https?://").expect("valid absolute url regex"));

/// Splits an image field into absolute URLs.
///
/// Accepts `|`/`;`/`,` separated lists and space-separated runs where each
/// URL starts a new token. Non-URL fragments are discarded; duplicates are
/// kept (gallery order is the feed's business).
fn split_image_urls(value: &FieldValue) -> Vec<String> {
    value
        .iter()
        .flat_map(|raw| {
            let seeded = URL_BOUNDARY_RE.replace_all(raw, "\n$1");
            let broken = IMAGE_SEP_RE.replace_all(&seeded, "\n");
            broken
                .split('\n')
                .map(str::trim)
                .filter(|u| ABSOLUTE_URL_RE.is_match(u))
                .map(str::to_string)
                .collect::<Vec<_>>()
        })
        .collect()
}

/// Maps one group into the catalog product shape.
#[must_use]
pub fn map_group(group: &Group, map: &MappingTable) -> MappedProduct {
    let fallback_item = FlatItem::default();
    let first = group.variants.first().unwrap_or(&fallback_item);

    let vendor = resolve_str(first, "brand", map, &["g:brand"])
        .unwrap_or("")
        .to_string();
    let mpn = resolve_str(first, "mpn", map, &["g:mpn"]);
    let title = resolve_str(first, "title", map, &["g:title"]).map_or_else(
        || {
            format!("{} {}", vendor, mpn.unwrap_or(group.group_id.as_str()))
                .trim()
                .to_string()
        },
        str::to_string,
    );
    let description = resolve_str(first, "description", map, &["g:description"])
        .unwrap_or("")
        .to_string();

    let category = resolve_str(first, "category", map, &["g:google_product_category"])
        .unwrap_or("")
        .to_string();
    let category2 = resolve_str(first, "category2", map, &[])
        .unwrap_or("")
        .to_string();
    let category3 = resolve_str(first, "category3", map, &[])
        .unwrap_or("")
        .to_string();
    let type_field = resolve_str(first, "type", map, &["g:product_highlight", "g:product_type"])
        .unwrap_or("")
        .to_string();

    // Product type prefers the explicit type field, then the primary category.
    let product_type = if type_field.is_empty() {
        category.clone()
    } else {
        type_field.clone()
    };

    let mut images: Vec<MappedImage> = Vec::new();
    if let Some(primary) = resolve_value(first, "image", map, &["g:image_link"]) {
        images.extend(
            split_image_urls(primary)
                .into_iter()
                .map(|src| MappedImage { src }),
        );
    }
    if let Some(extra) = resolve_value(first, "additional_images", map, &["g:additional_image_link"])
    {
        images.extend(
            split_image_urls(extra)
                .into_iter()
                .map(|src| MappedImage { src }),
        );
    }

    let has_color = group
        .variants
        .iter()
        .any(|v| resolve_str(v, "color", map, &["g:color"]).is_some());
    let has_size = group
        .variants
        .iter()
        .any(|v| resolve_str(v, "size", map, &["g:size"]).is_some());
    let mut axes = Vec::new();
    if has_color {
        axes.push(ProductOption {
            name: "Colore".to_string(),
        });
    }
    if has_size {
        axes.push(ProductOption {
            name: "Taglia".to_string(),
        });
    }
    let options = if axes.is_empty() { None } else { Some(axes) };

    let variants: Vec<MappedVariant> = group
        .variants
        .iter()
        .filter_map(|v| map_variant(v, group, map, has_color, has_size))
        .collect();

    let mut template_values: HashMap<&str, &str> = HashMap::new();
    template_values.insert("brand", vendor.as_str());
    template_values.insert("category", category.as_str());
    template_values.insert("category2", category2.as_str());
    template_values.insert("category3", category3.as_str());
    template_values.insert("type", type_field.as_str());

    let mut tags: Vec<String> = Vec::new();
    if !vendor.is_empty() {
        tags.push(format!("Brand:{vendor}"));
    }
    if !product_type.is_empty() {
        tags.push(format!("GoogleCat:{product_type}"));
    }
    // Idempotency anchor: re-finds this parent on later runs when no variant
    // SKU lookup succeeds.
    tags.push(format!("GMGroup:{}", group.group_id));
    tags.extend(render_tag_templates(map.tag_templates(), &template_values));

    let mut seen: HashSet<&str> = HashSet::new();
    let mut deduped: Vec<&str> = Vec::new();
    for tag in &tags {
        if seen.insert(tag.as_str()) {
            deduped.push(tag.as_str());
        }
    }
    let tags = deduped.join(", ");

    MappedProduct {
        title,
        body_html: description,
        vendor,
        product_type,
        images,
        options,
        variants,
        tags,
        handle: format!("gm-{}", slugify(&group.group_id)),
        status: "active".to_string(),
    }
}

fn map_variant(
    item: &FlatItem,
    group: &Group,
    map: &MappingTable,
    has_color: bool,
    has_size: bool,
) -> Option<MappedVariant> {
    let sku = normalize_sku(resolve_str(item, "sku", map, &["g:mpn", "g:id"]).unwrap_or(""));
    if sku.is_empty() {
        tracing::debug!(group = %group.group_id, "dropping variant without resolvable SKU");
        return None;
    }

    let price_val: Option<Decimal> = resolve_str(item, "price", map, &["g:sale_price", "g:price"])
        .map(parse_price)
        .and_then(|p| p.value);
    let compare_val: Option<Decimal> = resolve_str(item, "compare_at_price", map, &["g:price"])
        .map(parse_price)
        .and_then(|p| p.value)
        .filter(|d| !d.is_zero());

    let price = price_val.map_or_else(|| "0".to_string(), |d| d.to_string());
    let compare_at_price = match (compare_val, price_val) {
        (Some(compare), Some(current)) if current < compare => Some(compare.to_string()),
        (Some(compare), None) => Some(compare.to_string()),
        _ => None,
    };

    let color = resolve_str(item, "color", map, &["g:color"]).map(str::to_string);
    let size = resolve_str(item, "size", map, &["g:size"]).map(str::to_string);

    Some(MappedVariant {
        sku,
        price,
        compare_at_price,
        barcode: resolve_str(item, "barcode", map, &["g:gtin", "g:mpn"]).map(str::to_string),
        option1: color.or_else(|| has_color.then(|| "Default".to_string())),
        option2: size.or_else(|| has_size.then(|| "Default".to_string())),
        inventory_management: "shopify".to_string(),
        inventory_policy: "deny".to_string(),
    })
}
