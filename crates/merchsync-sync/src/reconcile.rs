//! Per-group reconciliation: match a mapped group against the catalog and
//! issue the minimal create/update operations to converge state.
//!
//! Matching is two-stage: an exact-then-loose natural-key probe over the
//! group's SKUs, then the `GMGroup:<id>` anchor tag. Re-running the same
//! feed against unchanged remote state must produce zero variant mutations
//! and never a duplicate parent.

use std::collections::HashMap;
use std::str::FromStr;

use rust_decimal::Decimal;

use merchsync_core::{MappedProduct, MappedVariant};
use merchsync_feed::text::normalize_sku;
use merchsync_shopify::{ProductPatch, RemoteVariant, ShopifyClient, VariantHit, VariantPatch};

use crate::error::SyncError;

/// Terminal state of one group's reconciliation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupOutcome {
    Created {
        product_id: i64,
    },
    Updated {
        product_id: i64,
        variants_created: u32,
        variants_updated: u32,
    },
    /// No variant survived SKU normalization; nothing to match on.
    SkippedNoSku,
}

/// Reconciles one mapped group against the catalog.
///
/// # Errors
///
/// Propagates the first remote failure; the caller isolates it to this
/// group and proceeds with the next one.
pub async fn reconcile_group(
    shopify: &ShopifyClient,
    group_id: &str,
    mapped: &MappedProduct,
) -> Result<GroupOutcome, SyncError> {
    if mapped.has_no_skus() {
        tracing::warn!(group = %group_id, "no variant with a usable SKU — skipping group");
        return Ok(GroupOutcome::SkippedNoSku);
    }

    // Probe each SKU, exact quoting first, then the loose form; first hit
    // decides the target parent.
    let mut existing: Option<VariantHit> = None;
    for sku in mapped.skus() {
        if let Some(hit) = shopify.find_variant_by_sku(sku).await? {
            existing = Some(hit);
            break;
        }
        if let Some(hit) = shopify.find_variant_by_sku_loose(sku).await? {
            existing = Some(hit);
            break;
        }
    }

    // No variant hit: the anchor tag re-finds a parent created by an
    // earlier run whose SKUs have since been rewritten.
    let product_id = match &existing {
        Some(hit) => Some(hit.product_id),
        None => shopify
            .find_product_by_tag(&format!("GMGroup:{group_id}"))
            .await?
            .map(|hit| hit.product_id),
    };

    let Some(product_id) = product_id else {
        tracing::info!(group = %group_id, title = %mapped.title, "no existing parent — creating");
        let created = shopify.create_product(mapped).await?;
        return Ok(GroupOutcome::Created {
            product_id: created.id,
        });
    };

    tracing::debug!(group = %group_id, product_id, "existing parent — updating");
    let current = shopify.get_product(product_id).await?;

    // Merge tags as a set union so operator-added tags survive.
    let tags = if mapped.tags.is_empty() {
        current.tags.clone()
    } else {
        crate::tags::merge_tags(&current.tags, &mapped.tags)
    };
    let patch = ProductPatch {
        title: non_empty_or(&mapped.title, &current.title),
        body_html: non_empty_or(
            &mapped.body_html,
            current.body_html.as_deref().unwrap_or(""),
        ),
        vendor: non_empty_or(&mapped.vendor, current.vendor.as_deref().unwrap_or("")),
        product_type: non_empty_or(
            &mapped.product_type,
            current.product_type.as_deref().unwrap_or(""),
        ),
        tags,
    };
    shopify.update_product(product_id, &patch).await?;

    let existing_by_sku: HashMap<String, &RemoteVariant> = current
        .variants
        .iter()
        .filter_map(|v| v.sku.as_deref().map(|s| (normalize_sku(s), v)))
        .collect();

    let mut variants_created = 0u32;
    let mut variants_updated = 0u32;
    for variant in &mapped.variants {
        match existing_by_sku.get(&variant.sku) {
            None => {
                tracing::debug!(group = %group_id, sku = %variant.sku, "creating variant");
                shopify.create_variant(product_id, variant).await?;
                variants_created += 1;
            }
            Some(remote) => {
                let patch = diff_variant(remote, variant);
                if !patch.is_empty() {
                    tracing::debug!(group = %group_id, sku = %variant.sku, ?patch, "updating variant");
                    shopify.update_variant(remote.id, &patch).await?;
                    variants_updated += 1;
                }
            }
        }
    }

    Ok(GroupOutcome::Updated {
        product_id,
        variants_created,
        variants_updated,
    })
}

fn non_empty_or(mapped: &str, prior: &str) -> String {
    if mapped.is_empty() {
        prior.to_string()
    } else {
        mapped.to_string()
    }
}

/// Field-level diff between the stored variant and the mapped one. Empty
/// when nothing changed; the management flag is realigned whenever it is
/// not already `"shopify"`, independent of the other fields.
pub(crate) fn diff_variant(remote: &RemoteVariant, desired: &MappedVariant) -> VariantPatch {
    let mut patch = VariantPatch::default();

    if !price_eq(&remote.price, &desired.price) {
        patch.price = Some(desired.price.clone());
    }

    let remote_compare = remote.compare_at_price.as_deref().unwrap_or("");
    let desired_compare = desired.compare_at_price.as_deref().unwrap_or("");
    if !price_eq(remote_compare, desired_compare) {
        patch.compare_at_price = Some(desired.compare_at_price.clone());
    }

    if remote.inventory_management.as_deref() != Some("shopify") {
        patch.inventory_management = Some("shopify".to_string());
    }

    if remote.sku.as_deref() != Some(desired.sku.as_str()) {
        patch.sku = Some(desired.sku.clone());
    }

    patch
}

/// Numeric price equality when both sides parse (`"19.9"` == `"19.90"`),
/// string equality otherwise.
fn price_eq(a: &str, b: &str) -> bool {
    if a == b {
        return true;
    }
    match (Decimal::from_str(a), Decimal::from_str(b)) {
        (Ok(x), Ok(y)) => x == y,
        _ => false,
    }
}
