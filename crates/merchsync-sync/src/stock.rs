//! Stock propagation: StoreGest quantity rows into catalog inventory
//! levels, matched by the same natural-key lookup as reconciliation.

use chrono::Utc;

use merchsync_feed::text::normalize_sku;
use merchsync_shopify::ShopifyClient;
use merchsync_storegest::StoregestClient;

use crate::error::SyncError;

/// Which slice of the quantity data to pull.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockWindow {
    /// Every SKU the provider knows about.
    Full,
    /// Rows changed in the last `n` minutes.
    SinceMinutes(i64),
}

impl StockWindow {
    fn since_epoch(self) -> Option<i64> {
        match self {
            Self::Full => None,
            Self::SinceMinutes(minutes) => Some(Utc::now().timestamp() - minutes * 60),
        }
    }
}

/// Tallies for a stock-sync run. Rows with a blank SKU are skipped without
/// being counted in any bucket.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StockSummary {
    pub rows: usize,
    pub ok: u32,
    pub miss: u32,
    pub err: u32,
}

/// Pushes absolute quantity values for every row in the window.
///
/// # Errors
///
/// Returns an error only when the quantity pull itself fails — there is
/// nothing to process then. Per-row failures are logged with the SKU,
/// counted in `err`, and do not stop the run.
pub async fn run_stock_sync(
    shopify: &ShopifyClient,
    storegest: &StoregestClient,
    location_id: i64,
    window: StockWindow,
) -> Result<StockSummary, SyncError> {
    let rows = storegest.get_quantities(window.since_epoch()).await?;
    tracing::info!(rows = rows.len(), "processing stock rows");

    let mut summary = StockSummary {
        rows: rows.len(),
        ..StockSummary::default()
    };

    for row in &rows {
        let sku = normalize_sku(&row.sku);
        if sku.is_empty() {
            continue;
        }
        match push_row(shopify, &sku, row.quantity, location_id).await {
            Ok(true) => summary.ok += 1,
            Ok(false) => {
                summary.miss += 1;
                tracing::debug!(sku = %sku, "no catalog variant for SKU");
            }
            Err(e) => {
                summary.err += 1;
                tracing::error!(sku = %sku, error = %e, "stock row failed");
            }
        }
    }

    Ok(summary)
}

/// Resolves one SKU to an inventory item and sets its level. `Ok(false)`
/// means the SKU (or its inventory item) could not be resolved — a miss,
/// not an error.
async fn push_row(
    shopify: &ShopifyClient,
    sku: &str,
    quantity: i64,
    location_id: i64,
) -> Result<bool, SyncError> {
    let hit = match shopify.find_variant_by_sku(sku).await? {
        Some(hit) => Some(hit),
        None => shopify.find_variant_by_sku_loose(sku).await?,
    };
    let Some(hit) = hit else {
        return Ok(false);
    };

    let Some(inventory_item_id) = shopify.get_inventory_item_id(hit.variant_id).await? else {
        return Ok(false);
    };

    shopify
        .set_inventory_level(inventory_item_id, location_id, quantity)
        .await?;
    Ok(true)
}
