//! Import run loop: map and reconcile every group, isolating failures.

use merchsync_feed::{map_group, Group, MappingTable};
use merchsync_shopify::ShopifyClient;

use crate::reconcile::{reconcile_group, GroupOutcome};

/// Tallies for a full import run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub groups: usize,
    pub created: u32,
    pub updated: u32,
    pub skipped: u32,
    pub errors: u32,
}

/// Reconciles all groups in feed order.
///
/// A failure inside one group is logged with the group identity, counted,
/// and does not stop the run — partial failure is isolated per group, with
/// no rollback of mutations already issued for it.
pub async fn run_import(
    shopify: &ShopifyClient,
    groups: &[Group],
    mapping: &MappingTable,
) -> ImportSummary {
    let mut summary = ImportSummary {
        groups: groups.len(),
        ..ImportSummary::default()
    };

    for group in groups {
        let mapped = map_group(group, mapping);
        let skus = mapped.skus();
        tracing::info!(
            group = %group.group_id,
            title = %mapped.title,
            skus = ?&skus[..skus.len().min(6)],
            "reconciling group"
        );

        match reconcile_group(shopify, &group.group_id, &mapped).await {
            Ok(GroupOutcome::Created { product_id }) => {
                summary.created += 1;
                tracing::info!(group = %group.group_id, product_id, "parent created");
            }
            Ok(GroupOutcome::Updated {
                product_id,
                variants_created,
                variants_updated,
            }) => {
                summary.updated += 1;
                tracing::info!(
                    group = %group.group_id,
                    product_id,
                    variants_created,
                    variants_updated,
                    "parent updated"
                );
            }
            Ok(GroupOutcome::SkippedNoSku) => {
                summary.skipped += 1;
            }
            Err(e) => {
                summary.errors += 1;
                tracing::error!(group = %group.group_id, error = %e, "group reconciliation failed");
            }
        }
    }

    summary
}
