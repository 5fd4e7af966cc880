//! Bundle stock arithmetic.
//!
//! Every function here is pure: explicit inputs, no hidden state, no IO.
//! Levels produced by this module are never negative.

use std::collections::BTreeMap;

use bundlestock_core::ProductId;

use crate::model::{BundleDefinition, BundleStock, StockDelta, StockSnapshot, required_from};

/// Maximum number of bundle units sellable from current constituent stock.
///
/// Returns 0 when any constituent is missing from the snapshot or when the
/// bundle has no constituents.
pub fn achievable_stock(bundle: &BundleDefinition, snapshot: &StockSnapshot) -> i64 {
    limiting_units(&bundle.linked_product_ids, &bundle.product_quantities, snapshot)
}

/// Achievable stock for a bundle that has not been assigned an id yet.
pub fn initial_stock(
    linked_product_ids: &[ProductId],
    product_quantities: &BTreeMap<ProductId, i64>,
    snapshot: &StockSnapshot,
) -> i64 {
    limiting_units(linked_product_ids, product_quantities, snapshot)
}

fn limiting_units(
    linked_product_ids: &[ProductId],
    product_quantities: &BTreeMap<ProductId, i64>,
    snapshot: &StockSnapshot,
) -> i64 {
    let mut limit: Option<i64> = None;

    for &product_id in linked_product_ids {
        let Some(level) = snapshot.level(product_id) else {
            return 0;
        };
        let required = required_from(product_quantities, product_id);
        let possible = level.max(0) / required;
        limit = Some(match limit {
            Some(current) => current.min(possible),
            None => possible,
        });
    }

    limit.unwrap_or(0)
}

/// New constituent levels after selling `units_sold` bundle units.
///
/// Constituents missing from the snapshot get no delta.
pub fn sale_deltas(
    bundle: &BundleDefinition,
    units_sold: u32,
    snapshot: &StockSnapshot,
) -> Vec<StockDelta> {
    bundle
        .linked_product_ids
        .iter()
        .filter_map(|&product_id| {
            let level = snapshot.level(product_id)?;
            let consumed = i64::from(units_sold).saturating_mul(bundle.required_quantity(product_id));
            Some(StockDelta {
                product_id,
                new_level: level.saturating_sub(consumed).max(0),
            })
        })
        .collect()
}

/// Bundles (in input order) whose constituents include `product_id`.
pub fn affected_bundles(product_id: ProductId, bundles: &[BundleDefinition]) -> Vec<&BundleDefinition> {
    bundles.iter().filter(|b| b.contains(product_id)).collect()
}

/// Recomputed stock of every bundle referencing `sold_product_id` after an individual sale.
pub fn ripple_from_individual_sale(
    sold_product_id: ProductId,
    units_sold: u32,
    bundles: &[BundleDefinition],
    snapshot: &StockSnapshot,
) -> Vec<BundleStock> {
    let after = snapshot.after_sale(sold_product_id, units_sold);

    affected_bundles(sold_product_id, bundles)
        .into_iter()
        .map(|bundle| BundleStock {
            bundle_id: bundle.id,
            new_stock: achievable_stock(bundle, &after),
        })
        .collect()
}
