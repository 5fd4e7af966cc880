use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use bundlestock_core::ProductId;

/// A catalog product as seen by the stock ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub inventory_level: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// A product whose stock is derived from a fixed set of constituent products.
///
/// Only keys of `product_quantities` that also appear in `linked_product_ids`
/// take part in calculations; any other key is inert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleDefinition {
    pub id: ProductId,
    #[serde(default)]
    pub linked_product_ids: Vec<ProductId>,
    #[serde(default)]
    pub product_quantities: BTreeMap<ProductId, i64>,
}

impl BundleDefinition {
    pub fn new(
        id: ProductId,
        linked_product_ids: Vec<ProductId>,
        product_quantities: BTreeMap<ProductId, i64>,
    ) -> Self {
        Self {
            id,
            linked_product_ids,
            product_quantities,
        }
    }

    /// Whether `product_id` is one of this bundle's constituents.
    pub fn contains(&self, product_id: ProductId) -> bool {
        self.linked_product_ids.contains(&product_id)
    }

    /// Units of `product_id` consumed by one bundle unit.
    ///
    /// Unmapped constituents need 1. Non-positive values are rejected by the
    /// validator before a definition is stored; should one still reach this
    /// point it is read as 1 so the floor division stays defined.
    pub fn required_quantity(&self, product_id: ProductId) -> i64 {
        required_from(&self.product_quantities, product_id)
    }
}

pub(crate) fn required_from(quantities: &BTreeMap<ProductId, i64>, product_id: ProductId) -> i64 {
    match quantities.get(&product_id) {
        Some(&q) if q >= 1 => q,
        _ => 1,
    }
}

/// Point-in-time inventory levels keyed by product id.
///
/// Ids absent from the snapshot are "unknown", which is distinct from a level of zero.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StockSnapshot {
    levels: HashMap<ProductId, i64>,
}

impl StockSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_products<'a>(products: impl IntoIterator<Item = &'a Product>) -> Self {
        products
            .into_iter()
            .map(|p| (p.id, p.inventory_level))
            .collect()
    }

    pub fn level(&self, product_id: ProductId) -> Option<i64> {
        self.levels.get(&product_id).copied()
    }

    pub fn insert(&mut self, product_id: ProductId, level: i64) {
        self.levels.insert(product_id, level);
    }

    /// Copy of this snapshot with `product_id` reduced by `units_sold`, clamped at zero.
    ///
    /// Unknown ids stay unknown.
    pub fn after_sale(&self, product_id: ProductId, units_sold: u32) -> Self {
        let mut next = self.clone();
        if let Some(level) = next.levels.get_mut(&product_id) {
            *level = level.saturating_sub(i64::from(units_sold)).max(0);
        }
        next
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }
}

impl FromIterator<(ProductId, i64)> for StockSnapshot {
    fn from_iter<I: IntoIterator<Item = (ProductId, i64)>>(iter: I) -> Self {
        Self {
            levels: iter.into_iter().collect(),
        }
    }
}

impl From<HashMap<ProductId, i64>> for StockSnapshot {
    fn from(levels: HashMap<ProductId, i64>) -> Self {
        Self { levels }
    }
}

/// One sold line item.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleLine {
    pub product_id: ProductId,
    pub quantity: u32,
}

impl SaleLine {
    /// Build a line, reading a missing or zero quantity as a single unit.
    pub fn new(product_id: ProductId, quantity: Option<u32>) -> Self {
        let quantity = match quantity {
            Some(q) if q > 0 => q,
            _ => 1,
        };
        Self {
            product_id,
            quantity,
        }
    }
}

/// Proposed new inventory level for one product (never negative).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockDelta {
    pub product_id: ProductId,
    pub new_level: i64,
}

/// Recomputed achievable stock for one bundle.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BundleStock {
    pub bundle_id: ProductId,
    pub new_stock: i64,
}
