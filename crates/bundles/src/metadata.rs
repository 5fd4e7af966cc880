//! Registry encoding of bundle definitions.
//!
//! The storefront keeps bundle configuration as string metafields in the
//! `bundle` namespace:
//! - `is_bundle`: `"true"` when the product is a bundle
//! - `linked_product_ids`: JSON array of product ids, e.g. `[1, 2]`
//! - `product_quantities`: JSON object keyed by stringified id, e.g. `{"1": 2}`

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use bundlestock_core::ProductId;

use crate::model::BundleDefinition;

pub const NAMESPACE: &str = "bundle";
pub const KEY_IS_BUNDLE: &str = "is_bundle";
pub const KEY_LINKED_PRODUCT_IDS: &str = "linked_product_ids";
pub const KEY_PRODUCT_QUANTITIES: &str = "product_quantities";

/// A single namespaced key/value record attached to a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metafield {
    pub namespace: String,
    pub key: String,
    pub value: String,
}

impl Metafield {
    fn bundle(key: &str, value: String) -> Self {
        Self {
            namespace: NAMESPACE.to_string(),
            key: key.to_string(),
            value,
        }
    }
}

/// Raw bundle fields for one product, as stored. Any of them may be absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BundleMetadata {
    pub is_bundle: Option<String>,
    pub linked_product_ids: Option<String>,
    pub product_quantities: Option<String>,
}

impl BundleMetadata {
    /// Pick the bundle fields out of a product's metafields; other namespaces are ignored.
    pub fn from_metafields<'a>(fields: impl IntoIterator<Item = &'a Metafield>) -> Self {
        let mut meta = Self::default();
        for field in fields {
            if field.namespace != NAMESPACE {
                continue;
            }
            match field.key.as_str() {
                KEY_IS_BUNDLE => meta.is_bundle = Some(field.value.clone()),
                KEY_LINKED_PRODUCT_IDS => meta.linked_product_ids = Some(field.value.clone()),
                KEY_PRODUCT_QUANTITIES => meta.product_quantities = Some(field.value.clone()),
                _ => {}
            }
        }
        meta
    }

    /// Encode a definition the way the registry stores it.
    pub fn from_definition(bundle: &BundleDefinition) -> Self {
        let linked: Vec<u64> = bundle.linked_product_ids.iter().map(|id| id.get()).collect();
        let quantities: BTreeMap<String, i64> = bundle
            .product_quantities
            .iter()
            .map(|(id, q)| (id.to_string(), *q))
            .collect();

        Self {
            is_bundle: Some("true".to_string()),
            linked_product_ids: Some(serde_json::Value::from(linked).to_string()),
            product_quantities: Some(
                serde_json::Value::Object(
                    quantities
                        .into_iter()
                        .map(|(k, v)| (k, serde_json::Value::from(v)))
                        .collect(),
                )
                .to_string(),
            ),
        }
    }

    pub fn to_metafields(&self) -> Vec<Metafield> {
        let mut out = Vec::new();
        if let Some(v) = &self.is_bundle {
            out.push(Metafield::bundle(KEY_IS_BUNDLE, v.clone()));
        }
        if let Some(v) = &self.linked_product_ids {
            out.push(Metafield::bundle(KEY_LINKED_PRODUCT_IDS, v.clone()));
        }
        if let Some(v) = &self.product_quantities {
            out.push(Metafield::bundle(KEY_PRODUCT_QUANTITIES, v.clone()));
        }
        out
    }

    /// Whether the bundle flag is explicitly set.
    pub fn is_flagged(&self) -> bool {
        self.is_bundle.as_deref() == Some("true")
    }

    /// Decode into a definition for product `id`.
    ///
    /// `None` unless the flag is set and both the linked ids and the
    /// quantities are present and parseable; partial or malformed records
    /// read as "not a bundle".
    pub fn to_definition(&self, id: ProductId) -> Option<BundleDefinition> {
        if !self.is_flagged() {
            return None;
        }
        let linked = parse_linked_ids(self.linked_product_ids.as_deref()?)?;
        let quantities = parse_quantities(self.product_quantities.as_deref()?)?;
        Some(BundleDefinition::new(id, linked, quantities))
    }
}

fn parse_linked_ids(raw: &str) -> Option<Vec<ProductId>> {
    let ids: Vec<u64> = serde_json::from_str(raw).ok()?;
    ids.into_iter().map(|id| ProductId::new(id).ok()).collect()
}

fn parse_quantities(raw: &str) -> Option<BTreeMap<ProductId, i64>> {
    let entries: HashMap<String, i64> = serde_json::from_str(raw).ok()?;
    entries
        .into_iter()
        .map(|(k, v)| k.parse::<ProductId>().ok().map(|id| (id, v)))
        .collect()
}
