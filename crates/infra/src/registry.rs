//! Bundle registry over a metadata store, with a per-pass cache.
//!
//! One registry lives for exactly one reconciliation pass. Classification of
//! sold items and the "all bundles" listing share the same cache, so each
//! product's metadata is fetched at most once per pass.

use std::collections::{BTreeMap, HashMap};

use bundlestock_bundles::{BundleDefinition, affected_bundles};
use bundlestock_core::ProductId;

use crate::gateway::{BundleMetadataStore, GatewayError};

pub struct BundleRegistry<'a, M: ?Sized> {
    store: &'a M,
    definitions: HashMap<ProductId, Option<BundleDefinition>>,
    all_bundles: Option<Vec<BundleDefinition>>,
}

impl<'a, M> BundleRegistry<'a, M>
where
    M: BundleMetadataStore + ?Sized,
{
    pub fn new(store: &'a M) -> Self {
        Self {
            store,
            definitions: HashMap::new(),
            all_bundles: None,
        }
    }

    /// The product's bundle definition, or `None` for a plain product.
    ///
    /// Flagged records that cannot be decoded are treated as plain products.
    pub async fn definition(
        &mut self,
        product_id: ProductId,
    ) -> Result<Option<BundleDefinition>, GatewayError> {
        if let Some(cached) = self.definitions.get(&product_id) {
            return Ok(cached.clone());
        }

        let metadata = self.store.bundle_metadata(product_id).await?;
        let definition = metadata.to_definition(product_id);
        if definition.is_none() && metadata.is_flagged() {
            tracing::warn!(
                product_id = %product_id,
                "bundle metadata is incomplete or malformed; treating product as plain"
            );
        }

        self.definitions.insert(product_id, definition.clone());
        Ok(definition)
    }

    pub async fn is_bundle(&mut self, product_id: ProductId) -> Result<bool, GatewayError> {
        Ok(self.definition(product_id).await?.is_some())
    }

    pub async fn linked_ids(&mut self, product_id: ProductId) -> Result<Vec<ProductId>, GatewayError> {
        Ok(self
            .definition(product_id)
            .await?
            .map(|b| b.linked_product_ids)
            .unwrap_or_default())
    }

    pub async fn quantities(
        &mut self,
        product_id: ProductId,
    ) -> Result<BTreeMap<ProductId, i64>, GatewayError> {
        Ok(self
            .definition(product_id)
            .await?
            .map(|b| b.product_quantities)
            .unwrap_or_default())
    }

    /// Every bundle in the catalog, in catalog order.
    pub async fn list_all_bundles(&mut self) -> Result<Vec<BundleDefinition>, GatewayError> {
        if let Some(all) = &self.all_bundles {
            return Ok(all.clone());
        }

        let mut bundles = Vec::new();
        for product_id in self.store.product_ids().await? {
            if let Some(bundle) = self.definition(product_id).await? {
                bundles.push(bundle);
            }
        }

        tracing::debug!(count = bundles.len(), "loaded bundle definitions");
        self.all_bundles = Some(bundles.clone());
        Ok(bundles)
    }

    /// Bundles whose constituents include `product_id`, in catalog order.
    pub async fn list_bundles_referencing(
        &mut self,
        product_id: ProductId,
    ) -> Result<Vec<BundleDefinition>, GatewayError> {
        let all = self.list_all_bundles().await?;
        Ok(affected_bundles(product_id, &all).into_iter().cloned().collect())
    }
}
