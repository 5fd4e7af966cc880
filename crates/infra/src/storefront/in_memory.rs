use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use async_trait::async_trait;

use bundlestock_bundles::{BundleDefinition, BundleMetadata, SaleLine, StockDelta};
use bundlestock_core::{OrderId, ProductId};

use crate::config::StoreCredentials;
use crate::gateway::{BundleMetadataStore, GatewayError, OrderLookup, StockLedger};
use crate::storefront::StorefrontConnector;

/// In-memory storefront for tests/dev.
///
/// Records every ledger write in order and counts every gateway call, so
/// callers can assert both the final state and that no call was made at all.
#[derive(Debug, Default)]
pub struct InMemoryStorefront {
    levels: RwLock<BTreeMap<ProductId, i64>>,
    metadata: RwLock<BTreeMap<ProductId, BundleMetadata>>,
    orders: RwLock<HashMap<OrderId, Vec<SaleLine>>>,
    writes: Mutex<Vec<StockDelta>>,
    calls: AtomicUsize,
    fail_after: Mutex<Option<usize>>,
}

impl InMemoryStorefront {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_level(&self, product_id: ProductId, level: i64) {
        if let Ok(mut levels) = self.levels.write() {
            levels.insert(product_id, level);
        }
    }

    pub fn level(&self, product_id: ProductId) -> Option<i64> {
        self.levels.read().ok()?.get(&product_id).copied()
    }

    pub fn set_metadata(&self, product_id: ProductId, metadata: BundleMetadata) {
        if let Ok(mut map) = self.metadata.write() {
            map.insert(product_id, metadata);
        }
    }

    /// Store `bundle` in its registry encoding.
    pub fn define_bundle(&self, bundle: &BundleDefinition) {
        self.set_metadata(bundle.id, BundleMetadata::from_definition(bundle));
    }

    pub fn add_order(&self, order_id: OrderId, lines: Vec<SaleLine>) {
        if let Ok(mut orders) = self.orders.write() {
            orders.insert(order_id, lines);
        }
    }

    /// Ledger writes in commit order.
    pub fn writes(&self) -> Vec<StockDelta> {
        self.writes.lock().map(|w| w.clone()).unwrap_or_default()
    }

    /// Number of gateway calls served (or refused) so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Let the next `calls` gateway calls succeed, then fail every one after.
    pub fn fail_after(&self, calls: usize) {
        if let Ok(mut limit) = self.fail_after.lock() {
            *limit = Some(self.call_count() + calls);
        }
    }

    fn record_call(&self, what: &str) -> Result<(), GatewayError> {
        let served = self.calls.fetch_add(1, Ordering::SeqCst);
        let limit = self
            .fail_after
            .lock()
            .map_err(|_| GatewayError::Unavailable("lock poisoned".into()))?;
        match *limit {
            Some(limit) if served >= limit => {
                Err(GatewayError::Unavailable(format!("{what} refused by test storefront")))
            }
            _ => Ok(()),
        }
    }

    fn poisoned() -> GatewayError {
        GatewayError::Unavailable("lock poisoned".into())
    }
}

#[async_trait]
impl StockLedger for InMemoryStorefront {
    async fn fetch_level(&self, product_id: ProductId) -> Result<Option<i64>, GatewayError> {
        self.record_call("fetch_level")?;
        let levels = self.levels.read().map_err(|_| Self::poisoned())?;
        Ok(levels.get(&product_id).copied())
    }

    async fn write_level(&self, product_id: ProductId, level: i64) -> Result<(), GatewayError> {
        self.record_call("write_level")?;
        let mut levels = self.levels.write().map_err(|_| Self::poisoned())?;
        if !levels.contains_key(&product_id) {
            return Err(GatewayError::Status {
                status: 404,
                path: format!("/catalog/products/{product_id}"),
                body: "product not found".into(),
            });
        }
        levels.insert(product_id, level);
        self.writes
            .lock()
            .map_err(|_| Self::poisoned())?
            .push(StockDelta { product_id, new_level: level });
        Ok(())
    }
}

#[async_trait]
impl BundleMetadataStore for InMemoryStorefront {
    async fn product_ids(&self) -> Result<Vec<ProductId>, GatewayError> {
        self.record_call("product_ids")?;
        let levels = self.levels.read().map_err(|_| Self::poisoned())?;
        let metadata = self.metadata.read().map_err(|_| Self::poisoned())?;
        let ids: BTreeSet<ProductId> = levels.keys().chain(metadata.keys()).copied().collect();
        Ok(ids.into_iter().collect())
    }

    async fn bundle_metadata(&self, product_id: ProductId) -> Result<BundleMetadata, GatewayError> {
        self.record_call("bundle_metadata")?;
        let metadata = self.metadata.read().map_err(|_| Self::poisoned())?;
        Ok(metadata.get(&product_id).cloned().unwrap_or_default())
    }
}

#[async_trait]
impl OrderLookup for InMemoryStorefront {
    async fn order_lines(&self, order_id: OrderId) -> Result<Vec<SaleLine>, GatewayError> {
        self.record_call("order_lines")?;
        let orders = self.orders.read().map_err(|_| Self::poisoned())?;
        orders.get(&order_id).cloned().ok_or_else(|| GatewayError::Status {
            status: 404,
            path: format!("/orders/{order_id}/products"),
            body: "order not found".into(),
        })
    }
}

impl StorefrontConnector for Arc<InMemoryStorefront> {
    type Gateway = Arc<InMemoryStorefront>;

    fn connect(&self, _credentials: &StoreCredentials) -> Self::Gateway {
        Arc::clone(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pid(raw: u64) -> ProductId {
        ProductId::new(raw).unwrap()
    }

    #[tokio::test]
    async fn unknown_products_are_omitted_from_snapshots() {
        let store = InMemoryStorefront::new();
        store.set_level(pid(1), 10);

        let snapshot = store.fetch_levels(&[pid(1), pid(2)]).await.unwrap();
        assert_eq!(snapshot.level(pid(1)), Some(10));
        assert_eq!(snapshot.level(pid(2)), None);
        assert_eq!(store.call_count(), 2);
    }

    #[tokio::test]
    async fn writes_are_logged_in_order() {
        let store = InMemoryStorefront::new();
        store.set_level(pid(1), 10);
        store.set_level(pid(2), 20);

        store.write_level(pid(2), 18).await.unwrap();
        store.write_level(pid(1), 6).await.unwrap();

        assert_eq!(
            store.writes(),
            vec![
                StockDelta { product_id: pid(2), new_level: 18 },
                StockDelta { product_id: pid(1), new_level: 6 },
            ]
        );
        assert_eq!(store.level(pid(1)), Some(6));
    }

    #[tokio::test]
    async fn writing_an_unknown_product_fails() {
        let store = InMemoryStorefront::new();
        let err = store.write_level(pid(5), 1).await.unwrap_err();
        assert!(matches!(err, GatewayError::Status { status: 404, .. }));
        assert!(store.writes().is_empty());
    }

    #[tokio::test]
    async fn fail_after_refuses_later_calls() {
        let store = InMemoryStorefront::new();
        store.set_level(pid(1), 10);
        store.fail_after(1);

        assert!(store.fetch_level(pid(1)).await.is_ok());
        assert!(matches!(
            store.fetch_level(pid(1)).await,
            Err(GatewayError::Unavailable(_))
        ));
    }
}
