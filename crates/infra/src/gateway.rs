//! Contracts for the external collaborators a reconciliation pass talks to.
//!
//! These are the only suspension points of a pass; everything else is pure.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use bundlestock_bundles::{BundleMetadata, SaleLine, StockSnapshot};
use bundlestock_core::{OrderId, ProductId};

/// Failure talking to the storefront (ledger, registry or order lookup).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GatewayError {
    #[error("network error: {0}")]
    Network(String),

    #[error("unexpected status {status} from {path}: {body}")]
    Status { status: u16, path: String, body: String },

    #[error("unexpected payload from {path}: {reason}")]
    UnexpectedPayload { path: String, reason: String },

    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Per-product inventory counts.
#[async_trait]
pub trait StockLedger: Send + Sync {
    /// Current level, or `None` when the product does not exist.
    async fn fetch_level(&self, product_id: ProductId) -> Result<Option<i64>, GatewayError>;

    /// Levels for `product_ids`; unknown ids are omitted from the snapshot.
    async fn fetch_levels(&self, product_ids: &[ProductId]) -> Result<StockSnapshot, GatewayError> {
        let mut snapshot = StockSnapshot::new();
        for &product_id in product_ids {
            if let Some(level) = self.fetch_level(product_id).await? {
                snapshot.insert(product_id, level);
            }
        }
        Ok(snapshot)
    }

    async fn write_level(&self, product_id: ProductId, level: i64) -> Result<(), GatewayError>;
}

/// Raw bundle metadata, keyed by product id.
#[async_trait]
pub trait BundleMetadataStore: Send + Sync {
    /// Every product id in the catalog, in a stable order.
    async fn product_ids(&self) -> Result<Vec<ProductId>, GatewayError>;

    /// Bundle fields of one product (all `None` for a plain product).
    async fn bundle_metadata(&self, product_id: ProductId) -> Result<BundleMetadata, GatewayError>;
}

/// Resolves an order notification into sold line items.
#[async_trait]
pub trait OrderLookup: Send + Sync {
    async fn order_lines(&self, order_id: OrderId) -> Result<Vec<SaleLine>, GatewayError>;
}

#[async_trait]
impl<S> StockLedger for Arc<S>
where
    S: StockLedger + ?Sized,
{
    async fn fetch_level(&self, product_id: ProductId) -> Result<Option<i64>, GatewayError> {
        (**self).fetch_level(product_id).await
    }

    async fn fetch_levels(&self, product_ids: &[ProductId]) -> Result<StockSnapshot, GatewayError> {
        (**self).fetch_levels(product_ids).await
    }

    async fn write_level(&self, product_id: ProductId, level: i64) -> Result<(), GatewayError> {
        (**self).write_level(product_id, level).await
    }
}

#[async_trait]
impl<S> BundleMetadataStore for Arc<S>
where
    S: BundleMetadataStore + ?Sized,
{
    async fn product_ids(&self) -> Result<Vec<ProductId>, GatewayError> {
        (**self).product_ids().await
    }

    async fn bundle_metadata(&self, product_id: ProductId) -> Result<BundleMetadata, GatewayError> {
        (**self).bundle_metadata(product_id).await
    }
}

#[async_trait]
impl<S> OrderLookup for Arc<S>
where
    S: OrderLookup + ?Sized,
{
    async fn order_lines(&self, order_id: OrderId) -> Result<Vec<SaleLine>, GatewayError> {
        (**self).order_lines(order_id).await
    }
}
