//! Infrastructure layer: storefront adapters, configuration, and the sale
//! reconciliation pipeline that drives them.

pub mod config;
pub mod gateway;
pub mod reconciliation;
pub mod registry;
pub mod storefront;

pub use config::{ConfigError, StoreConfig, StoreCredentials};
pub use gateway::{BundleMetadataStore, GatewayError, OrderLookup, StockLedger};
pub use reconciliation::{
    BundleCheck, OrderNotification, ReconcileError, ReconcileSummary, ReconciliationService,
    SaleTrigger, SimulateSale,
};
pub use registry::BundleRegistry;
pub use storefront::{HttpConnector, InMemoryStorefront, StorefrontClient, StorefrontConnector};
