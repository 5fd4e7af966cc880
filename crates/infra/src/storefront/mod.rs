//! Storefront adapters implementing the gateway contracts.
//!
//! - `http`: REST client for a live store
//! - `in_memory`: deterministic store for tests/dev

pub mod http;
pub mod in_memory;

pub use http::{HttpConnector, StorefrontClient};
pub use in_memory::InMemoryStorefront;

use crate::config::StoreCredentials;
use crate::gateway::{BundleMetadataStore, OrderLookup, StockLedger};

/// Builds a gateway for one store from validated credentials.
///
/// Called once per reconciliation pass, after configuration has been checked.
pub trait StorefrontConnector: Send + Sync {
    type Gateway: StockLedger + BundleMetadataStore + OrderLookup;

    fn connect(&self, credentials: &StoreCredentials) -> Self::Gateway;
}
