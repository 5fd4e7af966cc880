//! Bundle inventory domain.
//!
//! Business rules for bundles, implemented purely as deterministic domain
//! logic (no IO, no HTTP, no storage):
//! - `calculator`: achievable stock, bundle-sale deltas, individual-sale ripple
//! - `validator`: structural checks on a bundle definition
//! - `metadata`: the string-encoded registry representation of a bundle

pub mod calculator;
pub mod metadata;
pub mod model;
pub mod validator;

pub use calculator::{
    achievable_stock, affected_bundles, initial_stock, ripple_from_individual_sale, sale_deltas,
};
pub use metadata::{BundleMetadata, Metafield};
pub use model::{BundleDefinition, BundleStock, Product, SaleLine, StockDelta, StockSnapshot};
pub use validator::validate;
