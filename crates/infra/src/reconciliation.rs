//! Sale reconciliation pipeline.
//!
//! One pass per trigger invocation:
//!
//! ```text
//! input ──validate──> config ──connect──> resolve line items
//!   for each line:
//!     bundle?  ── yes ──> sale_deltas ──> write each constituent
//!              ── no ───> (simulation only) write the product's own level
//!                         ──> every referencing bundle: achievable_stock
//!                             from fresh levels ──> write bundle level
//! ```
//!
//! Input and configuration problems are reported before any storefront call.
//! Writes already committed for earlier lines are not rolled back when a later
//! line fails.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::Instrument;
use uuid::Uuid;

use bundlestock_bundles::{
    BundleDefinition, SaleLine, achievable_stock, initial_stock, sale_deltas, validate,
};
use bundlestock_core::{OrderId, ProductId};

use crate::config::{ConfigError, StoreConfig};
use crate::gateway::{BundleMetadataStore, GatewayError, OrderLookup, StockLedger};
use crate::registry::BundleRegistry;
use crate::storefront::StorefrontConnector;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ReconcileError {
    /// Malformed or missing input field.
    #[error("{0}")]
    Validation(String),

    /// The referenced product does not exist in the ledger.
    #[error("Product not found")]
    NotFound(ProductId),

    /// Store identity or credential missing.
    #[error(transparent)]
    Configuration(#[from] ConfigError),

    /// A storefront call failed or returned something unexpected.
    #[error(transparent)]
    Upstream(#[from] GatewayError),

    /// The trigger was invoked with an unsupported HTTP verb.
    #[error("Method not allowed")]
    MethodNotSupported,
}

impl ReconcileError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation_error",
            Self::NotFound(_) => "not_found",
            Self::Configuration(_) => "configuration_error",
            Self::Upstream(_) => "upstream_error",
            Self::MethodNotSupported => "method_not_supported",
        }
    }
}

/// Which entry point started the pass.
///
/// The two triggers differ in one respect: a simulated sale also writes the
/// sold plain product's own level, whereas an order webhook leaves it to the
/// storefront, which has already decremented it.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SaleTrigger {
    Simulation,
    OrderWebhook,
}

impl SaleTrigger {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Simulation => "simulation",
            Self::OrderWebhook => "order_webhook",
        }
    }

    fn writes_plain_product(&self) -> bool {
        matches!(self, Self::Simulation)
    }
}

/// Raw simulate-sale input, as received.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulateSale {
    pub product_id: Option<u64>,
    pub quantity: Option<i64>,
}

impl SimulateSale {
    pub fn new(product_id: u64, quantity: Option<i64>) -> Self {
        Self {
            product_id: Some(product_id),
            quantity,
        }
    }

    fn into_line(self) -> Result<SaleLine, ReconcileError> {
        let product_id = self
            .product_id
            .filter(|&id| id != 0)
            .ok_or_else(|| ReconcileError::validation("productId is required"))
            .and_then(|id| {
                ProductId::new(id).map_err(|e| ReconcileError::validation(e.to_string()))
            })?;

        let quantity = match self.quantity {
            None => None,
            Some(q) if q < 0 => {
                return Err(ReconcileError::validation("quantity must not be negative"));
            }
            Some(q) => Some(
                u32::try_from(q).map_err(|_| ReconcileError::validation("quantity is too large"))?,
            ),
        };

        Ok(SaleLine::new(product_id, quantity))
    }
}

/// Raw order notification: only the order id matters to the pipeline.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct OrderNotification {
    pub order_id: Option<u64>,
}

impl OrderNotification {
    pub fn new(order_id: u64) -> Self {
        Self {
            order_id: Some(order_id),
        }
    }
}

/// What a successful pass processed (the input, not a write log).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileSummary {
    pub trigger: SaleTrigger,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<OrderId>,
    pub lines: Vec<SaleLine>,
    pub processed_at: DateTime<Utc>,
}

/// Outcome of checking a bundle definition before it is saved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleCheck {
    pub valid: bool,
    pub errors: Vec<String>,
    pub achievable_stock: i64,
}

/// Drives reconciliation passes against whatever storefront the connector builds.
pub struct ReconciliationService<C> {
    connector: C,
}

impl<C> ReconciliationService<C>
where
    C: StorefrontConnector,
{
    pub fn new(connector: C) -> Self {
        Self { connector }
    }

    /// Apply one simulated sale.
    pub async fn simulate_sale(
        &self,
        config: &StoreConfig,
        request: SimulateSale,
    ) -> Result<ReconcileSummary, ReconcileError> {
        let line = request.into_line()?;
        let credentials = config.credentials()?;
        let gateway = self.connector.connect(&credentials);

        let span = pass_span(SaleTrigger::Simulation);
        async move {
            let current = gateway
                .fetch_level(line.product_id)
                .await?
                .ok_or(ReconcileError::NotFound(line.product_id))?;

            let mut registry = BundleRegistry::new(&gateway);
            apply_line(&gateway, &mut registry, line, SaleTrigger::Simulation, Some(current)).await?;

            tracing::info!("sale simulated");
            Ok::<_, ReconcileError>(ReconcileSummary {
                trigger: SaleTrigger::Simulation,
                order_id: None,
                lines: vec![line],
                processed_at: Utc::now(),
            })
        }
        .instrument(span)
        .await
    }

    /// Apply every line item of a storefront order.
    pub async fn process_order(
        &self,
        config: &StoreConfig,
        notification: OrderNotification,
    ) -> Result<ReconcileSummary, ReconcileError> {
        let order_id = notification
            .order_id
            .ok_or_else(|| ReconcileError::validation("Missing required information"))
            .and_then(|id| OrderId::new(id).map_err(|e| ReconcileError::validation(e.to_string())))?;
        let credentials = config.credentials()?;
        let gateway = self.connector.connect(&credentials);

        let span = pass_span(SaleTrigger::OrderWebhook);
        async move {
            tracing::info!(order_id = %order_id, "fetching order line items");
            let lines = gateway.order_lines(order_id).await?;

            let mut registry = BundleRegistry::new(&gateway);
            let bundles = registry.list_all_bundles().await?;
            tracing::info!(bundles = bundles.len(), lines = lines.len(), "processing order");

            for &line in &lines {
                apply_line(&gateway, &mut registry, line, SaleTrigger::OrderWebhook, None).await?;
            }

            tracing::info!(order_id = %order_id, "inventory updates completed");
            Ok::<_, ReconcileError>(ReconcileSummary {
                trigger: SaleTrigger::OrderWebhook,
                order_id: Some(order_id),
                lines,
                processed_at: Utc::now(),
            })
        }
        .instrument(span)
        .await
    }

    /// Validate a definition and report the stock it could start with. Writes nothing.
    pub async fn check_bundle(
        &self,
        config: &StoreConfig,
        bundle: BundleDefinition,
    ) -> Result<BundleCheck, ReconcileError> {
        let errors = validate(&bundle);
        let credentials = config.credentials()?;
        let gateway = self.connector.connect(&credentials);

        let snapshot = gateway.fetch_levels(&bundle.linked_product_ids).await?;
        let achievable = initial_stock(&bundle.linked_product_ids, &bundle.product_quantities, &snapshot);

        tracing::debug!(bundle_id = %bundle.id, errors = errors.len(), achievable, "bundle checked");
        Ok(BundleCheck {
            valid: errors.is_empty(),
            errors,
            achievable_stock: achievable,
        })
    }
}

fn pass_span(trigger: SaleTrigger) -> tracing::Span {
    tracing::info_span!(
        "reconcile",
        pass_id = %Uuid::now_v7(),
        trigger = trigger.as_str()
    )
}

/// Reconcile a single sold line.
///
/// `known_level` is the sold product's level when the caller already read it.
async fn apply_line<G>(
    gateway: &G,
    registry: &mut BundleRegistry<'_, G>,
    line: SaleLine,
    trigger: SaleTrigger,
    known_level: Option<i64>,
) -> Result<(), ReconcileError>
where
    G: StockLedger + BundleMetadataStore + OrderLookup,
{
    match registry.definition(line.product_id).await? {
        Some(bundle) => sell_bundle(gateway, &bundle, line.quantity).await,
        None => sell_plain_product(gateway, registry, line, trigger, known_level).await,
    }
}

async fn sell_bundle<G>(gateway: &G, bundle: &BundleDefinition, units: u32) -> Result<(), ReconcileError>
where
    G: StockLedger,
{
    tracing::info!(bundle_id = %bundle.id, units, "bundle sold");

    let snapshot = gateway.fetch_levels(&bundle.linked_product_ids).await?;
    for delta in sale_deltas(bundle, units, &snapshot) {
        tracing::info!(
            product_id = %delta.product_id,
            from = snapshot.level(delta.product_id),
            to = delta.new_level,
            "reducing stock for bundled product"
        );
        gateway.write_level(delta.product_id, delta.new_level).await?;
    }
    Ok(())
}

async fn sell_plain_product<G>(
    gateway: &G,
    registry: &mut BundleRegistry<'_, G>,
    line: SaleLine,
    trigger: SaleTrigger,
    known_level: Option<i64>,
) -> Result<(), ReconcileError>
where
    G: StockLedger + BundleMetadataStore,
{
    tracing::info!(product_id = %line.product_id, units = line.quantity, "individual product sold");

    if trigger.writes_plain_product() {
        let current = match known_level {
            Some(level) => level,
            None => gateway
                .fetch_level(line.product_id)
                .await?
                .ok_or(ReconcileError::NotFound(line.product_id))?,
        };
        let new_level = current.saturating_sub(i64::from(line.quantity)).max(0);
        tracing::info!(product_id = %line.product_id, from = current, to = new_level, "reducing stock");
        gateway.write_level(line.product_id, new_level).await?;
    }

    let bundles = registry.list_bundles_referencing(line.product_id).await?;
    tracing::info!(product_id = %line.product_id, bundles = bundles.len(), "recomputing dependent bundles");

    for bundle in &bundles {
        let snapshot = gateway.fetch_levels(&bundle.linked_product_ids).await?;
        let stock = achievable_stock(bundle, &snapshot);
        tracing::info!(bundle_id = %bundle.id, stock, "updating bundle stock");
        gateway.write_level(bundle.id, stock).await?;
    }
    Ok(())
}
