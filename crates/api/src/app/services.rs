use bundlestock_infra::{ReconciliationService, StoreConfig, StorefrontConnector};

/// Shared state handed to every handler.
pub struct AppServices<C> {
    pub config: StoreConfig,
    pub reconciler: ReconciliationService<C>,
}

impl<C> AppServices<C>
where
    C: StorefrontConnector,
{
    pub fn new(config: StoreConfig, connector: C) -> Self {
        Self {
            config,
            reconciler: ReconciliationService::new(connector),
        }
    }
}
