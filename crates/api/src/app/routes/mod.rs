use axum::{Router, routing::post};

use bundlestock_infra::StorefrontConnector;

use crate::app::errors;

pub mod bundles;
pub mod sales;
pub mod system;
pub mod webhooks;

/// Router for everything under `/api`.
pub fn router<C>() -> Router
where
    C: StorefrontConnector + 'static,
{
    Router::new()
        .route(
            "/test/simulate-sale",
            post(sales::simulate_sale::<C>).fallback(errors::method_not_allowed),
        )
        .route(
            "/webhooks/orders",
            post(webhooks::order_created::<C>).fallback(errors::method_not_allowed),
        )
        .route(
            "/bundles/check",
            post(bundles::check_bundle::<C>).fallback(errors::method_not_allowed),
        )
}
