//! HTTP application wiring (Axum router + service wiring).
//!
//! - `services.rs`: store configuration and the reconciliation service
//! - `routes/`: HTTP routes + handlers (one file per trigger surface)
//! - `dto.rs`: request/response bodies
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{Extension, Router, routing::get};
use tower::ServiceBuilder;

use bundlestock_infra::{StoreConfig, StorefrontConnector};

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

use services::AppServices;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub fn build_app<C>(config: StoreConfig, connector: C) -> Router
where
    C: StorefrontConnector + 'static,
{
    let services = Arc::new(AppServices::new(config, connector));

    Router::new()
        .route("/health", get(routes::system::health))
        .nest("/api", routes::router::<C>())
        .layer(ServiceBuilder::new().layer(Extension(services)))
}
