use anyhow::Context;

use bundlestock_infra::{HttpConnector, StoreConfig};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    bundlestock_observability::init();

    let config = StoreConfig::from_env();
    if config.credentials().is_err() {
        tracing::warn!("STORE_HASH or ACCESS_TOKEN not set; sale triggers will fail until configured");
    }

    let app = bundlestock_api::app::build_app(config, HttpConnector::default());

    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {bind_addr}"))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
