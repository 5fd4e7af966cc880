//! REST client for a live store.
//!
//! Catalog reads/writes go through the V3 catalog API; order line items come
//! from the V2 orders API. Every request carries the store's `X-Auth-Token`.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;

use bundlestock_bundles::metadata::NAMESPACE;
use bundlestock_bundles::{BundleMetadata, Metafield, SaleLine};
use bundlestock_core::{OrderId, ProductId};

use crate::config::StoreCredentials;
use crate::gateway::{BundleMetadataStore, GatewayError, OrderLookup, StockLedger};
use crate::storefront::StorefrontConnector;

const AUTH_HEADER: &str = "X-Auth-Token";
const PAGE_LIMIT: u32 = 250;

/// Connector producing one `StorefrontClient` per pass, sharing a connection pool.
#[derive(Debug, Clone, Default)]
pub struct HttpConnector {
    http: Client,
}

impl HttpConnector {
    pub fn new(http: Client) -> Self {
        Self { http }
    }
}

impl StorefrontConnector for HttpConnector {
    type Gateway = StorefrontClient;

    fn connect(&self, credentials: &StoreCredentials) -> Self::Gateway {
        StorefrontClient::new(self.http.clone(), credentials)
    }
}

pub struct StorefrontClient {
    http: Client,
    store_url: String,
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: T,
    #[serde(default)]
    meta: Option<Meta>,
}

#[derive(Debug, Deserialize)]
struct Meta {
    pagination: Option<Pagination>,
}

#[derive(Debug, Deserialize)]
struct Pagination {
    current_page: u32,
    total_pages: u32,
}

#[derive(Debug, Deserialize)]
struct CatalogProduct {
    inventory_level: i64,
}

#[derive(Debug, Deserialize)]
struct ProductRef {
    id: u64,
}

#[derive(Debug, Deserialize)]
struct OrderProduct {
    product_id: u64,
    quantity: u32,
}

impl StorefrontClient {
    pub fn new(http: Client, credentials: &StoreCredentials) -> Self {
        Self {
            http,
            store_url: credentials.store_url(),
            access_token: credentials.access_token.clone(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.store_url, path)
    }

    async fn send_get(&self, path: &str) -> Result<reqwest::Response, GatewayError> {
        self.http
            .get(self.url(path))
            .header(AUTH_HEADER, &self.access_token)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| GatewayError::Network(e.to_string()))
    }

    /// GET `path`; `Ok(None)` on 404.
    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<Option<T>, GatewayError> {
        let resp = self.send_get(path).await?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let resp = ensure_success(resp, path).await?;
        decode(resp, path).await.map(Some)
    }

    /// One page of a V2 collection. V2 answers an empty page with 204 No Content.
    async fn get_v2_page<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>, GatewayError> {
        let resp = self.send_get(path).await?;
        if resp.status() == StatusCode::NO_CONTENT {
            return Ok(Vec::new());
        }
        let resp = ensure_success(resp, path).await?;
        decode(resp, path).await
    }

    async fn get_required<T: DeserializeOwned>(&self, path: &str) -> Result<T, GatewayError> {
        self.get_json(path).await?.ok_or_else(|| GatewayError::Status {
            status: StatusCode::NOT_FOUND.as_u16(),
            path: path.to_string(),
            body: String::new(),
        })
    }
}

async fn decode<T: DeserializeOwned>(resp: reqwest::Response, path: &str) -> Result<T, GatewayError> {
    resp.json::<T>().await.map_err(|e| GatewayError::UnexpectedPayload {
        path: path.to_string(),
        reason: e.to_string(),
    })
}

async fn ensure_success(resp: reqwest::Response, path: &str) -> Result<reqwest::Response, GatewayError> {
    if resp.status().is_success() {
        return Ok(resp);
    }
    let status = resp.status().as_u16();
    let body = resp.text().await.unwrap_or_default();
    Err(GatewayError::Status {
        status,
        path: path.to_string(),
        body,
    })
}

fn product_id(raw: u64, path: &str) -> Result<ProductId, GatewayError> {
    ProductId::new(raw).map_err(|e| GatewayError::UnexpectedPayload {
        path: path.to_string(),
        reason: e.to_string(),
    })
}

fn product_path(product_id: ProductId) -> String {
    format!("/v3/catalog/products/{product_id}")
}

fn has_more_pages(meta: Option<&Meta>) -> bool {
    meta.and_then(|m| m.pagination.as_ref())
        .is_some_and(|p| p.current_page < p.total_pages)
}

#[async_trait]
impl StockLedger for StorefrontClient {
    async fn fetch_level(&self, product_id: ProductId) -> Result<Option<i64>, GatewayError> {
        let path = format!("{}?include_fields=inventory_level", product_path(product_id));
        let envelope: Option<Envelope<CatalogProduct>> = self.get_json(&path).await?;
        Ok(envelope.map(|e| e.data.inventory_level))
    }

    async fn write_level(&self, product_id: ProductId, level: i64) -> Result<(), GatewayError> {
        let path = product_path(product_id);
        let resp = self
            .http
            .put(self.url(&path))
            .header(AUTH_HEADER, &self.access_token)
            .header(reqwest::header::ACCEPT, "application/json")
            .json(&serde_json::json!({ "inventory_level": level }))
            .send()
            .await
            .map_err(|e| GatewayError::Network(e.to_string()))?;

        ensure_success(resp, &path).await?;
        Ok(())
    }
}

#[async_trait]
impl BundleMetadataStore for StorefrontClient {
    async fn product_ids(&self) -> Result<Vec<ProductId>, GatewayError> {
        let mut ids = Vec::new();
        let mut page = 1u32;

        loop {
            let path = format!("/v3/catalog/products?include_fields=id&limit={PAGE_LIMIT}&page={page}");
            let envelope: Envelope<Vec<ProductRef>> = self.get_required(&path).await?;
            for product in &envelope.data {
                ids.push(product_id(product.id, &path)?);
            }
            if !has_more_pages(envelope.meta.as_ref()) {
                break;
            }
            page += 1;
        }

        Ok(ids)
    }

    async fn bundle_metadata(&self, product_id: ProductId) -> Result<BundleMetadata, GatewayError> {
        let mut fields = Vec::new();
        let mut page = 1u32;

        loop {
            let path = format!(
                "{}/metafields?namespace={NAMESPACE}&limit={PAGE_LIMIT}&page={page}",
                product_path(product_id)
            );
            let Some(envelope) = self.get_json::<Envelope<Vec<Metafield>>>(&path).await? else {
                break;
            };
            fields.extend(envelope.data);
            if !has_more_pages(envelope.meta.as_ref()) {
                break;
            }
            page += 1;
        }

        Ok(BundleMetadata::from_metafields(&fields))
    }
}

#[async_trait]
impl OrderLookup for StorefrontClient {
    async fn order_lines(&self, order_id: OrderId) -> Result<Vec<SaleLine>, GatewayError> {
        let mut lines = Vec::new();
        let mut page = 1u32;

        // V2 has no pagination metadata; a short page is the last one.
        loop {
            let path = format!("/v2/orders/{order_id}/products?limit={PAGE_LIMIT}&page={page}");
            let products: Vec<OrderProduct> = self.get_v2_page(&path).await?;
            let fetched = products.len();
            for p in products {
                lines.push(SaleLine::new(product_id(p.product_id, &path)?, Some(p.quantity)));
            }
            if fetched < PAGE_LIMIT as usize {
                break;
            }
            page += 1;
        }

        Ok(lines)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StoreConfig;

    fn client() -> StorefrontClient {
        let creds = StoreConfig::new("abc123", "token").credentials().unwrap();
        StorefrontClient::new(Client::new(), &creds)
    }

    #[test]
    fn urls_are_rooted_at_the_store() {
        let pid = ProductId::new(7).unwrap();
        assert_eq!(
            client().url(&product_path(pid)),
            "https://api.bigcommerce.com/stores/abc123/v3/catalog/products/7"
        );
    }

    #[test]
    fn decodes_catalog_product_envelopes() {
        let body = r#"{"data": {"id": 1, "inventory_level": 10, "name": "Product A"}, "meta": {}}"#;
        let envelope: Envelope<CatalogProduct> = serde_json::from_str(body).unwrap();
        assert_eq!(envelope.data.inventory_level, 10);
        assert!(!has_more_pages(envelope.meta.as_ref()));
    }

    #[test]
    fn follows_pagination_metadata() {
        let body = r#"{"data": [{"id": 1}], "meta": {"pagination": {"current_page": 1, "total_pages": 3}}}"#;
        let envelope: Envelope<Vec<ProductRef>> = serde_json::from_str(body).unwrap();
        assert!(has_more_pages(envelope.meta.as_ref()));
    }

    #[test]
    fn decodes_metafields_into_bundle_metadata() {
        let body = r#"{"data": [
            {"key": "is_bundle", "namespace": "bundle", "value": "true"},
            {"key": "linked_product_ids", "namespace": "bundle", "value": "[1, 2]"},
            {"key": "product_quantities", "namespace": "bundle", "value": "{\"1\": 2, \"2\": 1}"}
        ]}"#;
        let envelope: Envelope<Vec<Metafield>> = serde_json::from_str(body).unwrap();
        let meta = BundleMetadata::from_metafields(&envelope.data);
        let bundle = meta.to_definition(ProductId::new(100).unwrap()).unwrap();
        assert_eq!(bundle.linked_product_ids.len(), 2);
    }

    #[test]
    fn rejects_zero_product_ids_in_payloads() {
        assert!(matches!(
            product_id(0, "/v2/orders/1/products"),
            Err(GatewayError::UnexpectedPayload { .. })
        ));
    }

    mod against_mock_store {
        use std::collections::HashMap;
        use std::sync::Arc;
        use std::sync::atomic::{AtomicUsize, Ordering};

        use axum::extract::{Path, Query, State};
        use axum::http::StatusCode;
        use axum::response::{IntoResponse, Response};
        use axum::routing::get;
        use axum::{Json, Router};
        use serde_json::json;

        use super::*;

        /// Serves `order_lines` products for every order (except 404) and a
        /// bundle record split over two metafield pages.
        struct MockStore {
            order_lines: usize,
            requests: AtomicUsize,
        }

        struct MockServer {
            store: Arc<MockStore>,
            client: StorefrontClient,
            handle: tokio::task::JoinHandle<()>,
        }

        impl MockServer {
            async fn spawn(order_lines: usize) -> Self {
                let store = Arc::new(MockStore {
                    order_lines,
                    requests: AtomicUsize::new(0),
                });
                let app = Router::new()
                    .route("/stores/s/v2/orders/:id/products", get(order_products))
                    .route("/stores/s/v3/catalog/products/:id/metafields", get(metafields))
                    .with_state(Arc::clone(&store));

                let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
                let addr = listener.local_addr().unwrap();
                let handle = tokio::spawn(async move {
                    axum::serve(listener, app).await.unwrap();
                });

                let creds = StoreConfig::new("s", "token")
                    .with_api_base(format!("http://{addr}"))
                    .credentials()
                    .unwrap();
                let client = StorefrontClient::new(Client::new(), &creds);

                Self { store, client, handle }
            }

            fn requests(&self) -> usize {
                self.store.requests.load(Ordering::SeqCst)
            }
        }

        impl Drop for MockServer {
            fn drop(&mut self) {
                self.handle.abort();
            }
        }

        fn page_params(query: &HashMap<String, String>) -> (usize, usize) {
            let read = |key: &str, default: usize| {
                query.get(key).and_then(|v| v.parse().ok()).unwrap_or(default)
            };
            (read("limit", 50), read("page", 1))
        }

        async fn order_products(
            State(store): State<Arc<MockStore>>,
            Path(order_id): Path<u64>,
            Query(query): Query<HashMap<String, String>>,
        ) -> Response {
            store.requests.fetch_add(1, Ordering::SeqCst);
            if order_id == 404 {
                return StatusCode::NOT_FOUND.into_response();
            }

            let (limit, page) = page_params(&query);
            let start = (page - 1) * limit;
            if start >= store.order_lines {
                return StatusCode::NO_CONTENT.into_response();
            }
            let end = (start + limit).min(store.order_lines);
            let items: Vec<_> = (start..end)
                .map(|i| json!({ "id": i + 1, "product_id": i + 1, "quantity": 2 }))
                .collect();
            Json(items).into_response()
        }

        async fn metafields(
            State(store): State<Arc<MockStore>>,
            Query(query): Query<HashMap<String, String>>,
        ) -> Response {
            store.requests.fetch_add(1, Ordering::SeqCst);
            let (_, page) = page_params(&query);
            let data = if page == 1 {
                json!([
                    { "namespace": "bundle", "key": "is_bundle", "value": "true" },
                    { "namespace": "bundle", "key": "linked_product_ids", "value": "[1, 2]" }
                ])
            } else {
                json!([
                    { "namespace": "bundle", "key": "product_quantities", "value": "{\"1\": 2, \"2\": 1}" }
                ])
            };
            Json(json!({
                "data": data,
                "meta": { "pagination": { "current_page": page, "total_pages": 2 } }
            }))
            .into_response()
        }

        fn order(raw: u64) -> OrderId {
            OrderId::new(raw).unwrap()
        }

        #[tokio::test]
        async fn order_lines_span_every_page() {
            let server = MockServer::spawn(300).await;

            let lines = server.client.order_lines(order(1)).await.unwrap();
            assert_eq!(lines.len(), 300);
            assert_eq!(lines[299].product_id, ProductId::new(300).unwrap());
            assert_eq!(lines[299].quantity, 2);
            assert_eq!(server.requests(), 2);
        }

        #[tokio::test]
        async fn full_last_page_ends_on_no_content() {
            let server = MockServer::spawn(250).await;

            let lines = server.client.order_lines(order(1)).await.unwrap();
            assert_eq!(lines.len(), 250);
            assert_eq!(server.requests(), 2);
        }

        #[tokio::test]
        async fn order_without_products_is_empty() {
            let server = MockServer::spawn(0).await;

            let lines = server.client.order_lines(order(1)).await.unwrap();
            assert!(lines.is_empty());
            assert_eq!(server.requests(), 1);
        }

        #[tokio::test]
        async fn unknown_order_is_a_status_error() {
            let server = MockServer::spawn(10).await;

            let err = server.client.order_lines(order(404)).await.unwrap_err();
            assert!(matches!(err, GatewayError::Status { status: 404, .. }));
        }

        #[tokio::test]
        async fn bundle_metadata_is_gathered_across_pages() {
            let server = MockServer::spawn(0).await;

            let meta = server.client.bundle_metadata(ProductId::new(100).unwrap()).await.unwrap();
            let bundle = meta.to_definition(ProductId::new(100).unwrap()).unwrap();
            assert_eq!(bundle.required_quantity(ProductId::new(1).unwrap()), 2);
            assert_eq!(server.requests(), 2);
        }
    }
}
