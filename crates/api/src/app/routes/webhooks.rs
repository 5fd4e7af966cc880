use std::sync::Arc;

use axum::{
    Json,
    extract::{Extension, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};

use bundlestock_infra::StorefrontConnector;

use crate::app::services::AppServices;
use crate::app::{dto, errors};

/// `POST /api/webhooks/orders`: reconcile the line items of a placed order.
///
/// Deliveries are not de-duplicated; a replayed order is applied again.
pub async fn order_created<C>(
    Extension(services): Extension<Arc<AppServices<C>>>,
    body: Result<Json<dto::OrderWebhookRequest>, JsonRejection>,
) -> axum::response::Response
where
    C: StorefrontConnector + 'static,
{
    let request = match dto::json_body(body) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services
        .reconciler
        .process_order(&services.config, request.into())
        .await
    {
        Ok(summary) => (StatusCode::OK, Json(dto::OrderWebhookResponse::from(&summary))).into_response(),
        Err(e) => errors::reconcile_error_to_response(e),
    }
}
