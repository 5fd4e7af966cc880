use std::sync::Arc;

use axum::{
    Json,
    extract::{Extension, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};

use bundlestock_infra::{SimulateSale, StorefrontConnector};

use crate::app::services::AppServices;
use crate::app::{dto, errors};

/// `POST /api/test/simulate-sale`: apply a sale without a real order.
pub async fn simulate_sale<C>(
    Extension(services): Extension<Arc<AppServices<C>>>,
    body: Result<Json<SimulateSale>, JsonRejection>,
) -> axum::response::Response
where
    C: StorefrontConnector + 'static,
{
    let request = match dto::json_body(body) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.reconciler.simulate_sale(&services.config, request).await {
        Ok(summary) => (StatusCode::OK, Json(dto::SimulateSaleResponse::from(&summary))).into_response(),
        Err(e) => errors::reconcile_error_to_response(e),
    }
}
