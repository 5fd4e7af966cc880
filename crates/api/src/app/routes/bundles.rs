use std::sync::Arc;

use axum::{
    Json,
    extract::{Extension, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};

use bundlestock_bundles::BundleDefinition;
use bundlestock_infra::StorefrontConnector;

use crate::app::services::AppServices;
use crate::app::{dto, errors};

/// `POST /api/bundles/check`: validate a definition and report its starting stock.
///
/// Validator findings come back as data with 200; only a check that could not
/// run is an error.
pub async fn check_bundle<C>(
    Extension(services): Extension<Arc<AppServices<C>>>,
    body: Result<Json<BundleDefinition>, JsonRejection>,
) -> axum::response::Response
where
    C: StorefrontConnector + 'static,
{
    let bundle = match dto::json_body(body) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.reconciler.check_bundle(&services.config, bundle).await {
        Ok(check) => (StatusCode::OK, Json(check)).into_response(),
        Err(e) => errors::reconcile_error_to_response(e),
    }
}
