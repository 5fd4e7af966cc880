use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use bundlestock_infra::ReconcileError;

pub fn reconcile_error_to_response(err: ReconcileError) -> axum::response::Response {
    let status = match &err {
        ReconcileError::Validation(_) => StatusCode::BAD_REQUEST,
        ReconcileError::NotFound(_) => StatusCode::NOT_FOUND,
        ReconcileError::MethodNotSupported => StatusCode::METHOD_NOT_ALLOWED,
        ReconcileError::Configuration(_) | ReconcileError::Upstream(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };

    match &err {
        ReconcileError::Upstream(e) => tracing::error!(error = %e, "storefront call failed"),
        ReconcileError::Configuration(e) => tracing::error!(error = %e, "store is not configured"),
        other => tracing::warn!(error = %other, "request rejected"),
    }

    json_error(status, err.code(), err.to_string())
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

/// Fallback for trigger routes hit with anything but POST.
pub async fn method_not_allowed() -> axum::response::Response {
    reconcile_error_to_response(ReconcileError::MethodNotSupported)
}
