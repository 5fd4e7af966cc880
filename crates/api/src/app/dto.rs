use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use bundlestock_bundles::SaleLine;
use bundlestock_infra::{OrderNotification, ReconcileSummary};

use crate::app::errors;

// -------------------------
// Request DTOs
// -------------------------

/// Order webhook envelope: `{"data": {"id": <order id>}}`. Other fields are ignored.
#[derive(Debug, Default, Deserialize)]
pub struct OrderWebhookRequest {
    pub data: Option<OrderWebhookData>,
}

#[derive(Debug, Default, Deserialize)]
pub struct OrderWebhookData {
    pub id: Option<u64>,
}

impl From<OrderWebhookRequest> for OrderNotification {
    fn from(req: OrderWebhookRequest) -> Self {
        OrderNotification {
            order_id: req.data.and_then(|d| d.id),
        }
    }
}

// -------------------------
// Response DTOs
// -------------------------

/// `details` echoes the sold line with its quantity already defaulted.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulateSaleResponse {
    pub message: &'static str,
    pub details: Option<SaleLine>,
    pub processed_at: DateTime<Utc>,
}

impl From<&ReconcileSummary> for SimulateSaleResponse {
    fn from(summary: &ReconcileSummary) -> Self {
        Self {
            message: "Sale simulated successfully",
            details: summary.lines.first().copied(),
            processed_at: summary.processed_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderWebhookResponse {
    pub message: &'static str,
    pub order_id: Option<u64>,
    pub lines_processed: usize,
    pub processed_at: DateTime<Utc>,
}

impl From<&ReconcileSummary> for OrderWebhookResponse {
    fn from(summary: &ReconcileSummary) -> Self {
        Self {
            message: "Stock levels updated successfully",
            order_id: summary.order_id.map(u64::from),
            lines_processed: summary.lines.len(),
            processed_at: summary.processed_at,
        }
    }
}

// -------------------------
// Helpers
// -------------------------

/// Unwrap a JSON body, turning extractor rejections into the API's 400 shape.
pub fn json_body<T>(
    body: Result<axum::Json<T>, JsonRejection>,
) -> Result<T, axum::response::Response> {
    body.map(|axum::Json(inner)| inner).map_err(|rejection| {
        errors::json_error(StatusCode::BAD_REQUEST, "validation_error", rejection.body_text())
    })
}
