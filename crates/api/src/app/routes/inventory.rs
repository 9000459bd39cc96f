use std::sync::Arc;

use chrono::Utc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};

use wagonops_core::ProjectId;
use wagonops_inventory::StockReceipt;

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/receipts", post(add_receipt))
        .route("/:project_id", get(ledger_snapshot))
        .route("/:project_id/receipts", get(receipt_history))
}

/// Manual stock-in: increments the Part Ledger per entry and appends a
/// per-part receipt audit row in the same commit.
pub async fn add_receipt(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<serde_json::Value>,
) -> axum::response::Response {
    let receipt: StockReceipt = match dto::parse_body(body) {
        Ok(v) => v,
        Err(r) => return r,
    };
    let receipt = match receipt.validate() {
        Ok(r) => r,
        Err(e) => return errors::domain_error_to_response(e),
    };

    let deltas = receipt.deltas();
    let parts = deltas.len();
    if let Err(e) = services
        .store
        .receipt_commit(&receipt.project_id, deltas, receipt.records(Utc::now()))
        .await
    {
        return errors::store_error_to_response(e);
    }

    tracing::info!(
        project_id = %receipt.project_id,
        parts,
        "stock receipt applied"
    );
    (StatusCode::CREATED, Json(receipt)).into_response()
}

pub async fn receipt_history(
    Extension(services): Extension<Arc<AppServices>>,
    Path(project_id): Path<String>,
) -> axum::response::Response {
    let project_id = match project_id.parse::<ProjectId>() {
        Ok(p) => p,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services.store.receipt_log(&project_id).await {
        Ok(records) => Json(records).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn ledger_snapshot(
    Extension(services): Extension<Arc<AppServices>>,
    Path(project_id): Path<String>,
) -> axum::response::Response {
    let project_id = match project_id.parse::<ProjectId>() {
        Ok(p) => p,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services.store.ledger_snapshot(&project_id).await {
        Ok(snapshot) => Json(snapshot).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}
