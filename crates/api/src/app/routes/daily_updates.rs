use std::sync::Arc;

use axum::{
    Json, Router,
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use chrono::Utc;

use wagonops_production::DailyUpdate;

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new().route("/", post(add_update).get(list_updates))
}

pub async fn add_update(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<serde_json::Value>,
) -> axum::response::Response {
    let req: dto::DailyUpdateRequest = match dto::parse_body(body) {
        Ok(v) => v,
        Err(r) => return r,
    };

    let update = DailyUpdate::manual(req.project_id, req.date, req.wagon_sold, Utc::now());
    match services.store.daily_update_add(update).await {
        Ok(update) => (StatusCode::CREATED, Json(update)).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn list_updates(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match services.store.daily_updates().await {
        Ok(updates) => Json(updates).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}
