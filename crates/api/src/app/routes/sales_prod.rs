use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};

use wagonops_analytics::{AchievementRow, FiscalYear, PlanRow, Segment, analytics};

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/plan", post(upsert_plan))
        .route("/achievement", post(upsert_achievement))
        .route("/analytics", get(get_analytics))
}

pub async fn upsert_plan(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<serde_json::Value>,
) -> axum::response::Response {
    let req: dto::SalesPlanRequest = match dto::parse_body(body) {
        Ok(v) => v,
        Err(r) => return r,
    };
    let segment = match Segment::parse(&req.segment) {
        Ok(s) => s,
        Err(e) => return errors::domain_error_to_response(e),
    };

    let row = PlanRow {
        fy: req.fy.trim().to_string(),
        month: req.month.trim().to_string(),
        segment,
        plan: req.plan,
    };
    match services.store.sales_plan_upsert(row.clone()).await {
        Ok(()) => Json(row).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn upsert_achievement(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<serde_json::Value>,
) -> axum::response::Response {
    let req: dto::SalesAchievementRequest = match dto::parse_body(body) {
        Ok(v) => v,
        Err(r) => return r,
    };
    let segment = match Segment::parse(&req.segment) {
        Ok(s) => s,
        Err(e) => return errors::domain_error_to_response(e),
    };

    let row = AchievementRow {
        fy: req.fy.trim().to_string(),
        month: req.month.trim().to_string(),
        segment,
        achieved: req.achieved,
    };
    match services.store.sales_achievement_upsert(row.clone()).await {
        Ok(()) => Json(row).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn get_analytics(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<dto::AnalyticsQuery>,
) -> axum::response::Response {
    let fy = match FiscalYear::parse(&query.fy) {
        Ok(v) => v,
        Err(e) => return errors::domain_error_to_response(e),
    };
    let compare_fy = match &query.compare_fy {
        Some(raw) => match FiscalYear::parse(raw) {
            Ok(v) => v,
            Err(e) => return errors::domain_error_to_response(e),
        },
        None => fy.prev(),
    };

    let store = &services.store;
    let plans = match store.sales_plans_for_fy(&fy.label()).await {
        Ok(v) => v,
        Err(e) => return errors::store_error_to_response(e),
    };
    let achievements = match store.sales_achievements_for_fy(&fy.label()).await {
        Ok(v) => v,
        Err(e) => return errors::store_error_to_response(e),
    };
    let plans_prev = match store.sales_plans_for_fy(&compare_fy.label()).await {
        Ok(v) => v,
        Err(e) => return errors::store_error_to_response(e),
    };
    let achievements_prev = match store.sales_achievements_for_fy(&compare_fy.label()).await {
        Ok(v) => v,
        Err(e) => return errors::store_error_to_response(e),
    };

    (
        StatusCode::OK,
        Json(analytics(
            &fy,
            &compare_fy,
            &plans,
            &achievements,
            &plans_prev,
            &achievements_prev,
        )),
    )
        .into_response()
}
