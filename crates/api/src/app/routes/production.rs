use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use chrono::Utc;

use wagonops_core::ProjectId;
use wagonops_inventory::{consume_deltas, produce_deltas};
use wagonops_production::{
    DailyReport, MonthlyPlan, Period, WagonLogEntry, pullout_totals,
};

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/daily-report", post(submit_daily_report))
        .route("/pullout", post(pullout))
        .route("/log/:project_id", get(wagon_log))
        .route("/monthly-planning", post(create_plan).get(list_plans))
}

/// One commit covers the whole report: produced increments, consumption
/// decrements and the log row land together or not at all.
pub async fn submit_daily_report(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<serde_json::Value>,
) -> axum::response::Response {
    let report: DailyReport = match dto::parse_body(body) {
        Ok(v) => v,
        Err(r) => return r,
    };
    let report = match report.validate() {
        Ok(r) => r,
        Err(e) => return errors::domain_error_to_response(e),
    };

    // An unknown wagon type rejects the whole report; nothing is applied.
    let bom = match services.store.bom_find(report.wagon_type.as_str()).await {
        Ok(Some(b)) => b,
        Ok(None) => {
            return errors::json_error(
                StatusCode::NOT_FOUND,
                "not_found",
                format!("no BOM for wagon type '{}'", report.wagon_type),
            );
        }
        Err(e) => return errors::store_error_to_response(e),
    };

    let consumed = bom.consumption(&report.stages_completed);

    let mut deltas = produce_deltas(&report.parts_produced);
    deltas.extend(consume_deltas(&consumed));

    let entry = report.into_log_entry(consumed, Utc::now());

    match services.store.submit_daily_report(deltas, entry).await {
        Ok(entry) => {
            tracing::info!(
                project_id = %entry.project_id,
                date = %entry.date,
                pdi = entry.pdi_count,
                "daily report committed"
            );
            (StatusCode::CREATED, Json(entry)).into_response()
        }
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn pullout(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<serde_json::Value>,
) -> axum::response::Response {
    let req: dto::PulloutRequest = match dto::parse_body(body) {
        Ok(v) => v,
        Err(r) => return r,
    };
    if req.count == 0 {
        return errors::json_error(
            StatusCode::BAD_REQUEST,
            "validation_error",
            "count must be positive",
        );
    }

    let now = Utc::now();
    let date = req.date.unwrap_or_else(|| now.date_naive());
    let entry = WagonLogEntry::pullout(req.project_id.clone(), date, req.count, now);
    let sale =
        wagonops_production::DailyUpdate::from_pullout(req.project_id, date, req.count, now);

    match services.store.commit_pullout(entry, sale).await {
        Ok(entry) => {
            tracing::info!(
                project_id = %entry.project_id,
                count = entry.pullout_done,
                "pullout committed"
            );
            (StatusCode::CREATED, Json(entry)).into_response()
        }
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn wagon_log(
    Extension(services): Extension<Arc<AppServices>>,
    Path(project_id): Path<String>,
    Query(query): Query<dto::LogQuery>,
) -> axum::response::Response {
    let project_id = match project_id.parse::<ProjectId>() {
        Ok(p) => p,
        Err(e) => return errors::domain_error_to_response(e),
    };
    let period = match (query.year, query.month) {
        (Some(year), Some(month)) => Some(Period { year, month }),
        _ => None,
    };

    let entries = match services.store.wagon_log(&project_id).await {
        Ok(v) => v,
        Err(e) => return errors::store_error_to_response(e),
    };

    let totals = pullout_totals(&entries, period);
    let entries: Vec<_> = match period {
        Some(p) => entries.into_iter().filter(|e| p.contains(e.date)).collect(),
        None => entries,
    };

    Json(serde_json::json!({
        "entries": entries,
        "totals": totals,
    }))
    .into_response()
}

pub async fn create_plan(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<serde_json::Value>,
) -> axum::response::Response {
    let req: dto::PlanningRequest = match dto::parse_body(body) {
        Ok(v) => v,
        Err(r) => return r,
    };
    let (year, month_num) = match MonthlyPlan::parse_month(&req.month) {
        Ok(v) => v,
        Err(e) => return errors::domain_error_to_response(e),
    };

    let plan = MonthlyPlan {
        id: wagonops_core::EntryId::new(),
        project_id: req.project_id,
        client_name: req.client_name,
        client_type: req.client_type,
        wagon_type: req.wagon_type,
        month: req.month.trim().to_string(),
        month_num,
        year,
        monthly_target: req.monthly_target,
        created_at: Utc::now(),
    };

    match services.store.plan_create(plan).await {
        Ok(plan) => (StatusCode::CREATED, Json(plan)).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

/// Planning list view: each plan carries the project's derived pullout
/// totals for its month, computed by the same rollup the pullout check uses.
pub async fn list_plans(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    let plans = match services.store.plan_list().await {
        Ok(v) => v,
        Err(e) => return errors::store_error_to_response(e),
    };

    let mut out = Vec::with_capacity(plans.len());
    for plan in plans {
        let entries = match services.store.wagon_log(&plan.project_id).await {
            Ok(v) => v,
            Err(e) => return errors::store_error_to_response(e),
        };
        let totals = pullout_totals(
            &entries,
            Some(Period {
                year: plan.year,
                month: plan.month_num,
            }),
        );

        let mut row = match serde_json::to_value(&plan) {
            Ok(serde_json::Value::Object(m)) => m,
            _ => {
                return errors::json_error(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "serialize_error",
                    "could not serialize plan",
                );
            }
        };
        match serde_json::to_value(totals) {
            Ok(v) => {
                row.insert("totals".to_string(), v);
            }
            Err(e) => {
                return errors::json_error(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "serialize_error",
                    e.to_string(),
                );
            }
        }
        out.push(serde_json::Value::Object(row));
    }

    Json(out).into_response()
}
