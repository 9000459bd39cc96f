//! Request DTOs and body parsing.
//!
//! Handlers take `Json<serde_json::Value>` and parse through [`parse_body`]
//! so malformed or incomplete bodies produce the normalized 400 envelope
//! instead of the framework's default rejection.

use axum::http::StatusCode;
use chrono::NaiveDate;
use serde::Deserialize;
use serde::de::DeserializeOwned;

use wagonops_bom::{PartRequirement, Stage};
use wagonops_core::ProjectId;

use crate::app::errors;

pub fn parse_body<T: DeserializeOwned>(
    value: serde_json::Value,
) -> Result<T, axum::response::Response> {
    serde_json::from_value(value).map_err(|e| {
        errors::json_error(StatusCode::BAD_REQUEST, "validation_error", e.to_string())
    })
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveBomRequest {
    pub wagon_type: String,
    #[serde(default)]
    pub parts: Vec<PartRequirement>,
    #[serde(default)]
    pub stages: Vec<Stage>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PulloutRequest {
    pub project_id: ProjectId,
    pub count: u32,
    /// Defaults to today when omitted.
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct LogQuery {
    pub year: Option<i32>,
    pub month: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanningRequest {
    pub project_id: ProjectId,
    pub client_name: Option<String>,
    pub client_type: Option<String>,
    pub wagon_type: Option<String>,
    /// "YYYY-MM".
    pub month: String,
    pub monthly_target: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyUpdateRequest {
    pub project_id: ProjectId,
    pub date: NaiveDate,
    pub wagon_sold: i64,
}

#[derive(Debug, Deserialize)]
pub struct SalesPlanRequest {
    pub fy: String,
    pub month: String,
    pub segment: String,
    pub plan: i64,
}

#[derive(Debug, Deserialize)]
pub struct SalesAchievementRequest {
    pub fy: String,
    pub month: String,
    pub segment: String,
    pub achieved: i64,
}

#[derive(Debug, Deserialize)]
pub struct AnalyticsQuery {
    pub fy: String,
    #[serde(rename = "compareFy")]
    pub compare_fy: Option<String>,
}
