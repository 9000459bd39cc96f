use std::sync::Arc;

use axum::{Json, extract::Extension, http::StatusCode, response::IntoResponse};
use chrono::Utc;

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<serde_json::Value>,
) -> axum::response::Response {
    let req: dto::LoginRequest = match dto::parse_body(body) {
        Ok(v) => v,
        Err(r) => return r,
    };

    let Some(user) = services.credentials.verify(&req.username, &req.password) else {
        return errors::json_error(
            StatusCode::UNAUTHORIZED,
            "invalid_credentials",
            "invalid username or password",
        );
    };

    let token = match services
        .tokens
        .issue(&user.username, user.role.clone(), Utc::now())
    {
        Ok(t) => t,
        Err(e) => {
            tracing::error!(error = %e, "token issue failed");
            return errors::json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "token_error",
                "could not issue token",
            );
        }
    };

    tracing::info!(username = %user.username, role = %user.role, "login");

    Json(serde_json::json!({
        "token": token,
        "role": user.role.as_str(),
    }))
    .into_response()
}
