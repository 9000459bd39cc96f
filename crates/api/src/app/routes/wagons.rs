use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};

use wagonops_bom::Bom;
use wagonops_core::WagonType;

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", post(save_bom).get(list_boms))
        .route("/:wagon_type", get(get_wagon))
        .route("/:wagon_type/bom", get(get_wagon_bom))
}

pub async fn save_bom(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<serde_json::Value>,
) -> axum::response::Response {
    let req: dto::SaveBomRequest = match dto::parse_body(body) {
        Ok(v) => v,
        Err(r) => return r,
    };

    let wagon_type = match WagonType::new(&req.wagon_type) {
        Ok(v) => v,
        Err(e) => return errors::domain_error_to_response(e),
    };
    let bom = match Bom::new(wagon_type, req.parts, req.stages) {
        Ok(b) => b,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services.store.bom_save(bom).await {
        Ok(saved) => (StatusCode::CREATED, Json(saved)).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn list_boms(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match services.store.bom_list().await {
        Ok(boms) => Json(boms).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

async fn find_bom(
    services: &AppServices,
    wagon_type: &str,
) -> Result<Bom, axum::response::Response> {
    match services.store.bom_find(wagon_type).await {
        Ok(Some(bom)) => Ok(bom),
        Ok(None) => Err(errors::json_error(
            StatusCode::NOT_FOUND,
            "not_found",
            format!("no BOM for wagon type '{}'", wagon_type.trim()),
        )),
        Err(e) => Err(errors::store_error_to_response(e)),
    }
}

pub async fn get_wagon(
    Extension(services): Extension<Arc<AppServices>>,
    Path(wagon_type): Path<String>,
) -> axum::response::Response {
    match find_bom(&services, &wagon_type).await {
        Ok(bom) => Json(bom).into_response(),
        Err(r) => r,
    }
}

/// Parts/stages view only, for consumers that don't care about the header.
pub async fn get_wagon_bom(
    Extension(services): Extension<Arc<AppServices>>,
    Path(wagon_type): Path<String>,
) -> axum::response::Response {
    match find_bom(&services, &wagon_type).await {
        Ok(bom) => Json(serde_json::json!({
            "wagonType": bom.wagon_type().as_str(),
            "parts": bom.parts(),
            "stages": bom.stages(),
        }))
        .into_response(),
        Err(r) => r,
    }
}
