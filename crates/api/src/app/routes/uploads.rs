use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Multipart},
    http::StatusCode,
    response::IntoResponse,
    routing::post,
};

use wagonops_infra::BlobMetadata;

use crate::app::errors;
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new().route("/dashboard", post(upload_dashboard))
}

pub async fn upload_dashboard(
    Extension(services): Extension<Arc<AppServices>>,
    mut multipart: Multipart,
) -> axum::response::Response {
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(f)) => f,
            Ok(None) => break,
            Err(e) => {
                return errors::json_error(
                    StatusCode::BAD_REQUEST,
                    "validation_error",
                    e.to_string(),
                );
            }
        };
        if field.name() != Some("file") {
            continue;
        }

        let meta = BlobMetadata {
            file_name: field.file_name().unwrap_or("upload").to_string(),
            content_type: field
                .content_type()
                .unwrap_or("application/octet-stream")
                .to_string(),
        };
        let bytes = match field.bytes().await {
            Ok(b) => b,
            Err(e) => {
                return errors::json_error(
                    StatusCode::BAD_REQUEST,
                    "validation_error",
                    e.to_string(),
                );
            }
        };

        return match services.blobs.put(meta, bytes.to_vec()).await {
            Ok(blob) => (StatusCode::CREATED, Json(blob)).into_response(),
            Err(e) => errors::store_error_to_response(e),
        };
    }

    errors::json_error(
        StatusCode::BAD_REQUEST,
        "validation_error",
        "multipart field 'file' is required",
    )
}
