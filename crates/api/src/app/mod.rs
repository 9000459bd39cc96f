//! HTTP application wiring (Axum router + service wiring).
//!
//! - `services.rs`: store/blob/auth wiring behind `AppServices`
//! - `routes/`: HTTP routes + handlers (one file per area)
//! - `dto.rs`: request DTOs and body parsing
//! - `errors.rs`: the normalized error envelope

use std::sync::Arc;

use axum::{Extension, Router, routing::get, routing::post};

use wagonops_auth::TokenVerifier;

use crate::config::AppConfig;
use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub async fn build_app(config: AppConfig) -> anyhow::Result<Router> {
    let services = Arc::new(services::build_services(&config).await?);

    let auth_state = middleware::AuthState {
        verifier: Arc::clone(&services.tokens) as Arc<dyn TokenVerifier>,
    };

    // Protected routes: bearer token required.
    let protected = routes::router()
        .layer(Extension(Arc::clone(&services)))
        .layer(axum::middleware::from_fn_with_state(
            auth_state,
            middleware::auth_middleware,
        ));

    let public = Router::new()
        .route("/health", get(routes::system::health))
        .route("/auth/login", post(routes::auth::login))
        .layer(Extension(services));

    Ok(public.merge(protected))
}
