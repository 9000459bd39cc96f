use axum::{Router, routing::get};

pub mod auth;
pub mod daily_updates;
pub mod inventory;
pub mod production;
pub mod sales_prod;
pub mod system;
pub mod uploads;
pub mod wagons;

/// Router for all authenticated endpoints.
pub fn router() -> Router {
    Router::new()
        .route("/whoami", get(system::whoami))
        .nest("/wagons", wagons::router())
        .nest("/inventory", inventory::router())
        .nest("/production", production::router())
        .nest("/daily-updates", daily_updates::router())
        .nest("/sales-prod", sales_prod::router())
        .nest("/uploads", uploads::router())
}
