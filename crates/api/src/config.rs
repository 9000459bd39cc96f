//! Process configuration, resolved from the environment at startup.

use std::path::PathBuf;

use anyhow::Context;

/// Dev-only logins, used when `AUTH_USERS` is not set.
const DEV_USERS: &str =
    "sales_user:sales123:sales,prod_user:prod123:production,admin_user:admin123:admin";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: String,
    pub jwt_secret: String,
    /// `username:password:role` entries, comma-separated.
    pub auth_users: String,
    pub uploads_dir: PathBuf,
    pub uploads_public_base: String,
    /// `Some` when `USE_PERSISTENT_STORES` is set; otherwise the in-memory
    /// store is used.
    pub database_url: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());

        let jwt_secret = std::env::var("JWT_SECRET").unwrap_or_else(|_| {
            tracing::warn!("JWT_SECRET not set; using insecure dev default");
            "dev-secret".to_string()
        });

        let auth_users = std::env::var("AUTH_USERS").unwrap_or_else(|_| {
            tracing::warn!("AUTH_USERS not set; using dev default logins");
            DEV_USERS.to_string()
        });

        let uploads_dir =
            PathBuf::from(std::env::var("UPLOADS_DIR").unwrap_or_else(|_| "uploads".to_string()));
        let uploads_public_base =
            std::env::var("UPLOADS_PUBLIC_BASE").unwrap_or_else(|_| "/uploads".to_string());

        let persistent = std::env::var("USE_PERSISTENT_STORES")
            .map(|v| matches!(v.trim(), "1" | "true" | "yes"))
            .unwrap_or(false);
        let database_url = if persistent {
            Some(std::env::var("DATABASE_URL").context(
                "USE_PERSISTENT_STORES is set but DATABASE_URL is not",
            )?)
        } else {
            None
        };

        Ok(Self {
            bind_addr,
            jwt_secret,
            auth_users,
            uploads_dir,
            uploads_public_base,
            database_url,
        })
    }
}
