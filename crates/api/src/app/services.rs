//! Infrastructure wiring behind the handlers.

use std::sync::Arc;

use anyhow::Context;

use wagonops_auth::{CredentialStore, Hs256TokenService};
use wagonops_infra::{
    BlobStore, InMemoryOpsStore, LocalDiskBlobStore, OpsStore, PostgresOpsStore,
};

use crate::config::AppConfig;

pub struct AppServices {
    pub store: Arc<dyn OpsStore>,
    pub blobs: Arc<dyn BlobStore>,
    pub credentials: CredentialStore,
    pub tokens: Arc<Hs256TokenService>,
}

pub async fn build_services(config: &AppConfig) -> anyhow::Result<AppServices> {
    let store: Arc<dyn OpsStore> = match &config.database_url {
        Some(url) => {
            let store = PostgresOpsStore::connect(url)
                .await
                .context("connecting persistent store")?;
            tracing::info!("using postgres store");
            Arc::new(store)
        }
        None => {
            tracing::info!("using in-memory store");
            Arc::new(InMemoryOpsStore::new())
        }
    };

    let blobs: Arc<dyn BlobStore> = Arc::new(LocalDiskBlobStore::new(
        config.uploads_dir.clone(),
        config.uploads_public_base.clone(),
    ));

    let credentials =
        CredentialStore::from_spec(&config.auth_users).context("parsing AUTH_USERS")?;
    if credentials.is_empty() {
        anyhow::bail!("AUTH_USERS resolved to an empty user list");
    }

    let tokens = Arc::new(Hs256TokenService::new(config.jwt_secret.as_bytes()));

    Ok(AppServices {
        store,
        blobs,
        credentials,
        tokens,
    })
}
