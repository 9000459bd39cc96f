//! Binary upload storage (dashboard images and similar).

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use uuid::Uuid;

use crate::store::StoreError;

/// Caller-supplied metadata for an upload.
#[derive(Debug, Clone)]
pub struct BlobMetadata {
    pub file_name: String,
    pub content_type: String,
}

/// Where a stored upload ended up.
#[derive(Debug, Clone, serde::Serialize)]
pub struct StoredBlob {
    pub id: Uuid,
    pub url: String,
}

#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn put(&self, meta: BlobMetadata, bytes: Vec<u8>) -> Result<StoredBlob, StoreError>;
}

/// Stores uploads as `<root>/<uuid><ext>` and serves them under a public
/// base path. The original file name only contributes its extension; the
/// rest is discarded so uploads can never collide or traverse paths.
pub struct LocalDiskBlobStore {
    root: PathBuf,
    public_base: String,
}

impl LocalDiskBlobStore {
    pub fn new(root: impl Into<PathBuf>, public_base: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            public_base: public_base.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

fn safe_extension(file_name: &str) -> Option<&str> {
    let ext = Path::new(file_name).extension()?.to_str()?;
    let ok = !ext.is_empty()
        && ext.len() <= 8
        && ext.bytes().all(|b| b.is_ascii_alphanumeric());
    ok.then_some(ext)
}

#[async_trait]
impl BlobStore for LocalDiskBlobStore {
    async fn put(&self, meta: BlobMetadata, bytes: Vec<u8>) -> Result<StoredBlob, StoreError> {
        let id = Uuid::now_v7();
        let stored_name = match safe_extension(&meta.file_name) {
            Some(ext) => format!("{id}.{ext}"),
            None => id.to_string(),
        };

        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|e| StoreError::backend(format!("create upload dir: {e}")))?;
        tokio::fs::write(self.root.join(&stored_name), bytes)
            .await
            .map_err(|e| StoreError::backend(format!("write upload: {e}")))?;

        tracing::info!(
            %id,
            file_name = %meta.file_name,
            content_type = %meta.content_type,
            "stored upload"
        );

        Ok(StoredBlob {
            id,
            url: format!("{}/{stored_name}", self.public_base.trim_end_matches('/')),
        })
    }
}
