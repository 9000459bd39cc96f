//! `wagonops-infra` — storage backends and blob storage.
//!
//! One store surface ([`store::OpsStore`]) covers every collection the API
//! touches, so multi-step writes (produce → consume → log) can commit behind
//! a single boundary. Two implementations: an in-memory store for dev/test
//! and a Postgres store for deployment, selected at startup.

pub mod blob;
pub mod memory;
pub mod postgres;
pub mod store;

pub use blob::{BlobMetadata, BlobStore, LocalDiskBlobStore, StoredBlob};
pub use memory::InMemoryOpsStore;
pub use postgres::PostgresOpsStore;
pub use store::{OpsStore, StoreError};
