//! `wagonops-core` — domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod error;
pub mod id;
pub mod wagon_type;

pub use error::{DomainError, DomainResult};
pub use id::{EntryId, ProjectId};
pub use wagon_type::WagonType;
