//! `wagonops-auth` — authentication boundary.
//!
//! Credentials live in configuration, not in source: the credential store is
//! built from an injected user list at process start. Tokens are HS256 JWTs
//! carrying the username and a role claim; the role is surfaced to handlers
//! but authorization checks downstream are currently informational only.

pub mod claims;
pub mod credentials;
pub mod roles;
pub mod token;

pub use claims::{JwtClaims, TokenValidationError, validate_claims};
pub use credentials::{CredentialStore, StaticCredential};
pub use roles::Role;
pub use token::{AuthError, Hs256TokenService, TOKEN_TTL, TokenVerifier};
