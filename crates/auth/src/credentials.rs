use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::Role;

/// One configured login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaticCredential {
    pub username: String,
    pub password: String,
    pub role: Role,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid credential spec '{0}': expected username:password:role")]
pub struct CredentialSpecError(String);

/// In-memory credential store, resolved from configuration at process start.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    users: Vec<StaticCredential>,
}

impl CredentialStore {
    pub fn new(users: Vec<StaticCredential>) -> Self {
        Self { users }
    }

    /// Parse a `username:password:role` comma-separated list (the
    /// `AUTH_USERS` environment format).
    pub fn from_spec(spec: &str) -> Result<Self, CredentialSpecError> {
        let mut users = Vec::new();
        for entry in spec.split(',').map(str::trim).filter(|e| !e.is_empty()) {
            let mut parts = entry.splitn(3, ':');
            let (Some(username), Some(password), Some(role)) =
                (parts.next(), parts.next(), parts.next())
            else {
                return Err(CredentialSpecError(entry.to_string()));
            };
            if username.is_empty() || password.is_empty() || role.is_empty() {
                return Err(CredentialSpecError(entry.to_string()));
            }
            users.push(StaticCredential {
                username: username.to_string(),
                password: password.to_string(),
                role: Role::new(role.to_string()),
            });
        }
        Ok(Self::new(users))
    }

    /// Verify a username/password pair, returning the matched credential.
    pub fn verify(&self, username: &str, password: &str) -> Option<&StaticCredential> {
        self.users
            .iter()
            .find(|u| u.username == username && u.password == password)
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spec_parsing_builds_the_user_list() {
        let store =
            CredentialStore::from_spec("sales_user:sales123:sales, prod_user:prod123:production")
                .unwrap();
        let user = store.verify("prod_user", "prod123").unwrap();
        assert_eq!(user.role.as_str(), "production");
    }

    #[test]
    fn malformed_spec_entries_are_rejected() {
        assert!(CredentialStore::from_spec("missing_fields").is_err());
        assert!(CredentialStore::from_spec("a:b:").is_err());
    }

    #[test]
    fn wrong_password_does_not_verify() {
        let store = CredentialStore::from_spec("sales_user:sales123:sales").unwrap();
        assert!(store.verify("sales_user", "nope").is_none());
        assert!(store.verify("ghost", "sales123").is_none());
    }
}
