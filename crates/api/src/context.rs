use wagonops_auth::Role;

/// Authenticated identity for a request.
///
/// Inserted by the auth middleware; must be present for all protected
/// routes. The role is surfaced to handlers for display and logging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrincipalContext {
    username: String,
    role: Role,
}

impl PrincipalContext {
    pub fn new(username: String, role: Role) -> Self {
        Self { username, role }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn role(&self) -> &Role {
        &self.role
    }
}
