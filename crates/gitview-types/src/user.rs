//! User accounts.

use serde::{Deserialize, Serialize};

/// An authenticated user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserModel {
    /// Login name.
    pub username: String,
    /// Optional display name.
    #[serde(default)]
    pub display_name: Option<String>,
    /// Optional email address.
    #[serde(default)]
    pub email: Option<String>,
    /// Administrators may edit every repository.
    #[serde(default)]
    pub can_admin: bool,
    /// Repositories explicitly granted to this user.
    #[serde(default)]
    pub repositories: Vec<String>,
}

impl UserModel {
    /// Creates a non-admin user with no grants.
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            display_name: None,
            email: None,
            can_admin: false,
            repositories: Vec::new(),
        }
    }

    /// Sets the administrator flag.
    pub fn with_admin(mut self, can_admin: bool) -> Self {
        self.can_admin = can_admin;
        self
    }

    /// Grants access to a repository.
    pub fn with_repository(mut self, repository: impl Into<String>) -> Self {
        self.repositories.push(repository.into());
        self
    }

    /// Returns the display name, falling back to the username.
    pub fn display_name(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.username)
    }

    /// Returns true if the repository was explicitly granted (case-insensitive).
    pub fn has_repository(&self, repository: &str) -> bool {
        self.repositories
            .iter()
            .any(|r| r.eq_ignore_ascii_case(repository))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name_fallback() {
        let mut user = UserModel::new("alice");
        assert_eq!(user.display_name(), "alice");
        user.display_name = Some("Alice A.".into());
        assert_eq!(user.display_name(), "Alice A.");
    }

    #[test]
    fn test_has_repository() {
        let user = UserModel::new("bob").with_repository("Team/App.git");
        assert!(user.has_repository("team/app.git"));
        assert!(!user.has_repository("team/other.git"));
    }
}
