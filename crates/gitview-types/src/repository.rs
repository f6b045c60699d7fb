//! Repository metadata.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::UserModel;

/// Access restriction of a repository.
///
/// Restrictions are ordered: None < Push < Clone < View. Only `View`
/// hides the repository from the web front-end.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum AccessRestriction {
    /// Anonymous view, clone and push.
    #[default]
    None,
    /// Authenticated push.
    Push,
    /// Authenticated clone and push.
    Clone,
    /// Authenticated view, clone and push.
    View,
}

impl AccessRestriction {
    /// All restrictions, least restrictive first.
    pub const ALL: [AccessRestriction; 4] = [
        AccessRestriction::None,
        AccessRestriction::Push,
        AccessRestriction::Clone,
        AccessRestriction::View,
    ];

    /// Returns the lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            AccessRestriction::None => "none",
            AccessRestriction::Push => "push",
            AccessRestriction::Clone => "clone",
            AccessRestriction::View => "view",
        }
    }

    /// Parse from string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "none" | "" => Some(AccessRestriction::None),
            "push" => Some(AccessRestriction::Push),
            "clone" => Some(AccessRestriction::Clone),
            "view" => Some(AccessRestriction::View),
            _ => None,
        }
    }

    /// Check if this restriction is at least the given level.
    pub fn at_least(&self, level: AccessRestriction) -> bool {
        *self >= level
    }
}

impl fmt::Display for AccessRestriction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Metadata describing a repository's configuration flags and ownership.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryModel {
    /// Repository name, e.g. `team/project.git`.
    pub name: String,
    /// Free-text description.
    #[serde(default)]
    pub description: String,
    /// Owning username, if any.
    #[serde(default)]
    pub owner: Option<String>,
    /// Show the tickets page when a ticket branch exists.
    #[serde(default)]
    pub use_tickets: bool,
    /// Show the docs page.
    #[serde(default)]
    pub use_docs: bool,
    /// Access restriction.
    #[serde(default)]
    pub access_restriction: AccessRestriction,
    /// Time of the newest commit (unix seconds).
    #[serde(default)]
    pub last_change: Option<i64>,
}

impl RepositoryModel {
    /// Creates an unrestricted model with no owner.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            owner: None,
            use_tickets: false,
            use_docs: false,
            access_restriction: AccessRestriction::None,
            last_change: None,
        }
    }

    /// Sets the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Sets the owner.
    pub fn with_owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = Some(owner.into());
        self
    }

    /// Sets the access restriction.
    pub fn with_access_restriction(mut self, restriction: AccessRestriction) -> Self {
        self.access_restriction = restriction;
        self
    }

    /// Enables or disables the tickets page.
    pub fn with_tickets(mut self, enabled: bool) -> Self {
        self.use_tickets = enabled;
        self
    }

    /// Enables or disables the docs page.
    pub fn with_docs(mut self, enabled: bool) -> Self {
        self.use_docs = enabled;
        self
    }

    /// Returns true if `username` owns this repository (case-insensitive).
    pub fn is_owner(&self, username: &str) -> bool {
        self.owner
            .as_deref()
            .is_some_and(|owner| owner.eq_ignore_ascii_case(username))
    }

    /// Returns true if the repository may be viewed by `user`
    /// (`None` is the anonymous user).
    pub fn is_visible_to(&self, user: Option<&UserModel>) -> bool {
        if !self.access_restriction.at_least(AccessRestriction::View) {
            return true;
        }
        match user {
            Some(user) => {
                user.can_admin || self.is_owner(&user.username) || user.has_repository(&self.name)
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_restriction_ordering() {
        assert!(AccessRestriction::None < AccessRestriction::Push);
        assert!(AccessRestriction::Push < AccessRestriction::Clone);
        assert!(AccessRestriction::Clone < AccessRestriction::View);
        assert!(AccessRestriction::View.at_least(AccessRestriction::Clone));
        assert!(!AccessRestriction::Push.at_least(AccessRestriction::View));
    }

    #[test]
    fn test_restriction_parse() {
        assert_eq!(AccessRestriction::parse("VIEW"), Some(AccessRestriction::View));
        assert_eq!(AccessRestriction::parse(""), Some(AccessRestriction::None));
        assert_eq!(AccessRestriction::parse("admin"), None);
    }

    #[test]
    fn test_is_owner_ignores_case() {
        let model = RepositoryModel::new("repo.git").with_owner("Alice");
        assert!(model.is_owner("alice"));
        assert!(model.is_owner("ALICE"));
        assert!(!model.is_owner("bob"));
        assert!(!RepositoryModel::new("repo.git").is_owner("alice"));
    }

    #[test]
    fn test_unrestricted_repository_is_public() {
        let model =
            RepositoryModel::new("repo.git").with_access_restriction(AccessRestriction::Clone);
        assert!(model.is_visible_to(None));
    }

    #[test]
    fn test_view_restricted_repository() {
        let model = RepositoryModel::new("secret.git")
            .with_owner("alice")
            .with_access_restriction(AccessRestriction::View);

        let alice = UserModel::new("alice");
        let bob = UserModel::new("bob");
        let carol = UserModel::new("carol").with_repository("SECRET.git");
        let admin = UserModel::new("root").with_admin(true);

        assert!(!model.is_visible_to(None));
        assert!(model.is_visible_to(Some(&alice)));
        assert!(!model.is_visible_to(Some(&bob)));
        assert!(model.is_visible_to(Some(&carol)));
        assert!(model.is_visible_to(Some(&admin)));
    }

    #[test]
    fn test_model_deserialize_defaults() {
        let model: RepositoryModel = serde_json::from_str(r#"{"name": "a.git"}"#).unwrap();
        assert_eq!(model, RepositoryModel::new("a.git"));
    }
}
