//! Users, credentials and the per-request session.

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};
use base64::{engine::general_purpose::STANDARD, Engine};
use gitview_types::UserModel;
use gitview_utils::{get_md5, MD5_TYPE};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::convert::Infallible;

use crate::routes::WebState;

/// A configured user with credentials.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserAccount {
    /// Login name.
    pub username: String,
    /// Plain text password, or `MD5:` followed by the hex digest.
    pub password: String,
    /// Name shown instead of the username.
    #[serde(default)]
    pub display_name: Option<String>,
    /// Email address.
    #[serde(default)]
    pub email: Option<String>,
    /// Administrator flag.
    #[serde(default)]
    pub can_admin: bool,
    /// Repositories explicitly granted to this user.
    #[serde(default)]
    pub repositories: Vec<String>,
}

impl UserAccount {
    /// Returns true if `password` matches the stored password.
    pub fn check_password(&self, password: &str) -> bool {
        match self.password.strip_prefix(MD5_TYPE) {
            Some(digest) => get_md5(password).eq_ignore_ascii_case(digest),
            None => self.password == password,
        }
    }

    /// The user model without credentials.
    pub fn to_model(&self) -> UserModel {
        UserModel {
            username: self.username.clone(),
            display_name: self.display_name.clone(),
            email: self.email.clone(),
            can_admin: self.can_admin,
            repositories: self.repositories.clone(),
        }
    }
}

/// User accounts keyed by lowercase username.
#[derive(Debug, Default)]
pub struct UserStore {
    users: RwLock<HashMap<String, UserAccount>>,
}

impl UserStore {
    /// Creates a store from configured accounts.
    pub fn new(accounts: impl IntoIterator<Item = UserAccount>) -> Self {
        let store = Self::default();
        for account in accounts {
            store.insert(account);
        }
        store
    }

    /// Adds or replaces an account.
    pub fn insert(&self, account: UserAccount) {
        self.users
            .write()
            .insert(account.username.to_lowercase(), account);
    }

    /// Number of accounts.
    pub fn len(&self) -> usize {
        self.users.read().len()
    }

    /// Returns true if there are no accounts.
    pub fn is_empty(&self) -> bool {
        self.users.read().is_empty()
    }

    /// Checks credentials and returns the user on success.
    pub fn authenticate(&self, username: &str, password: &str) -> Option<UserModel> {
        let users = self.users.read();
        let account = users.get(&username.to_lowercase())?;
        if account.check_password(password) {
            Some(account.to_model())
        } else {
            tracing::warn!(username = %username, "Failed login attempt");
            None
        }
    }
}

/// Decodes `Basic <base64(user:password)>`.
fn parse_basic_credentials(value: &str) -> Option<(String, String)> {
    let (scheme, encoded) = value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return None;
    }
    let decoded = STANDARD.decode(encoded.trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (username, password) = decoded.split_once(':')?;
    Some((username.to_string(), password.to_string()))
}

/// The user behind the current request. Missing or wrong credentials
/// give an anonymous session.
#[derive(Debug, Clone, Default)]
pub struct Session {
    user: Option<UserModel>,
}

impl Session {
    /// An anonymous session.
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// A session for `user`.
    pub fn for_user(user: UserModel) -> Self {
        Self { user: Some(user) }
    }

    /// The logged in user.
    pub fn user(&self) -> Option<&UserModel> {
        self.user.as_ref()
    }

    /// Returns true when a user is logged in.
    pub fn is_logged_in(&self) -> bool {
        self.user.is_some()
    }

    /// Returns true when the logged in user is an administrator.
    pub fn can_admin(&self) -> bool {
        self.user.as_ref().is_some_and(|u| u.can_admin)
    }

    /// Username of the logged in user.
    pub fn username(&self) -> Option<&str> {
        self.user.as_ref().map(|u| u.username.as_str())
    }
}

impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
    WebState: FromRef<S>,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let state = WebState::from_ref(state);
        let user = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(parse_basic_credentials)
            .and_then(|(username, password)| state.users.authenticate(&username, &password));
        Ok(Self { user })
    }
}
