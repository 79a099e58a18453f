//! The current user's authentication state and the store that owns it.

pub mod persist;
pub mod store;

use crate::models::auth::{AuthUser, Role};

pub use store::SessionStore;

/// User and bearer token. They only ever exist together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedIn {
    pub user: AuthUser,
    pub access_token: String,
}

/// Authentication state.
///
/// Either SignedOut (no user, no token) or SignedIn (both). The session is
/// authenticated exactly when it holds a non-empty token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    signed_in: Option<SignedIn>,
    keep_signed_in: bool,
    permissions: Option<Vec<String>>,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            signed_in: None,
            keep_signed_in: true,
            permissions: None,
        }
    }
}

impl Session {
    pub fn signed_out() -> Self {
        Self::default()
    }

    /// A signed-in session. An empty token yields a signed-out session.
    pub fn signed_in(user: AuthUser, access_token: impl Into<String>, keep_signed_in: bool) -> Self {
        let access_token = access_token.into();
        let signed_in = (!access_token.is_empty()).then_some(SignedIn { user, access_token });
        Self {
            signed_in,
            keep_signed_in,
            permissions: None,
        }
    }

    pub fn with_permissions(mut self, permissions: Option<Vec<String>>) -> Self {
        self.permissions = permissions;
        self
    }

    pub fn is_authenticated(&self) -> bool {
        self.signed_in.is_some()
    }

    pub fn current_user(&self) -> Option<&AuthUser> {
        self.signed_in.as_ref().map(|s| &s.user)
    }

    pub fn access_token(&self) -> Option<&str> {
        self.signed_in.as_ref().map(|s| s.access_token.as_str())
    }

    pub fn role(&self) -> Option<&Role> {
        self.current_user().map(|u| &u.role)
    }

    pub fn keep_signed_in(&self) -> bool {
        self.keep_signed_in
    }

    pub fn permissions(&self) -> Option<&[String]> {
        self.permissions.as_deref()
    }

    pub(crate) fn set_permissions(&mut self, permissions: Vec<String>) {
        self.permissions = Some(permissions);
    }

    /// The same preferences with user, token and permissions dropped.
    pub(crate) fn cleared(&self) -> Self {
        Self {
            signed_in: None,
            keep_signed_in: self.keep_signed_in,
            permissions: None,
        }
    }
}
