//! Session store, the single owner of the authentication state.
//!
//! Constructed once at startup and shared (behind an `Arc`) with everything
//! that needs to know who is signed in. State sits behind a `RwLock` that is
//! never held across an `.await`; two overlapping logins both complete and
//! the later commit wins.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::{debug, info, warn};

use super::Session;
use super::persist::{self, TOKEN_KEY};
use crate::auth::{AuthApi, AuthError, Credentials, resolve_login};
use crate::models::auth::{AuthUser, Role};
use crate::storage::{SessionStorage, StorageError};

pub struct SessionStore {
    api: Arc<dyn AuthApi>,
    storage: Arc<dyn SessionStorage>,
    state: RwLock<Session>,
}

impl SessionStore {
    /// A signed-out store that ignores whatever storage already holds.
    pub fn new(api: Arc<dyn AuthApi>, storage: Arc<dyn SessionStorage>) -> Self {
        Self {
            api,
            storage,
            state: RwLock::new(Session::default()),
        }
    }

    /// A store rehydrated from storage.
    ///
    /// Unusable records are discarded with a warning; only I/O failures
    /// are returned.
    pub fn open(
        api: Arc<dyn AuthApi>,
        storage: Arc<dyn SessionStorage>,
    ) -> Result<Self, StorageError> {
        let session = persist::load(storage.as_ref())?;
        if let Some(user) = session.current_user() {
            debug!(user_id = %user.id, role = %user.role, "rehydrated session");
        }
        Ok(Self {
            api,
            storage,
            state: RwLock::new(session),
        })
    }

    /// Sign in.
    ///
    /// Password credentials cost one backend round trip; federated ones are
    /// taken as they are. On any failure the in-memory session is left as it
    /// was and the error is returned unchanged.
    pub async fn login(&self, credentials: Credentials) -> Result<AuthUser, AuthError> {
        let (token, user, keep_signed_in) = match credentials {
            Credentials::Federated { token, user } => {
                debug!(user_id = %user.id, "federated sign-in");
                (token, user, true)
            }
            Credentials::Password {
                identifier,
                password,
                keep_signed_in,
            } => {
                debug!(identifier = %identifier, "password sign-in");
                let response = self.api.login(&identifier, &password).await?;
                let (token, user) = resolve_login(response)?;
                (token, user, keep_signed_in)
            }
        };
        if token.is_empty() {
            return Err(AuthError::Validation("access token is empty".into()));
        }

        let mut state = self.write();
        let next = Session::signed_in(user.clone(), token, keep_signed_in)
            .with_permissions(state.permissions().map(<[String]>::to_vec));
        persist::save(self.storage.as_ref(), &next)?;
        *state = next;

        info!(user_id = %user.id, role = %user.role, "signed in");
        Ok(user)
    }

    /// Sign out. Always succeeds; storage failures are logged.
    pub fn logout(&self) {
        let mut state = self.write();
        let next = state.cleared();

        if let Err(e) = self.storage.remove(TOKEN_KEY) {
            warn!(error = %e, "failed to remove persisted token");
        }
        if let Err(e) = persist::save_record(self.storage.as_ref(), &next) {
            warn!(error = %e, "failed to update persisted session");
        }
        *state = next;

        info!("signed out");
    }

    /// Replace the permission list. No validation.
    pub fn set_permissions(&self, permissions: Vec<String>) {
        let mut state = self.write();
        state.set_permissions(permissions);
        if state.keep_signed_in()
            && let Err(e) = persist::save_record(self.storage.as_ref(), &state)
        {
            warn!(error = %e, "failed to persist permissions");
        }
    }

    /// A copy of the current session.
    pub fn snapshot(&self) -> Session {
        self.read().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.read().is_authenticated()
    }

    pub fn current_user(&self) -> Option<AuthUser> {
        self.read().current_user().cloned()
    }

    pub fn role(&self) -> Option<Role> {
        self.read().role().cloned()
    }

    pub fn access_token(&self) -> Option<String> {
        self.read().access_token().map(str::to_string)
    }

    fn read(&self) -> RwLockReadGuard<'_, Session> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Session> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}
