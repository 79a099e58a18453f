//! Persisted session format.
//!
//! The record under [`AUTH_KEY`] keeps the envelope the web client has
//! always written (`{"state": {...}, "version": 0}` with camelCase fields),
//! so sessions saved by the browser build still rehydrate. The raw bearer
//! token is also written under [`TOKEN_KEY`] for code that reads only that.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use super::Session;
use crate::models::auth::AuthUser;
use crate::storage::{SessionStorage, StorageError};

/// Key of the full session record.
pub const AUTH_KEY: &str = "auth";
/// Key of the bearer token alone.
pub const TOKEN_KEY: &str = "token";

const FORMAT_VERSION: u32 = 0;

/// Errors decoding a persisted record.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("invalid session record: {0}")]
    Json(#[from] serde_json::Error),

    #[error("session record has a user without a token, or a token without a user")]
    Partial,
}

#[derive(Debug, Serialize, Deserialize)]
struct Envelope {
    state: PersistedState,
    #[serde(default)]
    version: u32,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PersistedState {
    #[serde(default)]
    is_authenticated: bool,
    #[serde(default = "default_keep_login")]
    is_keep_login: bool,
    #[serde(default)]
    auth_user: Option<AuthUser>,
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    accesses: Option<Vec<String>>,
}

fn default_keep_login() -> bool {
    true
}

/// Serialize a session into the persisted envelope.
pub fn encode(session: &Session) -> Result<String, serde_json::Error> {
    let envelope = Envelope {
        state: PersistedState {
            is_authenticated: session.is_authenticated(),
            is_keep_login: session.keep_signed_in(),
            auth_user: session.current_user().cloned(),
            access_token: session.access_token().map(str::to_string),
            accesses: session.permissions().map(<[String]>::to_vec),
        },
        version: FORMAT_VERSION,
    };
    serde_json::to_string(&envelope)
}

/// Parse a persisted envelope.
///
/// The authenticated flag is recomputed from the token; the stored flag is
/// ignored.
pub fn decode(raw: &str) -> Result<Session, DecodeError> {
    let envelope: Envelope = serde_json::from_str(raw)?;
    let state = envelope.state;
    let token = state.access_token.filter(|t| !t.is_empty());

    let session = match (state.auth_user, token) {
        (Some(user), Some(token)) => Session::signed_in(user, token, state.is_keep_login),
        (None, None) => Session {
            keep_signed_in: state.is_keep_login,
            ..Session::default()
        },
        _ => return Err(DecodeError::Partial),
    };
    Ok(session.with_permissions(state.accesses))
}

/// Rebuild a session from a persisted record, if there is one.
///
/// Anything unusable yields a signed-out session: an unreadable or partial
/// record, or a sign-in that was not meant to be kept.
pub fn restore(raw: Option<&str>) -> Session {
    let Some(raw) = raw else {
        return Session::default();
    };
    match decode(raw) {
        Ok(session) if session.is_authenticated() && !session.keep_signed_in() => {
            debug!("persisted sign-in was not kept, starting signed out");
            session.cleared()
        }
        Ok(session) => session,
        Err(e) => {
            warn!(error = %e, "discarding persisted session");
            Session::default()
        }
    }
}

/// Read the persisted session from storage.
pub fn load(storage: &dyn SessionStorage) -> Result<Session, StorageError> {
    let raw = storage.get(AUTH_KEY)?;
    Ok(restore(raw.as_deref()))
}

/// Write `session` to storage: the token whenever there is one, the full
/// record only when the session is to be kept.
///
/// If the record cannot be written the token key is put back the way it
/// was, so storage never holds a token the record does not describe.
pub fn save(storage: &dyn SessionStorage, session: &Session) -> Result<(), StorageError> {
    let Some(token) = session.access_token() else {
        return save_record(storage, session);
    };
    let previous = storage.get(TOKEN_KEY)?;
    storage.set(TOKEN_KEY, token)?;

    if let Err(e) = save_record(storage, session) {
        let rollback = match previous.as_deref() {
            Some(old) => storage.set(TOKEN_KEY, old),
            None => storage.remove(TOKEN_KEY),
        };
        if let Err(rollback_err) = rollback {
            warn!(error = %rollback_err, "failed to restore persisted token");
        }
        return Err(e);
    }
    Ok(())
}

/// Write (or, for unkept sessions, remove) the full record.
pub fn save_record(storage: &dyn SessionStorage, session: &Session) -> Result<(), StorageError> {
    if session.keep_signed_in() {
        storage.set(AUTH_KEY, &encode(session)?)
    } else {
        storage.remove(AUTH_KEY)
    }
}
