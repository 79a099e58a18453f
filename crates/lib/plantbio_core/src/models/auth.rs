//! Authentication models.
//!
//! `LoginResponse` mirrors what the backend's `Authentication/*` endpoints
//! return, with every field optional since the backend has shipped both a
//! nested and a flat shape. `AuthUser` is the resolved record the session
//! holds.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Portal role.
///
/// Parsing is exact and case-sensitive. Anything other than the three known
/// names is kept verbatim in `Other` so it survives persistence, but it never
/// matches a route restriction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
    Admin,
    Teacher,
    Student,
    Other(String),
}

impl Role {
    pub fn as_str(&self) -> &str {
        match self {
            Role::Admin => "Admin",
            Role::Teacher => "Teacher",
            Role::Student => "Student",
            Role::Other(name) => name,
        }
    }

    /// Whether this is one of the portal's own roles.
    pub fn is_known(&self) -> bool {
        !matches!(self, Role::Other(_))
    }
}

impl From<&str> for Role {
    fn from(name: &str) -> Self {
        match name {
            "Admin" => Role::Admin,
            "Teacher" => Role::Teacher,
            "Student" => Role::Student,
            other => Role::Other(other.to_string()),
        }
    }
}

impl From<String> for Role {
    fn from(name: String) -> Self {
        match Role::from(name.as_str()) {
            Role::Other(_) => Role::Other(name),
            known => known,
        }
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        match role {
            Role::Other(name) => name,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The signed-in user as the session holds it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Account handle used for password sign-in.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account: Option<String>,
}

impl AuthUser {
    pub fn new(id: impl Into<String>, role: Role) -> Self {
        Self {
            id: id.into(),
            name: None,
            role,
            email: None,
            account: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Name to show in the UI, falling back to the account handle and id.
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .or(self.account.as_deref())
            .unwrap_or(&self.id)
    }
}

/// Body of a successful `Authentication/login` or `Authentication/google`
/// call.
///
/// Accepts the nested form (`{token, user: {userId, name, role}}`) and the
/// flat form (`{token, user_Id, fullName, role, email, account}`). The flat
/// id may arrive as `user_Id`, `userId` or both; `user_Id` wins.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub user: Option<LoginUser>,
    #[serde(
        default,
        rename = "user_Id",
        deserialize_with = "opt_string_or_number"
    )]
    pub user_id: Option<String>,
    #[serde(default, rename = "userId", deserialize_with = "opt_string_or_number")]
    pub camel_user_id: Option<String>,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub account: Option<String>,
}

/// Nested `user` object of a [`LoginResponse`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginUser {
    #[serde(default, deserialize_with = "opt_string_or_number")]
    pub user_id: Option<String>,
    #[serde(default, deserialize_with = "opt_string_or_number")]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// Claims read from a bearer token. Used only to fill gaps in a login
/// response body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenClaims {
    pub subject: Option<String>,
    pub name: Option<String>,
    pub role: Option<String>,
    pub email: Option<String>,
    /// Expiry (unix timestamp). Informational; never enforced client-side.
    pub expires_at: Option<i64>,
}

impl LoginResponse {
    /// The flat-form user id, whichever key carried it.
    pub fn flat_user_id(&self) -> Option<&str> {
        self.user_id.as_deref().or(self.camel_user_id.as_deref())
    }
}

impl LoginUser {
    /// The nested user id, `userId` before `id`.
    pub fn any_id(&self) -> Option<&str> {
        self.user_id.as_deref().or(self.id.as_deref())
    }
}

impl TokenClaims {
    pub fn expiry(&self) -> Option<DateTime<Utc>> {
        self.expires_at
            .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0))
    }
}

fn id_from_value<E: de::Error>(value: Value) -> Result<Option<String>, E> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s)),
        Value::Number(n) => Ok(Some(n.to_string())),
        other => Err(E::custom(format!(
            "expected a string or numeric id, got {other}"
        ))),
    }
}

fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    id_from_value(Value::deserialize(deserializer)?)?
        .ok_or_else(|| de::Error::custom("user id must not be null"))
}

fn opt_string_or_number<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    id_from_value(Value::deserialize(deserializer)?)
}
