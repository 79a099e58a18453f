//! Client configuration.

use std::str::FromStr;
use std::time::Duration;

/// Default backend base URL.
pub const DEFAULT_BASE_URL: &str = "http://localhost:5000/api/";

/// Default request timeout.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// JSON field the login endpoint expects the identifier under.
///
/// Backends have used both names; a deployment picks one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoginField {
    #[default]
    Account,
    Identifier,
}

impl LoginField {
    pub fn as_str(self) -> &'static str {
        match self {
            LoginField::Account => "account",
            LoginField::Identifier => "identifier",
        }
    }
}

impl FromStr for LoginField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "account" => Ok(LoginField::Account),
            "identifier" => Ok(LoginField::Identifier),
            other => Err(format!("unknown login field {other:?}")),
        }
    }
}

/// Configuration for [`ApiClient`](crate::ApiClient).
#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// Base URL the `Authentication/*` paths are joined onto.
    pub base_url: String,
    pub login_field: LoginField,
    /// Whole-request timeout enforced by the HTTP transport.
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.into(),
            login_field: LoginField::default(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl ClientConfig {
    /// Reads configuration from environment variables with sensible defaults.
    ///
    /// | Variable                     | Default                       |
    /// |------------------------------|-------------------------------|
    /// | `PLANTBIO_API_URL`           | `http://localhost:5000/api/`  |
    /// | `PLANTBIO_LOGIN_FIELD`       | `account`                     |
    /// | `PLANTBIO_HTTP_TIMEOUT_SECS` | `30`                          |
    pub fn from_env() -> Self {
        Self {
            base_url: std::env::var("PLANTBIO_API_URL")
                .unwrap_or_else(|_| DEFAULT_BASE_URL.into()),
            login_field: std::env::var("PLANTBIO_LOGIN_FIELD")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or_default(),
            timeout: std::env::var("PLANTBIO_HTTP_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(Duration::from_secs(DEFAULT_TIMEOUT_SECS)),
        }
    }
}
