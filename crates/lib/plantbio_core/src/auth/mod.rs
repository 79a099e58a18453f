//! Authentication: credentials, token claims and the backend seam.
//!
//! The backend itself is an external collaborator reached through
//! [`AuthApi`]; `plantbio_api_client` provides the HTTP implementation.

pub mod claims;
pub mod credentials;
pub mod validation;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::auth::LoginResponse;
use crate::storage::StorageError;

pub use claims::decode_claims;
pub use credentials::{Credentials, resolve_login};

/// Authentication errors.
///
/// Failures from the backend are carried unchanged: a rejected call keeps
/// the status code and the raw response body.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Rejected by server ({status}): {body}")]
    Rejected { status: u16, body: String },

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Malformed token: {0}")]
    MalformedToken(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl AuthError {
    /// HTTP status of a rejected call.
    pub fn status(&self) -> Option<u16> {
        match self {
            AuthError::Rejected { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }
}

/// The backend's password login endpoint.
#[async_trait]
pub trait AuthApi: Send + Sync {
    /// Exchange an identifier and password for a login response.
    async fn login(&self, identifier: &str, password: &str) -> Result<LoginResponse, AuthError>;
}
