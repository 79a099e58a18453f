//! Domain and wire models.

pub mod auth;

pub use auth::{AuthUser, LoginResponse, LoginUser, Role, TokenClaims};
