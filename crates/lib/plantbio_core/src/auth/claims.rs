//! Bearer token claim decoding.
//!
//! The client holds no verification key, so the payload is read without
//! checking the signature or expiry. The result only fills gaps in a login
//! response body; it never grants anything on its own.

use jsonwebtoken::{DecodingKey, Validation, decode};
use serde_json::{Map, Value};

use super::AuthError;
use crate::models::auth::TokenClaims;

/// Role claim as issued by ASP.NET Core identity.
pub const ROLE_CLAIM_URI: &str = "http://schemas.microsoft.com/ws/2008/06/identity/claims/role";
/// Name claim as issued by ASP.NET Core identity.
pub const NAME_CLAIM_URI: &str = "http://schemas.xmlsoap.org/ws/2005/05/identity/claims/name";
/// Subject claim as issued by ASP.NET Core identity.
pub const NAME_IDENTIFIER_CLAIM_URI: &str =
    "http://schemas.xmlsoap.org/ws/2005/05/identity/claims/nameidentifier";
/// Email claim as issued by ASP.NET Core identity.
pub const EMAIL_CLAIM_URI: &str =
    "http://schemas.xmlsoap.org/ws/2005/05/identity/claims/emailaddress";

/// Decode the claims of a JWT without verifying it.
pub fn decode_claims(token: &str) -> Result<TokenClaims, AuthError> {
    let mut validation = Validation::default();
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();

    let data = decode::<Map<String, Value>>(token, &DecodingKey::from_secret(&[]), &validation)
        .map_err(|e| AuthError::MalformedToken(format!("jwt decode: {e}")))?;
    let claims = data.claims;

    Ok(TokenClaims {
        subject: first_claim(&claims, &["sub", NAME_IDENTIFIER_CLAIM_URI]),
        name: first_claim(&claims, &["name", "unique_name", NAME_CLAIM_URI]),
        role: first_claim(&claims, &["role", ROLE_CLAIM_URI]),
        email: first_claim(&claims, &["email", EMAIL_CLAIM_URI]),
        expires_at: claims.get("exp").and_then(Value::as_i64),
    })
}

/// First non-empty value among `keys`. Multi-valued claims contribute
/// their first string.
fn first_claim(claims: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| claims.get(*key))
        .find_map(claim_string)
}

fn claim_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Array(items) => items.iter().find_map(claim_string),
        _ => None,
    }
}
