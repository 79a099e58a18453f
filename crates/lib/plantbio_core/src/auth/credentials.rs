//! Login credentials and login response resolution.

use std::fmt;

use tracing::debug;

use super::AuthError;
use super::claims::decode_claims;
use crate::models::auth::{AuthUser, LoginResponse, Role, TokenClaims};

/// What a caller hands to `SessionStore::login`.
#[derive(Clone)]
pub enum Credentials {
    /// Identifier (account handle) and password, checked by the backend.
    Password {
        identifier: String,
        password: String,
        keep_signed_in: bool,
    },
    /// An identity already verified elsewhere (Google sign-in). The session
    /// is populated directly, without a round trip.
    Federated { token: String, user: AuthUser },
}

impl Credentials {
    /// Password credentials. Sessions are kept across restarts unless
    /// [`keep_signed_in`](Self::keep_signed_in) says otherwise.
    pub fn password(identifier: impl Into<String>, password: impl Into<String>) -> Self {
        Credentials::Password {
            identifier: identifier.into(),
            password: password.into(),
            keep_signed_in: true,
        }
    }

    pub fn federated(token: impl Into<String>, user: AuthUser) -> Self {
        Credentials::Federated {
            token: token.into(),
            user,
        }
    }

    /// Set the keep-signed-in flag. Federated sessions are always kept.
    pub fn keep_signed_in(mut self, keep: bool) -> Self {
        if let Credentials::Password { keep_signed_in, .. } = &mut self {
            *keep_signed_in = keep;
        }
        self
    }

    /// Turn the backend's answer to a Google token exchange into federated
    /// credentials.
    pub fn from_login_response(response: LoginResponse) -> Result<Self, AuthError> {
        let (token, user) = resolve_login(response)?;
        Ok(Credentials::Federated { token, user })
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credentials::Password {
                identifier,
                keep_signed_in,
                ..
            } => f
                .debug_struct("Password")
                .field("identifier", identifier)
                .field("password", &"<redacted>")
                .field("keep_signed_in", keep_signed_in)
                .finish(),
            Credentials::Federated { user, .. } => f
                .debug_struct("Federated")
                .field("token", &"<redacted>")
                .field("user", user)
                .finish(),
        }
    }
}

/// Resolve a login response into the bearer token and the user record.
///
/// Body fields win. The token's claims are decoded only when the body
/// leaves out the id, name or role, and only fill those gaps. A response
/// that still lacks a token, an id or a role is rejected rather than
/// producing a half-populated session.
pub fn resolve_login(response: LoginResponse) -> Result<(String, AuthUser), AuthError> {
    let id = response
        .flat_user_id()
        .or_else(|| response.user.as_ref().and_then(|user| user.any_id()))
        .map(str::to_string);
    let token = response
        .token
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AuthError::MalformedResponse("response carries no token".into()))?;

    let nested = response.user.unwrap_or_default();
    let name = response.full_name.or(nested.name);
    let role = response.role.or(nested.role);
    let email = response.email.or(nested.email);

    let claims = if id.is_some() && name.is_some() && role.is_some() {
        TokenClaims::default()
    } else {
        match decode_claims(&token) {
            Ok(claims) => claims,
            // Name is optional; a body that has id and role does not need the token.
            Err(e) if id.is_some() && role.is_some() => {
                debug!(error = %e, "token claims unavailable, using response body only");
                TokenClaims::default()
            }
            Err(e) => return Err(e),
        }
    };

    let id = id
        .or(claims.subject)
        .ok_or_else(|| AuthError::MalformedResponse("response carries no user id".into()))?;
    let role = role
        .or(claims.role)
        .ok_or_else(|| AuthError::MalformedResponse("response carries no role".into()))?;

    let user = AuthUser {
        id,
        name: name.or(claims.name),
        role: Role::from(role),
        email: email.or(claims.email),
        account: response.account,
    };
    Ok((token, user))
}

#[cfg(test)]
mod tests {
    use jsonwebtoken::{EncodingKey, Header, encode};
    use serde_json::{Value, json};

    use super::*;
    use crate::models::auth::LoginUser;

    fn token(claims: Value) -> String {
        encode(&Header::default(), &claims, &EncodingKey::from_secret(b"k")).unwrap()
    }

    fn response(body: Value) -> LoginResponse {
        serde_json::from_value(body).unwrap()
    }

    #[test]
    fn body_fields_take_precedence_over_claims() {
        let t = token(json!({ "sub": "99", "name": "Claim Name", "role": "Student" }));
        let (tok, user) = resolve_login(response(json!({
            "token": t,
            "user_Id": 5,
            "fullName": "Body Name",
            "role": "Teacher",
            "email": "b@example.com",
            "account": "body"
        })))
        .unwrap();
        assert_eq!(tok, t);
        assert_eq!(user.id, "5");
        assert_eq!(user.name.as_deref(), Some("Body Name"));
        assert_eq!(user.role, Role::Teacher);
        assert_eq!(user.account.as_deref(), Some("body"));
    }

    #[test]
    fn claims_fill_missing_name_and_role() {
        let t = token(json!({
            "http://schemas.microsoft.com/ws/2008/06/identity/claims/role": "Admin",
            "unique_name": "root"
        }));
        let (_, user) = resolve_login(response(json!({ "token": t, "user_Id": "1" }))).unwrap();
        assert_eq!(user.role, Role::Admin);
        assert_eq!(user.name.as_deref(), Some("root"));
        assert_eq!(user.id, "1");
    }

    #[test]
    fn nested_user_is_used() {
        let t = token(json!({}));
        let mut resp = LoginResponse {
            token: Some(t),
            ..Default::default()
        };
        resp.user = Some(LoginUser {
            user_id: Some("u7".into()),
            id: None,
            name: Some("Nested".into()),
            role: Some("Student".into()),
            email: None,
        });
        let (_, user) = resolve_login(resp).unwrap();
        assert_eq!(user.id, "u7");
        assert_eq!(user.role, Role::Student);
    }

    #[test]
    fn opaque_token_is_fine_when_body_is_complete_enough() {
        let (_, user) = resolve_login(response(json!({
            "token": "opaque",
            "user_Id": 2,
            "role": "Teacher"
        })))
        .unwrap();
        assert_eq!(user.id, "2");
        assert!(user.name.is_none());
    }

    #[test]
    fn body_with_both_id_spellings_resolves() {
        let (_, user) = resolve_login(response(json!({
            "token": "opaque",
            "user_Id": 6,
            "userId": 6,
            "role": "Student"
        })))
        .unwrap();
        assert_eq!(user.id, "6");
    }

    #[test]
    fn missing_token_is_malformed() {
        let err = resolve_login(response(json!({ "user_Id": 1, "role": "Admin" }))).unwrap_err();
        assert!(matches!(err, AuthError::MalformedResponse(_)));

        let err = resolve_login(response(json!({ "token": "", "role": "Admin" }))).unwrap_err();
        assert!(matches!(err, AuthError::MalformedResponse(_)));
    }

    #[test]
    fn missing_role_everywhere_is_malformed() {
        let t = token(json!({ "sub": "3" }));
        let err = resolve_login(response(json!({ "token": t }))).unwrap_err();
        assert!(matches!(err, AuthError::MalformedResponse(m) if m.contains("role")));
    }

    #[test]
    fn opaque_token_without_role_fails_to_decode() {
        let err = resolve_login(response(json!({ "token": "opaque", "user_Id": 1 }))).unwrap_err();
        assert!(matches!(err, AuthError::MalformedToken(_)));
    }

    #[test]
    fn keep_signed_in_only_affects_password() {
        let creds = Credentials::password("a", "secret").keep_signed_in(false);
        assert!(matches!(
            creds,
            Credentials::Password {
                keep_signed_in: false,
                ..
            }
        ));
        let fed = Credentials::federated("t", AuthUser::new("1", Role::Student)).keep_signed_in(false);
        assert!(matches!(fed, Credentials::Federated { .. }));
    }

    #[test]
    fn debug_redacts_secrets() {
        let creds = Credentials::password("ana", "hunter22");
        let shown = format!("{creds:?}");
        assert!(shown.contains("ana"));
        assert!(!shown.contains("hunter22"));
    }

    #[test]
    fn google_response_becomes_federated() {
        let creds = Credentials::from_login_response(response(json!({
            "token": "g-token",
            "user": { "id": 4, "name": "G", "role": "Student", "email": "g@example.com" }
        })))
        .unwrap();
        match creds {
            Credentials::Federated { token, user } => {
                assert_eq!(token, "g-token");
                assert_eq!(user.id, "4");
                assert_eq!(user.email.as_deref(), Some("g@example.com"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
