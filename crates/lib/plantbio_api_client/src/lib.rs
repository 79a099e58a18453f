//! # plantbio_api_client
//!
//! HTTP client for the backend's `Authentication/*` endpoints. Implements
//! [`AuthApi`] so it can back a `SessionStore`.

pub mod config;

use async_trait::async_trait;
use plantbio_core::auth::{AuthApi, AuthError};
use plantbio_core::models::auth::{LoginResponse, Role};
use reqwest::{Client, Response};
use serde::Serialize;
use serde_json::{Map, Value, json};
use tracing::{debug, warn};
use url::Url;

pub use config::{ClientConfig, LoginField};

const LOGIN_PATH: &str = "Authentication/login";
const GOOGLE_PATH: &str = "Authentication/google";
const REGISTER_PATH: &str = "Authentication/register";
const RESET_REQUEST_PATH: &str = "Authentication/forgot-password/request";
const RESET_CONFIRM_PATH: &str = "Authentication/forgot-password/confirm";

/// Body of `Authentication/register`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub account: String,
    pub password: String,
    pub role: Role,
    pub full_name: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PasswordResetConfirm<'a> {
    email: &'a str,
    verification_code: &'a str,
    new_password: &'a str,
}

/// Backend client.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: Url,
    login_field: LoginField,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(config: &ClientConfig) -> Result<Self, AuthError> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| AuthError::Transport(format!("http client: {e}")))?;
        Ok(Self {
            http,
            base_url: parse_base_url(&config.base_url)?,
            login_field: config.login_field,
            token: None,
        })
    }

    /// Send `Authorization: Bearer <token>` on every request.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Exchange a Google ID token for a backend session.
    pub async fn google(&self, id_token: &str) -> Result<LoginResponse, AuthError> {
        let response = self
            .post_json(GOOGLE_PATH, &json!({ "idToken": id_token }))
            .await?;
        parse_login(response).await
    }

    pub async fn register(&self, request: &RegisterRequest) -> Result<(), AuthError> {
        self.post_json(REGISTER_PATH, request).await?;
        Ok(())
    }

    /// Ask the backend to email a verification code.
    pub async fn request_password_reset(&self, email: &str) -> Result<(), AuthError> {
        self.post_json(RESET_REQUEST_PATH, &json!({ "email": email }))
            .await?;
        Ok(())
    }

    /// Set a new password using the emailed verification code.
    pub async fn confirm_password_reset(
        &self,
        email: &str,
        verification_code: &str,
        new_password: &str,
    ) -> Result<(), AuthError> {
        let body = PasswordResetConfirm {
            email,
            verification_code,
            new_password,
        };
        self.post_json(RESET_CONFIRM_PATH, &body).await?;
        Ok(())
    }

    fn endpoint(&self, path: &str) -> Result<Url, AuthError> {
        self.base_url
            .join(path)
            .map_err(|e| AuthError::Transport(format!("invalid endpoint {path}: {e}")))
    }

    /// POST a JSON body. Non-success statuses come back as
    /// [`AuthError::Rejected`] with the body verbatim.
    async fn post_json<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<Response, AuthError> {
        let url = self.endpoint(path)?;
        debug!(%url, "POST");

        let mut request = self.http.post(url).json(body);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        let response = request
            .send()
            .await
            .map_err(|e| AuthError::Transport(format!("POST {path}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<no body>".to_string());
            warn!(%status, path, "request rejected");
            return Err(AuthError::Rejected {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }
}

#[async_trait]
impl AuthApi for ApiClient {
    async fn login(&self, identifier: &str, password: &str) -> Result<LoginResponse, AuthError> {
        let mut body = Map::new();
        body.insert(self.login_field.as_str().to_string(), Value::from(identifier));
        body.insert("password".to_string(), Value::from(password));

        let response = self.post_json(LOGIN_PATH, &body).await?;
        parse_login(response).await
    }
}

async fn parse_login(response: Response) -> Result<LoginResponse, AuthError> {
    response
        .json::<LoginResponse>()
        .await
        .map_err(|e| AuthError::MalformedResponse(format!("login response: {e}")))
}

/// Parse the base URL, adding the trailing slash `Url::join` needs to keep
/// the last path segment.
fn parse_base_url(raw: &str) -> Result<Url, AuthError> {
    let with_slash = if raw.ends_with('/') {
        raw.to_string()
    } else {
        format!("{raw}/")
    };
    Url::parse(&with_slash).map_err(|e| AuthError::Transport(format!("invalid base URL {raw:?}: {e}")))
}
