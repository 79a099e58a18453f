//! Integration test: run a stand-in backend on an ephemeral port and drive
//! the client (and a session store on top of it) against it.

use std::sync::Arc;

use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use jsonwebtoken::{EncodingKey, Header, encode};
use plantbio_api_client::{ApiClient, ClientConfig, LoginField, RegisterRequest};
use plantbio_core::auth::{AuthApi, AuthError, Credentials};
use plantbio_core::models::auth::Role;
use plantbio_core::session::SessionStore;
use plantbio_core::storage::MemoryStorage;
use serde_json::{Value, json};

fn issued_token() -> String {
    encode(
        &Header::default(),
        &json!({
            "http://schemas.microsoft.com/ws/2008/06/identity/claims/role": "Teacher",
            "unique_name": "Co Lan",
            "exp": 4_102_444_800_i64
        }),
        &EncodingKey::from_secret(b"backend-secret"),
    )
    .unwrap()
}

async fn login(Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    let identifier = body
        .get("account")
        .or_else(|| body.get("identifier"))
        .and_then(Value::as_str);
    match (identifier, body["password"].as_str()) {
        (Some("lan"), Some("secret1")) => (
            StatusCode::OK,
            Json(json!({ "token": issued_token(), "user_Id": 12, "account": "lan" })),
        ),
        (Some("empty"), _) => (StatusCode::OK, Json(json!({ "message": "ok" }))),
        _ => (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "message": "Invalid account or password." })),
        ),
    }
}

async fn google(Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    if body["idToken"] == "google-id-token" {
        (
            StatusCode::OK,
            Json(json!({
                "token": "backend-token",
                "user": { "userId": 30, "name": "G User", "role": "Student", "email": "g@example.com" }
            })),
        )
    } else {
        (StatusCode::BAD_REQUEST, Json(json!({ "message": "bad id token" })))
    }
}

async fn register(headers: HeaderMap, Json(body): Json<Value>) -> (StatusCode, String) {
    if headers.contains_key("authorization") {
        return (StatusCode::BAD_REQUEST, "unexpected credentials".into());
    }
    if body["account"].is_string() && body["fullName"].is_string() && body["role"] == "Teacher" {
        (StatusCode::CREATED, String::new())
    } else {
        (StatusCode::BAD_REQUEST, "Account already exists".into())
    }
}

async fn reset_request(headers: HeaderMap, Json(body): Json<Value>) -> StatusCode {
    let bearer = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    if bearer == "Bearer session-token" && body["email"] == "a@b.co" {
        StatusCode::OK
    } else {
        StatusCode::FORBIDDEN
    }
}

async fn reset_confirm(Json(body): Json<Value>) -> StatusCode {
    if body["verificationCode"] == "1234" && body["newPassword"] == "newpass" {
        StatusCode::OK
    } else {
        StatusCode::BAD_REQUEST
    }
}

async fn spawn_backend() -> String {
    let app = Router::new()
        .route("/api/Authentication/login", post(login))
        .route("/api/Authentication/google", post(google))
        .route("/api/Authentication/register", post(register))
        .route("/api/Authentication/forgot-password/request", post(reset_request))
        .route("/api/Authentication/forgot-password/confirm", post(reset_confirm));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}/api")
}

async fn client(login_field: LoginField) -> ApiClient {
    let config = ClientConfig {
        base_url: spawn_backend().await,
        login_field,
        ..ClientConfig::default()
    };
    ApiClient::new(&config).unwrap()
}

#[tokio::test]
async fn login_returns_backend_body() {
    let client = client(LoginField::Account).await;
    let resp = client.login("lan", "secret1").await.unwrap();
    assert_eq!(resp.user_id.as_deref(), Some("12"));
    assert_eq!(resp.account.as_deref(), Some("lan"));
    assert!(resp.token.is_some());
}

#[tokio::test]
async fn identifier_field_is_configurable() {
    let client = client(LoginField::Identifier).await;
    assert!(client.login("lan", "secret1").await.is_ok());
}

#[tokio::test]
async fn rejection_keeps_status_and_body() {
    let client = client(LoginField::Account).await;
    let err = client.login("lan", "wrong-pw").await.unwrap_err();
    match err {
        AuthError::Rejected { status, body } => {
            assert_eq!(status, 401);
            assert!(body.contains("Invalid account or password."));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn unreachable_backend_is_a_transport_error() {
    let config = ClientConfig {
        base_url: "http://127.0.0.1:1/api".into(),
        ..ClientConfig::default()
    };
    let client = ApiClient::new(&config).unwrap();
    let err = client.login("lan", "secret1").await.unwrap_err();
    assert!(matches!(err, AuthError::Transport(_)));
}

#[tokio::test]
async fn store_signs_in_with_claim_fallbacks() {
    let client = Arc::new(client(LoginField::Account).await);
    let store = SessionStore::new(client, Arc::new(MemoryStorage::new()));

    let user = store
        .login(Credentials::password("lan", "secret1"))
        .await
        .unwrap();

    assert_eq!(user.id, "12");
    assert_eq!(user.role, Role::Teacher);
    assert_eq!(user.name.as_deref(), Some("Co Lan"));
    assert!(store.is_authenticated());
}

#[tokio::test]
async fn store_rejects_body_without_token() {
    let client = Arc::new(client(LoginField::Account).await);
    let store = SessionStore::new(client, Arc::new(MemoryStorage::new()));

    let err = store
        .login(Credentials::password("empty", "whatever"))
        .await
        .unwrap_err();

    assert!(matches!(err, AuthError::MalformedResponse(_)));
    assert!(!store.is_authenticated());
}

#[tokio::test]
async fn google_exchange_feeds_federated_login() {
    let client = Arc::new(client(LoginField::Account).await);
    let response = client.google("google-id-token").await.unwrap();
    let store = SessionStore::new(client.clone(), Arc::new(MemoryStorage::new()));

    let user = store
        .login(Credentials::from_login_response(response).unwrap())
        .await
        .unwrap();

    assert_eq!(user.id, "30");
    assert_eq!(user.role, Role::Student);
    assert_eq!(store.access_token().as_deref(), Some("backend-token"));

    let err = client.google("forged").await.unwrap_err();
    assert_eq!(err.status(), Some(400));
}

#[tokio::test]
async fn register_and_password_reset() {
    let client = client(LoginField::Account).await;
    let request = RegisterRequest {
        account: "newbie".into(),
        password: "secret1".into(),
        role: Role::Teacher,
        full_name: "New Bie".into(),
    };
    client.register(&request).await.unwrap();

    let err = client
        .register(&RegisterRequest {
            role: Role::Student,
            ..request
        })
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::Rejected { status: 400, ref body } if body == "Account already exists"));

    // The request endpoint wants the caller's bearer token.
    assert_eq!(
        client.request_password_reset("a@b.co").await.unwrap_err().status(),
        Some(403)
    );
    let authed = client.clone().with_token("session-token");
    authed.request_password_reset("a@b.co").await.unwrap();

    client
        .confirm_password_reset("a@b.co", "1234", "newpass")
        .await
        .unwrap();
    assert!(
        client
            .confirm_password_reset("a@b.co", "0000", "newpass")
            .await
            .is_err()
    );
}
