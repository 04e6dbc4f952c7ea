//! Handler tests driven through the full router with a stub identity provider.

use super::login::INVALID_CREDENTIALS;
use super::password::{PASSWORD_RESET_REQUESTED, PASSWORD_UPDATED};
use super::signup::EMAIL_CONFIRMATION_REQUIRED;
use crate::api;
use crate::provider::{Credentials, IdentityProvider, ProviderError, ProviderResult, Session};
use anyhow::{Context, Result};
use async_trait::async_trait;
use axum::{
    body::{Body, to_bytes},
    http::{Request, StatusCode, header::CONTENT_TYPE},
    response::Response,
};
use secrecy::{ExposeSecret, SecretString};
use serde_json::{Value, json};
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

/// Canned provider that records every call it receives.
#[derive(Default)]
struct StubProvider {
    sign_up: Option<ProviderResult<Option<Session>>>,
    sign_in: Option<ProviderResult<Session>>,
    reset: Option<ProviderResult<()>>,
    update: Option<ProviderResult<()>>,
    user: Option<ProviderResult<Value>>,
    health: Option<ProviderResult<()>>,
    calls: Mutex<Vec<String>>,
}

impl StubProvider {
    fn record(&self, call: String) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

fn unexpected<T>() -> ProviderResult<T> {
    Err(ProviderError::transport("unexpected provider call"))
}

#[async_trait]
impl IdentityProvider for StubProvider {
    async fn sign_up(&self, credentials: &Credentials) -> ProviderResult<Option<Session>> {
        self.record(format!("sign_up:{}", credentials.email));
        self.sign_up.clone().unwrap_or_else(unexpected)
    }

    async fn sign_in_with_password(&self, credentials: &Credentials) -> ProviderResult<Session> {
        self.record(format!("sign_in:{}", credentials.email));
        self.sign_in.clone().unwrap_or_else(unexpected)
    }

    async fn reset_password_for_email(&self, email: &str) -> ProviderResult<()> {
        self.record(format!("reset:{email}"));
        self.reset.clone().unwrap_or_else(unexpected)
    }

    async fn update_user_password(
        &self,
        reset_token: &SecretString,
        password: &SecretString,
    ) -> ProviderResult<()> {
        self.record(format!(
            "update:{}:{}",
            reset_token.expose_secret(),
            password.expose_secret()
        ));
        self.update.clone().unwrap_or_else(unexpected)
    }

    async fn get_user(&self, token: &SecretString) -> ProviderResult<Value> {
        self.record(format!("get_user:{}", token.expose_secret()));
        self.user.clone().unwrap_or_else(unexpected)
    }

    async fn health(&self) -> ProviderResult<()> {
        self.health.clone().unwrap_or(Ok(()))
    }
}

fn session(token: &str) -> Session {
    Session {
        access_token: token.to_string(),
        token_type: "bearer".to_string(),
    }
}

fn provider_error(status: u16, message: Option<&str>) -> ProviderError {
    ProviderError::new(Some(status), None, message.map(str::to_string))
}

async fn post_json(stub: &Arc<StubProvider>, uri: &str, body: Value) -> Result<Response> {
    post_raw(stub, uri, body.to_string()).await
}

async fn post_raw(stub: &Arc<StubProvider>, uri: &str, body: String) -> Result<Response> {
    let app = api::app(stub.clone(), None);
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header(CONTENT_TYPE, "application/json")
                .body(Body::from(body))?,
        )
        .await?;
    Ok(response)
}

async fn get(stub: &Arc<StubProvider>, uri: &str) -> Result<Response> {
    let app = api::app(stub.clone(), None);
    let response = app
        .oneshot(Request::builder().method("GET").uri(uri).body(Body::empty())?)
        .await?;
    Ok(response)
}

async fn json_body(response: Response) -> Result<Value> {
    let body = to_bytes(response.into_body(), usize::MAX).await?;
    serde_json::from_slice(&body).context("response body is not JSON")
}

async fn detail(response: Response) -> Result<String> {
    let body = json_body(response).await?;
    body.get("detail")
        .and_then(Value::as_str)
        .map(str::to_string)
        .context("missing detail")
}

#[tokio::test]
async fn signup_returns_bearer_token() -> Result<()> {
    let stub = Arc::new(StubProvider {
        sign_up: Some(Ok(Some(session("jwt-signup")))),
        ..StubProvider::default()
    });

    let response = post_json(
        &stub,
        "/signup",
        json!({ "email": "alice@example.com", "password": "pw" }),
    )
    .await?;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        json_body(response).await?,
        json!({ "access_token": "jwt-signup", "token_type": "bearer" })
    );
    assert_eq!(stub.calls(), vec!["sign_up:alice@example.com".to_string()]);
    Ok(())
}

#[tokio::test]
async fn signup_without_session_requires_confirmation_disabled() -> Result<()> {
    let stub = Arc::new(StubProvider {
        sign_up: Some(Ok(None)),
        ..StubProvider::default()
    });

    let response = post_json(
        &stub,
        "/signup",
        json!({ "email": "alice@example.com", "password": "pw" }),
    )
    .await?;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(detail(response).await?, EMAIL_CONFIRMATION_REQUIRED);
    Ok(())
}

/// In-memory log sink for a scoped subscriber.
#[derive(Clone, Default)]
struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    fn contents(&self) -> String {
        self.0
            .lock()
            .map(|logs| String::from_utf8_lossy(&logs).into_owned())
            .unwrap_or_default()
    }
}

impl std::io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        if let Ok(mut logs) = self.0.lock() {
            logs.extend_from_slice(buf);
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[tokio::test]
async fn signup_without_session_logs_warning_not_error() -> Result<()> {
    let logs = CapturedLogs::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::WARN)
        .finish();
    let _guard = tracing::subscriber::set_default(subscriber);

    let stub = Arc::new(StubProvider {
        sign_up: Some(Ok(None)),
        ..StubProvider::default()
    });

    let response = post_json(
        &stub,
        "/signup",
        json!({ "email": "alice@example.com", "password": "pw" }),
    )
    .await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let output = logs.contents();
    assert!(output.contains("WARN"), "expected a warning, got: {output}");
    assert!(output.contains("email confirmation is enabled"));
    assert!(!output.contains("ERROR"), "unexpected error log: {output}");
    Ok(())
}

#[tokio::test]
async fn signup_duplicate_user_relays_provider_message() -> Result<()> {
    let stub = Arc::new(StubProvider {
        sign_up: Some(Err(provider_error(422, Some("User already registered")))),
        ..StubProvider::default()
    });

    let response = post_json(
        &stub,
        "/signup",
        json!({ "email": "alice@example.com", "password": "pw" }),
    )
    .await?;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(detail(response).await?, "User already registered");
    Ok(())
}

#[tokio::test]
async fn login_returns_bearer_token() -> Result<()> {
    let stub = Arc::new(StubProvider {
        sign_in: Some(Ok(session("jwt-login"))),
        ..StubProvider::default()
    });

    let response = post_json(
        &stub,
        "/login",
        json!({ "email": "Alice@Example.com", "password": "pw" }),
    )
    .await?;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        json_body(response).await?,
        json!({ "access_token": "jwt-login", "token_type": "bearer" })
    );
    assert_eq!(stub.calls(), vec!["sign_in:alice@example.com".to_string()]);
    Ok(())
}

#[tokio::test]
async fn login_rejected_relays_provider_message() -> Result<()> {
    let stub = Arc::new(StubProvider {
        sign_in: Some(Err(provider_error(400, Some("Invalid login credentials")))),
        ..StubProvider::default()
    });

    let response = post_json(
        &stub,
        "/login",
        json!({ "email": "alice@example.com", "password": "wrong" }),
    )
    .await?;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(detail(response).await?, "Invalid login credentials");
    Ok(())
}

#[tokio::test]
async fn login_rejected_without_message_falls_back() -> Result<()> {
    let stub = Arc::new(StubProvider {
        sign_in: Some(Err(provider_error(400, None))),
        ..StubProvider::default()
    });

    let response = post_json(
        &stub,
        "/login",
        json!({ "email": "alice@example.com", "password": "wrong" }),
    )
    .await?;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(detail(response).await?, INVALID_CREDENTIALS);
    Ok(())
}

#[tokio::test]
async fn password_reset_response_is_identical_on_success_and_failure() -> Result<()> {
    let outcomes = [
        Ok(()),
        Err(provider_error(404, Some("User not found"))),
        Err(provider_error(429, Some("Email rate limit exceeded"))),
        Err(ProviderError::transport("Identity provider is unreachable")),
    ];

    for outcome in outcomes {
        let stub = Arc::new(StubProvider {
            reset: Some(outcome),
            ..StubProvider::default()
        });

        let response = post_json(
            &stub,
            "/request-password-reset",
            json!({ "email": "alice@example.com" }),
        )
        .await?;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            json_body(response).await?,
            json!({ "message": PASSWORD_RESET_REQUESTED })
        );
        assert_eq!(stub.calls(), vec!["reset:alice@example.com".to_string()]);
    }
    Ok(())
}

#[tokio::test]
async fn update_password_uses_reset_token() -> Result<()> {
    let stub = Arc::new(StubProvider {
        update: Some(Ok(())),
        ..StubProvider::default()
    });

    let response = post_json(
        &stub,
        "/update-password",
        json!({ "token": "reset-token", "password": "n3w" }),
    )
    .await?;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        json_body(response).await?,
        json!({ "message": PASSWORD_UPDATED })
    );
    assert_eq!(stub.calls(), vec!["update:reset-token:n3w".to_string()]);
    Ok(())
}

#[tokio::test]
async fn update_password_rejected_token() -> Result<()> {
    let stub = Arc::new(StubProvider {
        update: Some(Err(provider_error(401, Some("Token has expired or is invalid")))),
        ..StubProvider::default()
    });

    let response = post_json(
        &stub,
        "/update-password",
        json!({ "token": "stale", "password": "n3w" }),
    )
    .await?;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(detail(response).await?, "Token has expired or is invalid");
    Ok(())
}

#[tokio::test]
async fn verify_passes_user_through() -> Result<()> {
    let user = json!({
        "id": "8a1f",
        "email": "alice@example.com",
        "app_metadata": { "provider": "email", "providers": ["email"] },
        "user_metadata": {},
        "role": "authenticated"
    });
    let stub = Arc::new(StubProvider {
        user: Some(Ok(user.clone())),
        ..StubProvider::default()
    });

    let response = get(&stub, "/verify?token=access-token").await?;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await?, user);
    assert_eq!(stub.calls(), vec!["get_user:access-token".to_string()]);
    Ok(())
}

#[tokio::test]
async fn verify_invalid_token_is_unauthorized() -> Result<()> {
    let stub = Arc::new(StubProvider {
        user: Some(Err(provider_error(403, Some("invalid JWT: token is expired")))),
        ..StubProvider::default()
    });

    let response = get(&stub, "/verify?token=expired").await?;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        detail(response).await?,
        "Invalid token: invalid JWT: token is expired"
    );
    Ok(())
}

#[tokio::test]
async fn verify_without_token_never_calls_provider() -> Result<()> {
    let stub = Arc::new(StubProvider::default());

    let response = get(&stub, "/verify").await?;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(stub.calls().is_empty());
    Ok(())
}

#[tokio::test]
async fn invalid_bodies_never_reach_the_provider() -> Result<()> {
    let cases = [
        ("/signup", json!({ "email": "not-an-email", "password": "pw" }).to_string()),
        ("/signup", json!({ "email": "alice@example.com" }).to_string()),
        ("/login", json!({ "password": "pw" }).to_string()),
        ("/login", "{not json".to_string()),
        ("/request-password-reset", json!({ "email": "alice@" }).to_string()),
        ("/request-password-reset", json!({}).to_string()),
        ("/update-password", json!({ "token": "reset-token" }).to_string()),
        ("/update-password", json!({ "password": "pw" }).to_string()),
    ];

    for (uri, body) in cases {
        let stub = Arc::new(StubProvider::default());
        let response = post_raw(&stub, uri, body.clone()).await?;

        assert_eq!(
            response.status(),
            StatusCode::BAD_REQUEST,
            "{uri} accepted {body}"
        );
        assert!(!detail(response).await?.is_empty());
        assert!(stub.calls().is_empty(), "{uri} called provider for {body}");
    }
    Ok(())
}

#[tokio::test]
async fn missing_content_type_is_bad_request() -> Result<()> {
    let stub = Arc::new(StubProvider::default());
    let app = api::app(stub.clone(), None);

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/login")
                .body(Body::from(
                    json!({ "email": "alice@example.com", "password": "pw" }).to_string(),
                ))?,
        )
        .await?;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(stub.calls().is_empty());
    Ok(())
}

#[tokio::test]
async fn health_reports_provider_status() -> Result<()> {
    let stub = Arc::new(StubProvider::default());
    let response = get(&stub, "/health").await?;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("X-App"));
    let body = json_body(response).await?;
    assert_eq!(body.get("provider").and_then(Value::as_str), Some("ok"));

    let stub = Arc::new(StubProvider {
        health: Some(Err(provider_error(503, None))),
        ..StubProvider::default()
    });
    let response = get(&stub, "/health").await?;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body = json_body(response).await?;
    assert_eq!(body.get("provider").and_then(Value::as_str), Some("error"));
    Ok(())
}

#[tokio::test]
async fn request_id_is_generated_and_propagated() -> Result<()> {
    let stub = Arc::new(StubProvider::default());

    let response = get(&stub, "/").await?;
    assert_eq!(response.status(), StatusCode::OK);
    let generated = response
        .headers()
        .get("x-request-id")
        .context("missing x-request-id")?;
    assert_eq!(generated.len(), 26);

    let app = api::app(stub.clone(), None);
    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/")
                .header("x-request-id", "req-123")
                .body(Body::empty())?,
        )
        .await?;
    assert_eq!(
        response.headers().get("x-request-id").map(|v| v.as_bytes()),
        Some(&b"req-123"[..])
    );
    Ok(())
}
