//! GoTrue (Supabase Auth) REST client.
//!
//! One `reqwest::Client` is built at startup and shared by every request; it keeps
//! its own connection pool and is safe to use concurrently. Calls carry an explicit
//! timeout and are never retried.

use super::{Credentials, IdentityProvider, ProviderError, ProviderResult, Session};
use crate::APP_USER_AGENT;
use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, header::AUTHORIZATION};
use secrecy::{ExposeSecret, SecretString};
use serde_json::{Value, json};
use std::time::Duration;
use tracing::{debug, error, instrument};
use url::Url;

pub const DEFAULT_TIMEOUT_SECONDS: u64 = 10;

const API_KEY_HEADER: &str = "apikey";

/// Connection settings for a GoTrue instance.
#[derive(Clone)]
pub struct GoTrueConfig {
    base_url: String,
    api_key: SecretString,
    timeout: Duration,
    redirect_to: Option<String>,
}

impl GoTrueConfig {
    /// `base_url` is the auth API root, e.g. `https://<ref>.supabase.co/auth/v1`.
    /// # Errors
    /// Returns an error if the URL cannot be parsed or is not HTTP(S).
    pub fn new(base_url: &str, api_key: SecretString) -> Result<Self> {
        let parsed =
            Url::parse(base_url).with_context(|| format!("Invalid provider URL: {base_url}"))?;

        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(anyhow!(
                "Error parsing URL: unsupported scheme {}",
                parsed.scheme()
            ));
        }

        if parsed.host().is_none() {
            return Err(anyhow!("Error parsing URL: no host specified"));
        }

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECONDS),
            redirect_to: None,
        })
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Where the reset email link should send the user.
    #[must_use]
    pub fn with_redirect_to(mut self, redirect_to: Option<String>) -> Self {
        self.redirect_to = redirect_to;
        self
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    #[must_use]
    pub fn redirect_to(&self) -> Option<&str> {
        self.redirect_to.as_deref()
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

impl std::fmt::Debug for GoTrueConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoTrueConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"***")
            .field("timeout", &self.timeout)
            .field("redirect_to", &self.redirect_to)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct GoTrueClient {
    client: Client,
    config: GoTrueConfig,
}

impl GoTrueClient {
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: GoTrueConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(APP_USER_AGENT)
            .timeout(config.timeout())
            .build()
            .context("Error creating reqwest client")?;

        Ok(Self { client, config })
    }

    #[must_use]
    pub fn config(&self) -> &GoTrueConfig {
        &self.config
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client
            .request(method, self.config.endpoint(path))
            .header(API_KEY_HEADER, self.config.api_key.expose_secret())
    }

    fn user_request(&self, method: Method, token: &SecretString) -> RequestBuilder {
        self.request(method, "/user")
            .header(AUTHORIZATION, format!("Bearer {}", token.expose_secret()))
    }

    async fn send(&self, request: RequestBuilder) -> ProviderResult<Value> {
        let response = request.send().await.map_err(|e| {
            error!("Error calling identity provider: {:?}", e);
            ProviderError::transport(transport_message(&e))
        })?;

        let status = response.status();
        let body = response.bytes().await.map_err(|e| {
            error!("Error reading identity provider response: {:?}", e);
            ProviderError::transport(transport_message(&e))
        })?;

        if !status.is_success() {
            let err = error_from_body(status.as_u16(), &body);
            debug!(
                status = status.as_u16(),
                code = err.code.as_deref().unwrap_or_default(),
                "identity provider rejected request"
            );
            return Err(err);
        }

        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Value::Null);
        }

        serde_json::from_slice(&body).map_err(|e| {
            error!("Invalid identity provider response: {}", e);
            ProviderError::transport(format!("Invalid identity provider response: {e}"))
        })
    }
}

fn transport_message(err: &reqwest::Error) -> String {
    if err.is_timeout() {
        "Identity provider request timed out".to_string()
    } else if err.is_connect() {
        "Identity provider is unreachable".to_string()
    } else {
        format!("Identity provider request failed: {err}")
    }
}

fn first_str<'a>(value: &'a Value, keys: &[&str]) -> Option<&'a str> {
    keys.iter()
        .filter_map(|key| value.get(*key).and_then(Value::as_str))
        .map(str::trim)
        .find(|s| !s.is_empty())
}

/// Decode a GoTrue error body. Both the current `{code, error_code, msg}` shape and
/// the OAuth style `{error, error_description}` shape are understood.
fn error_from_body(status: u16, body: &[u8]) -> ProviderError {
    match serde_json::from_slice::<Value>(body) {
        Ok(value) => ProviderError::new(
            Some(status),
            first_str(&value, &["error_code", "error"]).map(str::to_string),
            first_str(&value, &["msg", "message", "error_description", "error"])
                .map(str::to_string),
        ),
        Err(_) => {
            let text = String::from_utf8_lossy(body);
            let text = text.trim();
            ProviderError::new(
                Some(status),
                None,
                (!text.is_empty()).then(|| text.to_string()),
            )
        }
    }
}

fn session_from(value: Value) -> ProviderResult<Session> {
    serde_json::from_value(value).map_err(|e| {
        error!("Provider session missing fields: {}", e);
        ProviderError::transport(format!("Invalid identity provider session: {e}"))
    })
}

fn credentials_body(credentials: &Credentials) -> Value {
    json!({
        "email": credentials.email,
        "password": credentials.password.expose_secret(),
    })
}

#[async_trait]
impl IdentityProvider for GoTrueClient {
    #[instrument(skip_all, fields(email = %credentials.email))]
    async fn sign_up(&self, credentials: &Credentials) -> ProviderResult<Option<Session>> {
        let value = self
            .send(
                self.request(Method::POST, "/signup")
                    .json(&credentials_body(credentials)),
            )
            .await?;

        // With email confirmation enabled GoTrue answers with the bare user object.
        if value.get("access_token").is_some() {
            session_from(value).map(Some)
        } else {
            debug!("sign up succeeded without a session");
            Ok(None)
        }
    }

    #[instrument(skip_all, fields(email = %credentials.email))]
    async fn sign_in_with_password(&self, credentials: &Credentials) -> ProviderResult<Session> {
        let value = self
            .send(
                self.request(Method::POST, "/token")
                    .query(&[("grant_type", "password")])
                    .json(&credentials_body(credentials)),
            )
            .await?;

        session_from(value)
    }

    #[instrument(skip(self))]
    async fn reset_password_for_email(&self, email: &str) -> ProviderResult<()> {
        let mut request = self.request(Method::POST, "/recover");

        if let Some(redirect_to) = self.config.redirect_to() {
            request = request.query(&[("redirect_to", redirect_to)]);
        }

        self.send(request.json(&json!({ "email": email })))
            .await
            .map(|_| ())
    }

    #[instrument(skip_all)]
    async fn update_user_password(
        &self,
        reset_token: &SecretString,
        password: &SecretString,
    ) -> ProviderResult<()> {
        self.send(
            self.user_request(Method::PUT, reset_token)
                .json(&json!({ "password": password.expose_secret() })),
        )
        .await
        .map(|_| ())
    }

    #[instrument(skip_all)]
    async fn get_user(&self, token: &SecretString) -> ProviderResult<Value> {
        self.send(self.user_request(Method::GET, token)).await
    }

    #[instrument(skip(self))]
    async fn health(&self) -> ProviderResult<()> {
        self.send(self.request(Method::GET, "/health"))
            .await
            .map(|_| ())
    }
}
