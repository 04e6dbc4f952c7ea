//! Identity provider abstraction.
//!
//! Handlers only talk to [`IdentityProvider`]; credential storage, hashing, token
//! issuance and email delivery all live behind it. Every call returns a
//! [`ProviderResult`] so handlers pattern-match on the outcome instead of catching
//! provider faults.

pub mod gotrue;

pub use gotrue::{GoTrueClient, GoTrueConfig};

use async_trait::async_trait;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub type ProviderResult<T> = Result<T, ProviderError>;

/// Error reported by the identity provider or by the transport used to reach it.
#[derive(thiserror::Error, Debug, Clone, Default, PartialEq, Eq)]
#[error("{}", .message.as_deref().unwrap_or(DEFAULT_ERROR_MESSAGE))]
pub struct ProviderError {
    /// HTTP status returned by the provider, `None` for transport failures.
    pub status: Option<u16>,
    /// Machine readable error code (e.g. `user_already_exists`).
    pub code: Option<String>,
    /// Human readable message, when the provider supplied one.
    pub message: Option<String>,
}

pub const DEFAULT_ERROR_MESSAGE: &str = "identity provider error";

impl ProviderError {
    #[must_use]
    pub fn new(status: Option<u16>, code: Option<String>, message: Option<String>) -> Self {
        Self {
            status,
            code,
            message,
        }
    }

    /// Error raised before or while talking to the provider (connect, timeout, decode).
    #[must_use]
    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            status: None,
            code: None,
            message: Some(message.into()),
        }
    }

    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }
}

/// Email and password pair forwarded to the provider.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub email: String,
    pub password: SecretString,
}

impl Credentials {
    #[must_use]
    pub fn new(email: impl Into<String>, password: SecretString) -> Self {
        Self {
            email: email.into(),
            password,
        }
    }
}

/// Provider issued session; relayed to the caller, never stored.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub access_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
}

fn default_token_type() -> String {
    "bearer".to_string()
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Create a user. `Ok(None)` means the user was created but no session was
    /// issued (email confirmation pending).
    async fn sign_up(&self, credentials: &Credentials) -> ProviderResult<Option<Session>>;

    async fn sign_in_with_password(&self, credentials: &Credentials) -> ProviderResult<Session>;

    /// Ask the provider to email a password reset link.
    async fn reset_password_for_email(&self, email: &str) -> ProviderResult<()>;

    /// Set a new password, authorized by the single-use reset token.
    async fn update_user_password(
        &self,
        reset_token: &SecretString,
        password: &SecretString,
    ) -> ProviderResult<()>;

    /// Resolve an access token to the provider's user object.
    async fn get_user(&self, token: &SecretString) -> ProviderResult<Value>;

    async fn health(&self) -> ProviderResult<()> {
        Ok(())
    }
}
