//! Request/response types for auth endpoints.
//!
//! Each endpoint has its own flat body type. Email addresses are validated while the
//! body is deserialized, so a malformed request never reaches the provider.

use super::valid_email;
use crate::provider::{Credentials, Session};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Email address normalized to trimmed lowercase and checked for basic syntax.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(try_from = "String", into = "String")]
pub struct EmailAddress(String);

impl EmailAddress {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for EmailAddress {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        let email = value.trim().to_lowercase();

        if valid_email(&email) {
            Ok(Self(email))
        } else {
            Err("value is not a valid email address".to_string())
        }
    }
}

impl From<EmailAddress> for String {
    fn from(value: EmailAddress) -> Self {
        value.0
    }
}

#[derive(ToSchema, Deserialize, Debug)]
pub struct UserCredentials {
    #[schema(value_type = String, example = "alice@example.com")]
    pub email: EmailAddress,
    #[schema(value_type = String, format = Password)]
    pub password: SecretString,
}

impl From<UserCredentials> for Credentials {
    fn from(value: UserCredentials) -> Self {
        Self::new(String::from(value.email), value.password)
    }
}

#[derive(ToSchema, Deserialize, Debug)]
pub struct PasswordResetRequest {
    #[schema(value_type = String, example = "alice@example.com")]
    pub email: EmailAddress,
}

#[derive(ToSchema, Deserialize, Debug)]
pub struct PasswordUpdateRequest {
    /// Reset token delivered by the password reset email.
    #[schema(value_type = String)]
    pub token: SecretString,
    #[schema(value_type = String, format = Password)]
    pub password: SecretString,
}

#[derive(IntoParams, Deserialize, Debug)]
#[into_params(parameter_in = Query)]
pub struct VerifyParams {
    /// Access token issued by the identity provider.
    pub token: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
}

impl TokenResponse {
    /// Relay a provider session; the token type is always reported as `bearer`.
    #[must_use]
    pub fn bearer(session: Session) -> Self {
        Self {
            access_token: session.access_token,
            token_type: "bearer".to_string(),
        }
    }
}

#[derive(ToSchema, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(ToSchema, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct ErrorDetail {
    pub detail: String,
}
