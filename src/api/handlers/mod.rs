//! API handlers and shared utilities for the gateway.
//!
//! Every auth handler follows the same shape: extract and validate the body, make a
//! single identity provider call, translate the outcome. Failures are rendered as
//! `{"detail": "..."}` through [`ApiError`].

pub mod health;
pub mod login;
pub mod password;
pub mod root;
pub mod signup;
pub mod types;
pub mod verify;

use crate::provider::IdentityProvider;
use axum::{
    Json,
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use regex::Regex;
use std::sync::Arc;
use tracing::debug;
use types::ErrorDetail;

/// Shared handle to the identity provider, injected as an axum `Extension`.
pub type DynIdentityProvider = Arc<dyn IdentityProvider>;

/// Lightweight email sanity check applied while request bodies are decoded.
pub fn valid_email(email: &str) -> bool {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").is_ok_and(|re| re.is_match(email))
}

/// Handler error rendered as `{"detail": ...}` with the chosen status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    status: StatusCode,
    detail: String,
}

impl ApiError {
    #[must_use]
    pub fn new(status: StatusCode, detail: impl Into<String>) -> Self {
        Self {
            status,
            detail: detail.into(),
        }
    }

    #[must_use]
    pub fn bad_request(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, detail)
    }

    #[must_use]
    pub fn unauthorized(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, detail)
    }

    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    #[must_use]
    pub fn detail(&self) -> &str {
        &self.detail
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorDetail {
                detail: self.detail,
            }),
        )
            .into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        debug!("rejected request body: {}", rejection.body_text());
        Self::bad_request(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        debug!("rejected query string: {}", rejection.body_text());
        Self::bad_request(rejection.body_text())
    }
}

#[cfg(test)]
mod tests;
