//! # Authgate (authentication gateway)
//!
//! `authgate` is a thin HTTP front for a hosted identity provider (GoTrue / Supabase
//! Auth). It owns no credentials, sessions or tokens: every operation validates the
//! request body, performs exactly one provider call and translates the outcome into
//! an HTTP response.
//!
//! ## Endpoints
//!
//! - `POST /signup` and `POST /login` relay the provider session as
//!   `{access_token, token_type: "bearer"}`.
//! - `POST /request-password-reset` always answers with the same generic message, so
//!   the response never reveals whether an account exists.
//! - `POST /update-password` authenticates the provider call with the reset token.
//! - `GET /verify?token=` returns the provider user object unmodified.
//!
//! ## Errors
//!
//! Failures are rendered as `{"detail": "..."}`. Malformed bodies and invalid email
//! addresses are rejected with `400` before the provider is contacted.

pub mod api;
pub mod cli;
pub mod provider;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);
