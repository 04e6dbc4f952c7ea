//! Command-line argument dispatch.
//!
//! This module maps validated CLI arguments to the action to run, such as
//! starting the API server with its identity provider configuration.

use crate::cli::actions::{Action, server::Args};
use crate::cli::commands::{ARG_CORS_ORIGIN, ARG_PORT, provider};
use anyhow::Result;

/// Map validated CLI matches to a server action.
///
/// # Errors
/// Returns an error if required arguments are missing or inconsistent.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let port = matches.get_one::<u16>(ARG_PORT).copied().unwrap_or(8080);
    let cors_origin = matches.get_one::<String>(ARG_CORS_ORIGIN).cloned();

    let provider_opts = provider::Options::parse(matches)?;

    Ok(Action::Server(Args {
        port,
        cors_origin,
        provider_url: provider_opts.url,
        provider_api_key: provider_opts.api_key,
        provider_timeout_seconds: provider_opts.timeout_seconds,
        password_reset_redirect_url: provider_opts.password_reset_redirect_url,
    }))
}
