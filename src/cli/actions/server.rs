use crate::{
    api,
    cli::telemetry,
    provider::{GoTrueClient, GoTrueConfig},
};
use anyhow::{Context, Result};
use secrecy::SecretString;
use std::{sync::Arc, time::Duration};
use tracing::{debug, info};

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub cors_origin: Option<String>,
    pub provider_url: String,
    pub provider_api_key: SecretString,
    pub provider_timeout_seconds: u64,
    pub password_reset_redirect_url: Option<String>,
}

/// Build the identity provider client described by `args`.
/// # Errors
/// Returns an error if the provider URL is invalid or the HTTP client cannot be built.
pub fn provider_client(args: &Args) -> Result<GoTrueClient> {
    let config = GoTrueConfig::new(&args.provider_url, args.provider_api_key.clone())
        .context("Invalid identity provider configuration")?
        .with_timeout(Duration::from_secs(args.provider_timeout_seconds))
        .with_redirect_to(args.password_reset_redirect_url.clone());

    debug!("Identity provider: {:?}", config);

    GoTrueClient::new(config)
}

/// Execute the server action.
/// # Errors
/// Returns an error if the provider client cannot be built or the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    let provider = provider_client(&args)?;

    info!(
        provider = provider.config().base_url(),
        "Identity provider configured"
    );

    let result = api::new(args.port, Arc::new(provider), args.cors_origin.as_deref()).await;

    telemetry::shutdown_tracer();

    result
}
