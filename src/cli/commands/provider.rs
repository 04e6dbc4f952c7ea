use anyhow::{Context, Result};
use clap::{Arg, ArgMatches, Command};
use secrecy::SecretString;

pub const ARG_PROVIDER_URL: &str = "provider-url";
pub const ARG_PROVIDER_API_KEY: &str = "provider-api-key";
pub const ARG_PROVIDER_TIMEOUT: &str = "provider-timeout";
pub const ARG_PASSWORD_RESET_REDIRECT_URL: &str = "password-reset-redirect-url";

#[derive(Debug)]
pub struct Options {
    pub url: String,
    pub api_key: SecretString,
    pub timeout_seconds: u64,
    pub password_reset_redirect_url: Option<String>,
}

impl Options {
    /// # Errors
    /// Returns an error if a required provider argument is missing.
    pub fn parse(matches: &ArgMatches) -> Result<Self> {
        let url = matches
            .get_one::<String>(ARG_PROVIDER_URL)
            .cloned()
            .context("missing required argument: --provider-url")?;
        let api_key = matches
            .get_one::<String>(ARG_PROVIDER_API_KEY)
            .cloned()
            .map(SecretString::from)
            .context("missing required argument: --provider-api-key")?;
        let timeout_seconds = matches
            .get_one::<u64>(ARG_PROVIDER_TIMEOUT)
            .copied()
            .unwrap_or(crate::provider::gotrue::DEFAULT_TIMEOUT_SECONDS);

        Ok(Self {
            url,
            api_key,
            timeout_seconds,
            password_reset_redirect_url: matches
                .get_one::<String>(ARG_PASSWORD_RESET_REDIRECT_URL)
                .cloned(),
        })
    }
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_PROVIDER_URL)
                .long(ARG_PROVIDER_URL)
                .help("Identity provider auth API URL, example: https://<project>.supabase.co/auth/v1")
                .env("AUTHGATE_PROVIDER_URL")
                .required(true),
        )
        .arg(
            Arg::new(ARG_PROVIDER_API_KEY)
                .long(ARG_PROVIDER_API_KEY)
                .help("Identity provider API key, sent as the apikey header")
                .env("AUTHGATE_PROVIDER_API_KEY")
                .hide_env_values(true)
                .required(true),
        )
        .arg(
            Arg::new(ARG_PROVIDER_TIMEOUT)
                .long(ARG_PROVIDER_TIMEOUT)
                .help("Timeout in seconds for each identity provider request")
                .env("AUTHGATE_PROVIDER_TIMEOUT")
                .default_value("10")
                .value_parser(clap::value_parser!(u64).range(1..)),
        )
        .arg(
            Arg::new(ARG_PASSWORD_RESET_REDIRECT_URL)
                .long(ARG_PASSWORD_RESET_REDIRECT_URL)
                .help("URL the password reset email link redirects to")
                .env("AUTHGATE_PASSWORD_RESET_REDIRECT_URL"),
        )
}
