use anyhow::Result;

pub mod server;

#[derive(Debug)]
pub enum Action {
    Server(server::Args),
}

impl Action {
    /// Identity provider the action talks to.
    #[must_use]
    pub fn provider_url(&self) -> &str {
        match self {
            Self::Server(args) => &args.provider_url,
        }
    }

    /// Execute the action.
    /// # Errors
    /// Returns an error if the action fails.
    pub async fn execute(self) -> Result<()> {
        match self {
            Self::Server(args) => server::execute(args).await,
        }
    }
}
