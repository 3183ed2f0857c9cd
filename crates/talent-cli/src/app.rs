//! Command dispatch.

use std::io::Write;
use std::sync::Arc;

use anyhow::Context;
use talent_client::ApiClient;
use talent_session::{CredentialStore, FileCredentialStore, SessionError, SessionStore};
use tracing::debug;

use crate::commands::Command;
use crate::config::CliConfig;
use crate::notify::Notice;
use crate::views::{self, Outcome};

/// Front-end state shared by every command.
#[derive(Debug)]
pub struct App {
    store: SessionStore,
}

impl App {
    pub fn new(api: ApiClient, credentials: Arc<dyn CredentialStore>) -> Self {
        Self {
            store: SessionStore::new(api, credentials),
        }
    }

    /// Build the client and the file-backed credential store from config.
    pub fn from_config(config: &CliConfig) -> anyhow::Result<Self> {
        let api = ApiClient::new(config.client.clone()).context("Failed to build API client")?;
        let credentials = Arc::new(FileCredentialStore::new(&config.state_dir));
        debug!(
            base_url = %api.base_url(),
            state_dir = %config.state_dir.display(),
            "App configured"
        );
        Ok(Self::new(api, credentials))
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    /// Settle any saved session, then run `command`.
    pub async fn run<W: Write>(&self, command: Command, out: &mut W) -> anyhow::Result<Outcome> {
        if command.restores_session() {
            match self.store.restore().await {
                Ok(_) => {}
                Err(SessionError::SessionExpired) => {
                    Notice::info("Session expired", SessionError::SessionExpired.message())
                        .write_to(out)?;
                }
                Err(e) => return Err(e).context("Failed to restore session"),
            }
        }

        let outcome = match command {
            Command::Register(args) => views::auth::register(&self.store, args, out).await?,
            Command::Login(args) => views::auth::login(&self.store, args, out).await?,
            Command::Logout => views::auth::logout(&self.store, out)?,
            Command::Whoami => views::auth::whoami(&self.store, out)?,
            Command::Upload { path } => {
                views::profile::upload_resume(&self.store, &path, out).await?
            }
            Command::Jobs(command) => views::business::jobs(&self.store, command, out).await?,
            Command::Matches(command) => {
                views::business::matches(&self.store, command, out).await?
            }
            Command::Dashboard => views::business::dashboard(&self.store, out).await?,
        };

        Ok(outcome)
    }
}
