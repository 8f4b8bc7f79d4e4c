//! Wiring a session manager from the command-line configuration.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use directories::ProjectDirs;
use tracing::debug;

use hearth::{CredentialStore, SessionManager};
use hearth_core::ApiUrl;
use hearth_file::FileTokenStorage;
use hearth_http::HttpIdentityApi;

use crate::cli::Cli;

/// Resolved configuration shared by every command.
#[derive(Debug)]
pub struct Config {
    pub api_url: ApiUrl,
    pub storage: PathBuf,
}

impl Config {
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let api_url = ApiUrl::new(&cli.api_url).context("Invalid API URL")?;
        let storage = match &cli.storage {
            Some(path) => path.clone(),
            None => default_storage_path()?,
        };

        Ok(Self { api_url, storage })
    }

    /// Build a manager over the storage file, in the initial state.
    pub fn manager(&self) -> Result<SessionManager<HttpIdentityApi>> {
        let (api, store) = self.parts()?;
        Ok(SessionManager::new(api, store))
    }

    /// Build a manager and revalidate any stored token, as on app startup.
    pub async fn restore(&self) -> Result<SessionManager<HttpIdentityApi>> {
        let (api, store) = self.parts()?;
        Ok(SessionManager::start(api, store).await)
    }

    fn parts(&self) -> Result<(HttpIdentityApi, Arc<CredentialStore>)> {
        debug!(api = %self.api_url, storage = %self.storage.display(), "Opening session");
        if let Some(parent) = self.storage.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).context("Failed to create storage directory")?;
        }

        let store = Arc::new(CredentialStore::new(Arc::new(FileTokenStorage::new(
            &self.storage,
        ))));
        let api = HttpIdentityApi::new(self.api_url.clone(), store.clone())
            .context("Failed to create API client")?;

        Ok((api, store))
    }
}

fn default_storage_path() -> Result<PathBuf> {
    let dirs = ProjectDirs::from("", "", "hearth").context("Could not determine data directory")?;
    Ok(dirs.data_dir().join("storage.json"))
}
