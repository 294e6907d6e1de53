use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use crate::api::{ApiClient, ProvisioningClient};
use crate::auth::{FileCredentialStore, Session};
use crate::config::{config, ClientConfig};
use crate::notify::Notifier;
use crate::shell::Shell;

/// Directory holding `credentials.json`
pub fn get_config_dir() -> anyhow::Result<PathBuf> {
    let config_dir = if let Ok(custom_dir) = std::env::var("STOCKROOM_CONFIG_DIR") {
        PathBuf::from(custom_dir)
    } else {
        let home = std::env::var("HOME").map_err(|_| anyhow::anyhow!("HOME environment variable not set"))?;
        PathBuf::from(home).join(".config").join("stockroom")
    };

    if !config_dir.exists() {
        fs::create_dir_all(&config_dir)?;
    }

    Ok(config_dir)
}

/// Everything a command needs: the hydrated session wired into a shell
pub struct CliContext {
    pub config: &'static ClientConfig,
    pub shell: Shell,
}

impl CliContext {
    pub fn load() -> anyhow::Result<Self> {
        let config = config();
        let store = FileCredentialStore::in_dir(&get_config_dir()?)?;
        tracing::debug!("Credential store at {}", store.path().display());

        let session = Session::hydrate(Arc::new(store))?;
        let client = ApiClient::from_config(config, session)?;
        let notifier = Notifier::new(config.ui.notification_duration());

        Ok(Self {
            config,
            shell: Shell::new(client, notifier),
        })
    }

    pub fn client(&self) -> &ApiClient {
        self.shell.client()
    }

    /// `None` when no provisioning endpoint is configured
    pub fn provisioner(&self) -> anyhow::Result<Option<ProvisioningClient>> {
        Ok(ProvisioningClient::from_config(self.config)?)
    }
}
