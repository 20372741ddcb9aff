use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::auth::{Credentials, SessionContext, Theme};
use crate::client::HttpResourceClient;
use crate::config::config;

const STATE_FILE: &str = "console.json";

/// Everything the CLI remembers between invocations
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConsoleState {
    /// Overrides the configured API base URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default)]
    pub theme: Theme,
}

impl ConsoleState {
    pub fn api_url(&self) -> String {
        self.server_url
            .clone()
            .unwrap_or_else(|| config().api.base_url.clone())
    }

    pub fn credentials(&self) -> Option<Credentials> {
        self.access.as_ref().map(|access| Credentials {
            access: access.clone(),
            refresh: self.refresh.clone(),
            username: self.username.clone(),
        })
    }

    pub fn set_credentials(&mut self, credentials: Option<Credentials>) {
        match credentials {
            Some(c) => {
                self.access = Some(c.access);
                self.refresh = c.refresh;
                self.username = c.username;
            }
            None => {
                self.access = None;
                self.refresh = None;
                self.username = None;
            }
        }
    }

    /// Session context for this invocation, seeded from the persisted state
    pub fn session(&self) -> Arc<SessionContext> {
        Arc::new(SessionContext::new(self.credentials(), self.theme))
    }

    /// Copy the session back so it can be saved
    pub async fn absorb(&mut self, session: &SessionContext) {
        self.set_credentials(session.credentials().await);
        self.theme = session.theme().await;
    }

    pub fn client(&self, session: Arc<SessionContext>) -> anyhow::Result<HttpResourceClient> {
        let mut api = config().api.clone();
        api.base_url = self.api_url();
        Ok(HttpResourceClient::from_config(&api, session)?)
    }
}

pub fn get_config_dir() -> anyhow::Result<PathBuf> {
    let config_dir = if let Ok(custom_dir) = std::env::var("FOLIO_CONFIG_DIR") {
        PathBuf::from(custom_dir)
    } else {
        let home = std::env::var("HOME").map_err(|_| anyhow::anyhow!("HOME environment variable not set"))?;
        PathBuf::from(home).join(".config").join("folio")
    };

    if !config_dir.exists() {
        fs::create_dir_all(&config_dir)?;
    }

    Ok(config_dir)
}

pub fn load_console_state() -> anyhow::Result<ConsoleState> {
    load_state_from(&get_config_dir()?.join(STATE_FILE))
}

pub fn save_console_state(state: &ConsoleState) -> anyhow::Result<()> {
    save_state_to(&get_config_dir()?.join(STATE_FILE), state)
}

pub fn load_state_from(path: &Path) -> anyhow::Result<ConsoleState> {
    if !path.exists() {
        return Ok(ConsoleState::default());
    }

    let content = fs::read_to_string(path)?;
    let state: ConsoleState = serde_json::from_str(&content)?;
    Ok(state)
}

pub fn save_state_to(path: &Path, state: &ConsoleState) -> anyhow::Result<()> {
    let content = serde_json::to_string_pretty(state)?;
    fs::write(path, content)?;
    Ok(())
}
