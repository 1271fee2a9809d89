use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One entry in `servers.json`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerEntry {
    pub url: String,
    pub added_at: DateTime<Utc>,
}

impl ServerEntry {
    pub fn new(url: String) -> Self {
        Self {
            url,
            added_at: Utc::now(),
        }
    }
}

/// `servers.json`: named servers plus the current selection
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ServersFile {
    pub servers: HashMap<String, ServerEntry>,
    pub current: Option<String>,
}

/// One saved login, keyed by server name in `auth.json`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredSession {
    pub email: String,
    pub access_token: String,
    pub refresh_token: String,
    pub saved_at: DateTime<Utc>,
}

/// `auth.json`: tokens per server
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct AuthFile {
    pub sessions: HashMap<String, StoredSession>,
}

/// Resolve (and create) the CLI config directory:
/// `$ORCHARD_CLI_CONFIG_DIR` or `~/.config/orchard/cli`
pub fn get_config_dir() -> anyhow::Result<PathBuf> {
    let config_dir = if let Ok(custom_dir) = std::env::var("ORCHARD_CLI_CONFIG_DIR") {
        PathBuf::from(custom_dir)
    } else {
        let home = std::env::var("HOME")
            .map_err(|_| anyhow::anyhow!("HOME environment variable not set"))?;
        PathBuf::from(home).join(".config").join("orchard").join("cli")
    };

    if !config_dir.exists() {
        fs::create_dir_all(&config_dir)?;
    }

    Ok(config_dir)
}

pub fn load_servers() -> anyhow::Result<ServersFile> {
    let file = get_config_dir()?.join("servers.json");
    if !file.exists() {
        return Ok(ServersFile::default());
    }

    let content = fs::read_to_string(file)?;
    Ok(serde_json::from_str(&content)?)
}

pub fn save_servers(config: &ServersFile) -> anyhow::Result<()> {
    let file = get_config_dir()?.join("servers.json");
    fs::write(file, serde_json::to_string_pretty(config)?)?;
    Ok(())
}

pub fn load_auth() -> anyhow::Result<AuthFile> {
    let file = get_config_dir()?.join("auth.json");
    if !file.exists() {
        return Ok(AuthFile::default());
    }

    let content = fs::read_to_string(file)?;
    Ok(serde_json::from_str(&content)?)
}

pub fn save_auth(config: &AuthFile) -> anyhow::Result<()> {
    let file = get_config_dir()?.join("auth.json");
    fs::write(file, serde_json::to_string_pretty(config)?)?;
    Ok(())
}

/// The currently selected server, or an instruction to pick one
pub fn current_server() -> anyhow::Result<(String, ServerEntry)> {
    let servers = load_servers()?;
    let name = servers
        .current
        .clone()
        .ok_or_else(|| anyhow::anyhow!("No server selected. Run `orchard server add` first"))?;
    let entry = servers
        .servers
        .get(&name)
        .cloned()
        .ok_or_else(|| anyhow::anyhow!("Current server '{}' is not in the registry", name))?;
    Ok((name, entry))
}

/// Saved tokens for the current server, if logged in
pub fn current_session() -> anyhow::Result<Option<StoredSession>> {
    let (name, _) = current_server()?;
    Ok(load_auth()?.sessions.get(&name).cloned())
}

pub async fn ping_server(url: &str) -> bool {
    let client = reqwest::Client::new();
    let health_url = format!("{}/health", url.trim_end_matches('/'));

    match client
        .get(&health_url)
        .timeout(std::time::Duration::from_secs(5))
        .send()
        .await
    {
        Ok(response) if response.status().is_success() => true,
        _ => false,
    }
}
