use crate::cli::{config, utils, OutputFormat};
use serde_json::json;

pub async fn handle(output_format: OutputFormat) -> anyhow::Result<()> {
    let config_dir = config::get_config_dir()?;

    let servers_file = config_dir.join("servers.json");
    if !servers_file.exists() {
        config::save_servers(&config::ServersFile::default())?;
    }

    let auth_file = config_dir.join("auth.json");
    if !auth_file.exists() {
        config::save_auth(&config::AuthFile::default())?;
    }

    utils::output_success(
        &output_format,
        &format!("Configuration initialized at {}", config_dir.display()),
        Some(json!({ "config_dir": config_dir.display().to_string() })),
    )
}
