use clap::Subcommand;
use serde_json::json;

use crate::cli::{config, utils, OutputFormat};

#[derive(Subcommand)]
pub enum ServerCommands {
    #[command(about = "Register a server")]
    Add {
        #[arg(help = "Server name")]
        name: String,
        #[arg(help = "Server URL, e.g. http://localhost:3000")]
        url: String,
    },

    #[command(about = "Switch to a registered server")]
    Use {
        #[arg(help = "Server name to switch to")]
        name: String,
    },

    #[command(about = "List registered servers")]
    List,

    #[command(about = "Health check a server (defaults to current)")]
    Ping {
        #[arg(help = "Server name to ping")]
        name: Option<String>,
    },
}

pub async fn handle(cmd: ServerCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        ServerCommands::Add { name, url } => {
            url::Url::parse(&url).map_err(|e| anyhow::anyhow!("Invalid URL '{}': {}", url, e))?;

            let mut servers = config::load_servers()?;
            servers
                .servers
                .insert(name.clone(), config::ServerEntry::new(url.clone()));
            // First registered server becomes the selection
            if servers.current.is_none() {
                servers.current = Some(name.clone());
            }
            config::save_servers(&servers)?;

            utils::output_success(
                &output_format,
                &format!("Server '{}' registered", name),
                Some(json!({ "name": name, "url": url })),
            )
        }
        ServerCommands::Use { name } => {
            let mut servers = config::load_servers()?;
            if !servers.servers.contains_key(&name) {
                return Err(anyhow::anyhow!("Server '{}' not found", name));
            }
            servers.current = Some(name.clone());
            config::save_servers(&servers)?;

            utils::output_success(
                &output_format,
                &format!("Switched to server '{}'", name),
                Some(json!({ "current": name })),
            )
        }
        ServerCommands::List => {
            let servers = config::load_servers()?;
            match output_format {
                OutputFormat::Json => utils::output_json(&serde_json::to_value(&servers)?),
                OutputFormat::Text => {
                    if servers.servers.is_empty() {
                        println!("No servers registered. Run `orchard server add <name> <url>`");
                        return Ok(());
                    }

                    let mut names: Vec<&String> = servers.servers.keys().collect();
                    names.sort();

                    let rows: Vec<Vec<String>> = names
                        .into_iter()
                        .map(|name| {
                            let entry = &servers.servers[name];
                            let marker = if servers.current.as_deref() == Some(name.as_str()) {
                                "*"
                            } else {
                                ""
                            };
                            vec![
                                marker.to_string(),
                                name.clone(),
                                entry.url.clone(),
                                entry.added_at.format("%Y-%m-%d").to_string(),
                            ]
                        })
                        .collect();

                    utils::print_table(&["", "NAME", "URL", "ADDED"], &rows);
                    Ok(())
                }
            }
        }
        ServerCommands::Ping { name } => {
            let servers = config::load_servers()?;
            let target = match name.or_else(|| servers.current.clone()) {
                Some(n) => n,
                None => return Err(anyhow::anyhow!("No server selected")),
            };
            let entry = servers
                .servers
                .get(&target)
                .ok_or_else(|| anyhow::anyhow!("Server '{}' not found", target))?;

            if config::ping_server(&entry.url).await {
                utils::output_success(
                    &output_format,
                    &format!("Server '{}' is up ({})", target, entry.url),
                    Some(json!({ "server": target, "status": "up" })),
                )
            } else {
                utils::output_error(
                    &output_format,
                    &format!("Server '{}' is down ({})", target, entry.url),
                    None,
                )?;
                std::process::exit(1);
            }
        }
    }
}
