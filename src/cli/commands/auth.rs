use clap::Subcommand;
use serde_json::json;
use std::io::Write;

use crate::cli::client::ApiClient;
use crate::cli::{config, utils, OutputFormat};

#[derive(Subcommand)]
pub enum AuthCommands {
    #[command(about = "Login to the current server")]
    Login {
        #[arg(help = "Account email")]
        email: String,
        #[arg(long, help = "Password (will prompt if not provided)")]
        password: Option<String>,
    },

    #[command(about = "Discard the saved session for the current server")]
    Logout,

    #[command(about = "Show saved sessions")]
    Status,

    #[command(about = "Show the logged-in account")]
    Whoami,
}

fn prompt_password() -> anyhow::Result<String> {
    print!("Password: ");
    std::io::stdout().flush()?;
    let mut password = String::new();
    std::io::stdin().read_line(&mut password)?;
    Ok(password.trim_end_matches(['\r', '\n']).to_string())
}

pub async fn handle(cmd: AuthCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        AuthCommands::Login { email, password } => {
            let (server_name, entry) = config::current_server()?;
            let password = match password {
                Some(p) => p,
                None => prompt_password()?,
            };

            let client = ApiClient::new(entry.url, None)?;
            let outcome = client
                .post(
                    "/auth/login",
                    Some(json!({ "email": email, "password": password })),
                )
                .await?;

            if !outcome.is_success() {
                utils::exit_api_error(&output_format, &outcome);
            }

            let data = outcome.data();
            let access_token = data
                .get("access_token")
                .and_then(|v| v.as_str())
                .ok_or_else(|| anyhow::anyhow!("Login response is missing access_token"))?;
            let refresh_token = data
                .get("refresh_token")
                .and_then(|v| v.as_str())
                .unwrap_or_default();

            let mut auth = config::load_auth()?;
            auth.sessions.insert(
                server_name.clone(),
                config::StoredSession {
                    email: email.clone(),
                    access_token: access_token.to_string(),
                    refresh_token: refresh_token.to_string(),
                    saved_at: chrono::Utc::now(),
                },
            );
            config::save_auth(&auth)?;

            match output_format {
                OutputFormat::Json => utils::output_json(&outcome.body),
                OutputFormat::Text => utils::output_success(
                    &output_format,
                    &format!("Logged in as {} on '{}'", email, server_name),
                    None,
                ),
            }
        }
        AuthCommands::Logout => {
            let (server_name, _) = config::current_server()?;
            let mut auth = config::load_auth()?;

            if auth.sessions.remove(&server_name).is_none() {
                return Err(anyhow::anyhow!("No session saved for '{}'", server_name));
            }
            config::save_auth(&auth)?;

            utils::output_success(
                &output_format,
                &format!("Logged out of '{}'", server_name),
                None,
            )
        }
        AuthCommands::Status => {
            let auth = config::load_auth()?;
            match output_format {
                OutputFormat::Json => {
                    let sessions: Vec<_> = auth
                        .sessions
                        .iter()
                        .map(|(server, session)| {
                            json!({
                                "server": server,
                                "email": session.email,
                                "saved_at": session.saved_at,
                            })
                        })
                        .collect();
                    utils::output_json(&json!({ "sessions": sessions }))
                }
                OutputFormat::Text => {
                    if auth.sessions.is_empty() {
                        println!("No saved sessions");
                        return Ok(());
                    }

                    let mut servers: Vec<&String> = auth.sessions.keys().collect();
                    servers.sort();

                    let rows: Vec<Vec<String>> = servers
                        .into_iter()
                        .map(|server| {
                            let session = &auth.sessions[server];
                            vec![
                                server.clone(),
                                session.email.clone(),
                                session.saved_at.format("%Y-%m-%d %H:%M").to_string(),
                            ]
                        })
                        .collect();

                    utils::print_table(&["SERVER", "EMAIL", "SAVED"], &rows);
                    Ok(())
                }
            }
        }
        AuthCommands::Whoami => {
            let client = ApiClient::authenticated()?;
            let outcome = client.get("/api/auth/whoami").await?;

            if !outcome.is_success() {
                utils::exit_api_error(&output_format, &outcome);
            }

            match output_format {
                OutputFormat::Json => utils::output_json(&outcome.body),
                OutputFormat::Text => {
                    let user = outcome.data();
                    println!("Email: {}", utils::field_str(user, "email"));
                    println!("Name:  {}", utils::field_str(user, "name"));
                    println!("Role:  {}", utils::field_str(user, "role"));
                    Ok(())
                }
            }
        }
    }
}
