pub mod client;
pub mod commands;
pub mod config;
pub mod utils;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "orchard")]
#[command(about = "Orchard CLI - Command-line client for the Orchard e-commerce API")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output raw JSON envelopes")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Initialize the configuration directory")]
    Init,

    #[command(about = "Remote server registry")]
    Server {
        #[command(subcommand)]
        cmd: commands::server::ServerCommands,
    },

    #[command(about = "Authentication and token management")]
    Auth {
        #[command(subcommand)]
        cmd: commands::auth::AuthCommands,
    },

    #[command(about = "Product catalog operations")]
    Product {
        #[command(subcommand)]
        cmd: commands::product::ProductCommands,
    },

    #[command(about = "Category operations")]
    Category {
        #[command(subcommand)]
        cmd: commands::category::CategoryCommands,
    },

    #[command(about = "Check the current server's health")]
    Health,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);

    match cli.command {
        Commands::Init => commands::init::handle(output_format).await,
        Commands::Server { cmd } => commands::server::handle(cmd, output_format).await,
        Commands::Auth { cmd } => commands::auth::handle(cmd, output_format).await,
        Commands::Product { cmd } => commands::product::handle(cmd, output_format).await,
        Commands::Category { cmd } => commands::category::handle(cmd, output_format).await,
        Commands::Health => commands::health::handle(output_format).await,
    }
}
