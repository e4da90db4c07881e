pub mod client;
pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

use client::ApiClient;

#[derive(Parser)]
#[command(name = "journal")]
#[command(about = "Journal CLI - write and read journal entries through the Journal API")]
#[command(version)]
pub struct Cli {
    #[arg(
        long,
        global = true,
        env = "JOURNAL_API_URL",
        default_value = "http://localhost:8000",
        help = "Journal API base URL"
    )]
    pub server: String,

    #[arg(
        long,
        global = true,
        env = "JOURNAL_TOKEN",
        hide_env_values = true,
        help = "Bearer token issued by the auth provider"
    )]
    pub token: Option<String>,

    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Create and list journal entries")]
    Entries {
        #[command(subcommand)]
        cmd: commands::entries::EntriesCommands,
    },

    #[command(about = "Check server health")]
    Health,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
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
    let client = ApiClient::new(&cli.server, cli.token)?;

    match cli.command {
        Commands::Entries { cmd } => commands::entries::handle(cmd, &client, output_format).await,
        Commands::Health => commands::health::handle(&client, output_format).await,
    }
}
