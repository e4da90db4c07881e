use anyhow::Context;
use clap::Subcommand;
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::cli::client::ApiClient;
use crate::cli::utils::{output_entries, output_entry};
use crate::cli::OutputFormat;

#[derive(Subcommand)]
pub enum EntriesCommands {
    #[command(about = "List your entries, newest first")]
    List,

    #[command(about = "Create an entry from an argument or stdin")]
    Create {
        #[arg(help = "Entry text (read from stdin when omitted)")]
        content: Option<String>,
    },
}

pub async fn handle(
    cmd: EntriesCommands,
    client: &ApiClient,
    output_format: OutputFormat,
) -> anyhow::Result<()> {
    match cmd {
        EntriesCommands::List => {
            let entries = client.list_entries().await?;
            output_entries(output_format, &entries)
        }
        EntriesCommands::Create { content } => {
            let content = match content {
                Some(content) => content,
                None => read_stdin().await?,
            };
            let entry = client.create_entry(&content).await?;
            output_entry(output_format, &entry)
        }
    }
}

async fn read_stdin() -> anyhow::Result<String> {
    read_content(tokio::io::stdin()).await
}

/// Entry text from a piped source, kept byte for byte
async fn read_content<R: AsyncRead + Unpin>(mut reader: R) -> anyhow::Result<String> {
    let mut content = String::new();
    reader
        .read_to_string(&mut content)
        .await
        .context("failed to read entry from stdin")?;
    Ok(content)
}
