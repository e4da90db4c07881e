use clap::Parser;
use journal_api::cli::client::ApiFailure;
use journal_api::cli::utils::output_error;
use journal_api::cli::{Cli, OutputFormat};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let output_format = OutputFormat::from_cli(&cli);

    if let Err(e) = journal_api::cli::run(cli).await {
        let status = e.downcast_ref::<ApiFailure>().map(|failure| failure.status);
        let message = match std::env::var("CLI_VERBOSE").as_deref() {
            Ok("true") | Ok("1") => format!("{e:?}"),
            _ => format!("{e:#}"),
        };
        output_error(output_format, &message, status)?;
        std::process::exit(1);
    }

    Ok(())
}
