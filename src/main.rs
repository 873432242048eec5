use anyhow::Result;
use cedears::cli::Cli;
use cedears::dispatcher::dispatch_command;
use clap::Parser;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Logs on stderr, stdout carries command output; level from RUST_LOG
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }

    dispatch_command(cli.command, cli.json).await
}
