mod cli;
mod config;
mod error;
mod jenkins;
mod mcp;
mod output;

use anyhow::Result;
use clap::Parser;
use cli::Cli;
use log::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr; stdout is reserved for JSON-RPC frames.
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    let cli = Cli::parse();
    info!("Starting Jenkins MCP server");
    cli.execute().await?;

    Ok(())
}
