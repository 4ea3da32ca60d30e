mod cli;
mod server;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use lorebook::config::LorebookConfig;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "lorebook", version, about = "Semantic knowledge store with an HTTP API and MCP tools")]
struct Cli {
    /// Config file (defaults to ~/.lorebook/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start the server
    Serve {
        /// `stdio` for MCP over stdin/stdout, `http` for the HTTP API plus MCP at /mcp
        #[arg(long)]
        transport: Option<String>,
    },
    /// Manage the embedding model
    Model {
        #[command(subcommand)]
        action: ModelAction,
    },
    /// Search stored knowledge from the terminal
    Search {
        query: String,
        #[arg(long)]
        top_k: Option<i64>,
    },
    /// Show entry count and collection
    Stats,
    /// Run database diagnostics
    Doctor,
    /// Write all entries as JSON to stdout
    Export,
    /// Write entries from a JSON export file
    Import { file: PathBuf },
}

#[derive(Subcommand)]
enum ModelAction {
    /// Download the embedding model to ~/.lorebook/models/
    Download,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => LorebookConfig::load_from(path)?,
        None => LorebookConfig::load()?,
    };

    // stderr keeps stdout clean for MCP JSON-RPC and `export`
    let filter = EnvFilter::try_new(&config.server.log_level)
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Serve { transport } => {
            let transport = transport.unwrap_or_else(|| config.server.transport.clone());
            match transport.as_str() {
                "stdio" => server::serve_stdio(config).await?,
                "http" => server::serve_http(config).await?,
                other => anyhow::bail!("unknown transport: {other}. Supported: stdio, http"),
            }
        }
        Command::Model { action } => match action {
            ModelAction::Download => {
                cli::model_download(&config.embedding).await?;
            }
        },
        Command::Search { query, top_k } => cli::search::search(&config, query, top_k).await?,
        Command::Stats => cli::stats::stats(&config)?,
        Command::Doctor => cli::doctor::doctor(&config)?,
        Command::Export => cli::export::export(&config)?,
        Command::Import { file } => cli::import::import(&config, &file).await?,
    }

    Ok(())
}
