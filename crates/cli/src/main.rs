mod config;
mod error;
mod tools;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use gong::GongClient;
use mcp::Server;
use tracing_subscriber::EnvFilter;

use config::Config;
use error::Result;

const SERVER_NAME: &str = "gong-mcp";
const CONFIG_FILE: &str = "gong-mcp.toml";
const INSTRUCTIONS: &str = "Use list_calls to find Gong calls in a date range, then \
retrieve_transcripts with their IDs to read what was said.";

#[derive(Parser)]
#[command(name = "gong-mcp")]
#[command(about = "MCP server exposing Gong calls and transcripts", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to a TOML config file (default: ./gong-mcp.toml if present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the Gong tools over stdio (default)
    Serve,
    /// Print the tool declarations as JSON and exit
    Tools,
}

#[tokio::main]
async fn main() {
    init_tracing();

    if let Err(e) = run().await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

/// Log to stderr; stdout carries the protocol.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    if let Ok(path) = dotenvy::dotenv() {
        tracing::debug!(path = %path.display(), "loaded .env");
    }

    let config = load_config(cli.config.as_deref())?.with_env(|name| std::env::var(name).ok());
    let server = build_server(&config)?;

    match cli.command {
        Some(Commands::Serve) | None => cmd_serve(server).await,
        Some(Commands::Tools) => cmd_tools(&server),
    }
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Ok(Config::load(path)?),
        None if Path::new(CONFIG_FILE).exists() => Ok(Config::load(CONFIG_FILE)?),
        None => Ok(Config::default()),
    }
}

/// Validate credentials and wire the client into the tool server.
fn build_server(config: &Config) -> Result<Server> {
    let credentials = config.credentials()?;
    let client = GongClient::builder(credentials)
        .base_url(config.base_url())
        .build()?;
    let registry = tools::registry(Arc::new(client))?;

    Ok(Server::new(SERVER_NAME, env!("CARGO_PKG_VERSION"), registry).with_instructions(INSTRUCTIONS))
}

async fn cmd_serve(server: Server) -> Result<()> {
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        tools = server.registry().tools().len(),
        "serving on stdio"
    );
    server.serve_stdio().await?;
    Ok(())
}

fn cmd_tools(server: &Server) -> Result<()> {
    let tools = server.registry().tools();
    println!("{}", serde_json::to_string_pretty(&tools)?);
    Ok(())
}
