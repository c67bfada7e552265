use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use catalogo::api;
use catalogo::config::Config;
use catalogo::storage::Database;

#[derive(Parser, Debug)]
#[command(name = "catalogo", about = "REST API for articles and price lists")]
struct Args {
    /// Path to the TOML configuration file
    #[arg(long, value_name = "FILE", default_value = "catalogo.toml")]
    config: PathBuf,

    /// Address to bind (overrides config and environment)
    #[arg(long)]
    host: Option<String>,

    /// Port to bind (overrides config and PORT)
    #[arg(long)]
    port: Option<u16>,

    /// SQLite database file (overrides config and DATABASE_PATH)
    #[arg(long, value_name = "PATH")]
    database: Option<String>,
}

impl Args {
    fn apply(self, config: &mut Config) {
        if let Some(host) = self.host {
            config.server.host = host;
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(database) = self.database {
            config.database.path = database;
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let mut config = Config::load(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;
    config.apply_env().context("Invalid environment override")?;
    args.apply(&mut config);

    let db = Database::connect(&config.database)
        .await
        .with_context(|| format!("Failed to open database at {}", config.database.path))?;

    let result = api::serve(&config.server, db.clone())
        .await
        .context("HTTP server failed");

    db.close().await;
    result
}
