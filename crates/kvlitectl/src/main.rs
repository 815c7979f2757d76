//! kvlitectl: Command-line interface for the Kvlite key-value store.
//!
//! Provides commands for reading, writing, merging and removing records in a
//! store directory from the terminal.

mod commands;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use kvlite::observability::tracing::init_tracing;
use kvlite::{AsyncKvStorage, StoreConfig};

/// Command-line interface for the Kvlite key-value store.
#[derive(Parser)]
#[command(name = "kvlitectl")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(flatten)]
    store: StoreConfig,

    /// Output format (text, json)
    #[arg(short, long, default_value = "text")]
    output: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(format!("unknown output format: {}", s)),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Print the value stored under a key
    Get {
        /// Record key
        key: String,
    },
    /// Store a value, replacing any previous one
    Set {
        /// Record key
        key: String,
        /// Value to store
        value: String,
    },
    /// Deep-merge a JSON object into the stored object
    Merge {
        /// Record key
        key: String,
        /// JSON object to merge in
        json: String,
    },
    /// Remove one or more keys
    Remove {
        /// Keys to remove
        #[arg(required = true)]
        keys: Vec<String>,
    },
    /// List all keys
    Keys,
    /// Delete every record
    Clear,
    /// Delete every record and close the store, deleting the file if needed
    Wipe,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing("warn");

    let cli = Cli::parse();
    tracing::debug!(data_dir = %cli.store.data_dir.display(), "Opening store");

    let storage = AsyncKvStorage::open(cli.store).context("failed to initialize storage")?;

    match cli.command {
        Commands::Get { key } => commands::read::get(&storage, key, cli.output).await?,
        Commands::Keys => commands::read::keys(&storage, cli.output).await?,
        Commands::Set { key, value } => {
            commands::write::set(&storage, key, value, cli.output).await?;
        }
        Commands::Merge { key, json } => {
            commands::write::merge(&storage, key, json, cli.output).await?;
        }
        Commands::Remove { keys } => commands::write::remove(&storage, keys, cli.output).await?,
        Commands::Clear => commands::maintenance::clear(&storage, cli.output).await?,
        Commands::Wipe => commands::maintenance::wipe(&storage, cli.output).await?,
    }

    Ok(())
}
