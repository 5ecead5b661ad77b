//! jsonkv CLI
//!
//! Command-line interface over a local jsonkv store file.

use std::path::PathBuf;
use std::process;
use std::time::Duration;

use clap::{Parser, Subcommand};
use jsonkv::{Config, Engine, KvError};
use serde_json::{Map, Value};
use tracing_subscriber::{fmt, EnvFilter};

/// jsonkv CLI
#[derive(Parser, Debug)]
#[command(name = "jsonkv-cli")]
#[command(about = "CLI for the jsonkv file-backed key-value store")]
#[command(version)]
struct Args {
    /// Store file (defaults to ~/Documents/data_store.json)
    #[arg(short, long)]
    file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create a key with a JSON value
    Create {
        /// The key to create
        key: String,

        /// The value, as JSON
        value: String,

        /// Time-to-live in seconds
        #[arg(short, long)]
        ttl: Option<u64>,
    },

    /// Read a value by key
    Read {
        /// The key to read
        key: String,
    },

    /// Delete a key
    Delete {
        /// The key to delete
        key: String,
    },

    /// Create every pair of a JSON object in one write
    Batch {
        /// A JSON object of key → value
        pairs: String,

        /// Time-to-live in seconds, applied to every pair
        #[arg(short, long)]
        ttl: Option<u64>,
    },

    /// List live keys
    Keys,

    /// Remove expired entries now
    Cleanup,
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,jsonkv=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    if let Err(e) = run(args) {
        tracing::error!("{}", e);
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run(args: Args) -> jsonkv::Result<()> {
    let mut builder = Config::builder();
    if let Some(file) = args.file {
        builder = builder.path(file);
    }
    let engine = Engine::open(builder.build())?;

    match args.command {
        Commands::Create { key, value, ttl } => {
            engine.create(&key, parse_json(&value)?, ttl.map(Duration::from_secs))?;
            println!("Key '{}' created successfully.", key);
        }
        Commands::Read { key } => {
            let value = engine.read(&key)?;
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
        Commands::Delete { key } => {
            engine.delete(&key)?;
            println!("Key '{}' deleted successfully.", key);
        }
        Commands::Batch { pairs, ttl } => {
            let pairs: Map<String, Value> = serde_json::from_str(&pairs)?;
            let count = pairs.len();
            engine.batch_create(pairs, ttl.map(Duration::from_secs))?;
            println!("Batch of {} keys created successfully.", count);
        }
        Commands::Keys => {
            for key in engine.keys() {
                println!("{}", key);
            }
        }
        Commands::Cleanup => {
            let removed = engine.cleanup_expired()?;
            println!("Removed {} expired keys.", removed);
        }
    }

    Ok(())
}

fn parse_json(raw: &str) -> Result<Value, KvError> {
    Ok(serde_json::from_str(raw)?)
}
