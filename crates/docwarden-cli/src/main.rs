//! Docwarden CLI - Maintenance for vector-store document collections

use std::path::Path;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;
mod config;
mod output;

use commands::{collection, completions, doc, maintain, serve};
use config::Config;
use docwarden_maint::{ErrorLog, FileErrorLog};
use docwarden_storage::CollectionStore;
use output::OutputFormat;

#[derive(Parser)]
#[command(name = "docwarden")]
#[command(author, version, about = "Bulk maintenance for document collections")]
pub struct Cli {
    /// Data directory
    #[arg(short, long, global = true, env = "DOCWARDEN_DATA_DIR")]
    pub data_dir: Option<String>,

    /// Collection to operate on (default: from config)
    #[arg(short, long, global = true)]
    pub collection: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text", global = true)]
    pub format: OutputFormat,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run maintenance passes
    Maintain(maintain::MaintainArgs),
    /// Manage collections
    Collection(collection::CollectionArgs),
    /// Add, read, query and delete documents
    Doc(doc::DocArgs),
    /// Start MCP server
    Serve(serve::ServeArgs),
    /// Manage configuration
    Config(commands::config::ConfigArgs),
    /// Generate shell completions
    Completions(completions::CompletionsArgs),
}

/// Application context with storage backend
pub struct AppContext {
    pub store: Arc<dyn CollectionStore>,
    pub error_log: Arc<dyn ErrorLog>,
    pub config: Config,
    pub collection: String,
    pub format: OutputFormat,
}

impl AppContext {
    pub async fn new(cli: &Cli, config: Config) -> anyhow::Result<Self> {
        let data_dir = config.resolve_data_dir(cli.data_dir.as_deref());
        std::fs::create_dir_all(&data_dir)?;

        let store = open_store(&data_dir)?;
        store.initialize().await?;

        let error_log_path = config.resolve_error_log(&data_dir);
        tracing::debug!("Maintenance errors go to {:?}", error_log_path);

        Ok(Self {
            store,
            error_log: Arc::new(FileErrorLog::new(error_log_path)),
            collection: cli
                .collection
                .clone()
                .unwrap_or_else(|| config.default_collection.clone()),
            format: cli.format,
            config,
        })
    }
}

#[cfg(feature = "redb")]
fn open_store(data_dir: &Path) -> anyhow::Result<Arc<dyn CollectionStore>> {
    let db_path = data_dir.join("docwarden.redb");
    tracing::debug!("Using database at: {:?}", db_path);
    Ok(Arc::new(docwarden_storage::RedbStore::open(&db_path)?))
}

#[cfg(all(feature = "sqlite", not(feature = "redb")))]
fn open_store(data_dir: &Path) -> anyhow::Result<Arc<dyn CollectionStore>> {
    let db_path = data_dir.join("docwarden.db");
    tracing::debug!("Using database at: {:?}", db_path);
    Ok(Arc::new(docwarden_storage::SqliteStore::open(&db_path)?))
}

#[cfg(not(any(feature = "redb", feature = "sqlite")))]
fn open_store(_data_dir: &Path) -> anyhow::Result<Arc<dyn CollectionStore>> {
    tracing::warn!("No persistent backend compiled in; using an in-memory store");
    Ok(Arc::new(docwarden_storage::MemoryStore::new()))
}

fn init_logging(cli: &Cli) {
    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    // stdout carries command output and the stdio MCP transport
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(&cli);

    tracing::debug!("Starting docwarden CLI");

    match &cli.command {
        Commands::Config(args) => return commands::config::run(args),
        Commands::Completions(args) => return completions::run(args),
        _ => {}
    }

    let ctx = AppContext::new(&cli, Config::load()).await?;

    let result = match &cli.command {
        Commands::Maintain(args) => maintain::run(args, &ctx).await,
        Commands::Collection(args) => collection::run(args, &ctx).await,
        Commands::Doc(args) => doc::run(args, &ctx).await,
        Commands::Serve(args) => serve::run(args, &ctx).await,
        Commands::Config(_) | Commands::Completions(_) => Ok(()),
    };

    if let Err(e) = ctx.store.close().await {
        tracing::warn!("Failed to close store: {}", e);
    }
    result
}
