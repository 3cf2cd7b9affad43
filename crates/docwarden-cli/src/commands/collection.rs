//! Collection commands

use clap::{Args, Subcommand};
use docwarden_core::Collection;
use serde::Serialize;

use crate::output::{print, Render};
use crate::AppContext;

#[derive(Args)]
pub struct CollectionArgs {
    #[command(subcommand)]
    pub command: CollectionCommands,
}

#[derive(Subcommand)]
pub enum CollectionCommands {
    /// List all collections
    List,
    /// Create a new collection
    Create {
        /// Collection name (default: the selected collection)
        name: Option<String>,
    },
    /// Delete a collection and its documents
    Delete {
        /// Collection name
        name: String,
        /// Confirm deletion
        #[arg(long)]
        force: bool,
    },
    /// Count documents in a collection
    Count {
        /// Collection name (default: the selected collection)
        name: Option<String>,
    },
}

#[derive(Serialize)]
struct CollectionRow {
    #[serde(flatten)]
    collection: Collection,
    count: usize,
}

#[derive(Serialize)]
struct CollectionList {
    collections: Vec<CollectionRow>,
}

impl Render for CollectionList {
    fn render(&self) -> String {
        if self.collections.is_empty() {
            return "No collections found. Create one with 'docwarden collection create <name>'"
                .to_string();
        }
        let mut lines = vec![format!("Collections ({} found):", self.collections.len())];
        for row in &self.collections {
            lines.push(format!("  {} ({} documents)", row.collection.name, row.count));
        }
        lines.join("\n")
    }
}

#[derive(Serialize)]
struct CollectionCount {
    collection: String,
    count: usize,
}

impl Render for CollectionCount {
    fn render(&self) -> String {
        format!("{}: {} documents", self.collection, self.count)
    }
}

#[derive(Serialize)]
struct Created {
    collection: Collection,
}

impl Render for Created {
    fn render(&self) -> String {
        format!("Created collection: {}", self.collection.name)
    }
}

pub async fn run(args: &CollectionArgs, ctx: &AppContext) -> anyhow::Result<()> {
    tracing::debug!("Running collection command");

    match &args.command {
        CollectionCommands::List => {
            let collections = ctx.store.list_collections().await?;
            tracing::info!("Found {} collections", collections.len());

            let mut rows = Vec::with_capacity(collections.len());
            for collection in collections {
                let count = ctx.store.count(&collection.name).await?;
                rows.push(CollectionRow { collection, count });
            }
            print(&CollectionList { collections: rows }, ctx.format)?;
        }
        CollectionCommands::Create { name } => {
            let name = name.as_deref().unwrap_or(&ctx.collection);
            let collection = ctx.store.create_collection(name).await?;
            tracing::info!("Created collection: {}", name);
            print(&Created { collection }, ctx.format)?;
        }
        CollectionCommands::Delete { name, force } => {
            if ctx.store.get_collection(name).await?.is_none() {
                anyhow::bail!("Collection '{}' not found", name);
            }

            if !force {
                let count = ctx.store.count(name).await?;
                println!("Collection '{}' has {} documents", name, count);
                println!("Use --force to confirm deletion");
                return Ok(());
            }

            ctx.store.delete_collection(name).await?;
            tracing::info!("Deleted collection: {}", name);
            println!("Deleted collection: {}", name);
        }
        CollectionCommands::Count { name } => {
            let name = name.clone().unwrap_or_else(|| ctx.collection.clone());
            let count = ctx.store.count(&name).await?;
            print(
                &CollectionCount {
                    collection: name,
                    count,
                },
                ctx.format,
            )?;
        }
    }

    Ok(())
}
