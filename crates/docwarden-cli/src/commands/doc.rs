//! Document commands

use clap::{Args, Subcommand};
use docwarden_core::{
    Document, Filter, GetRequest, GetResult, MetadataValue, QueryRequest, RecordId,
    RelevanceBands, ScoredHit,
};
use serde::Serialize;

use crate::output::{print, Render};
use crate::AppContext;

#[derive(Args)]
pub struct DocArgs {
    #[command(subcommand)]
    pub command: DocCommands,
}

#[derive(Subcommand)]
pub enum DocCommands {
    /// Add a document (creates the collection if needed)
    Add {
        /// Document text
        text: String,
        /// Document id (default: a new ULID)
        #[arg(long)]
        id: Option<String>,
        /// Metadata entry as key=value (repeatable)
        #[arg(short, long = "meta", value_parser = parse_meta)]
        meta: Vec<(String, MetadataValue)>,
    },
    /// Read documents
    Get {
        /// Document id (repeatable)
        #[arg(long = "id")]
        ids: Vec<String>,
        /// Metadata filter as JSON, e.g. '{"lang": "en"}'
        #[arg(long = "where")]
        filter: Option<String>,
        #[arg(long)]
        limit: Option<usize>,
        #[arg(long, default_value = "0")]
        offset: usize,
    },
    /// Nearest-neighbour search
    Query {
        /// Query text
        text: String,
        /// Number of results
        #[arg(short = 'n', long, default_value = "10")]
        n_results: usize,
        /// Metadata filter as JSON
        #[arg(long = "where")]
        filter: Option<String>,
    },
    /// Delete documents by id
    Delete {
        /// Document ids
        #[arg(required = true)]
        ids: Vec<String>,
    },
}

fn parse_meta(raw: &str) -> Result<(String, MetadataValue), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{}'", raw))?;
    if key.is_empty() {
        return Err("metadata key cannot be empty".to_string());
    }
    Ok((key.to_string(), MetadataValue::parse_literal(value)))
}

fn parse_filter(raw: Option<&str>) -> anyhow::Result<Option<Filter>> {
    match raw {
        Some(raw) => {
            let value: serde_json::Value = serde_json::from_str(raw)?;
            Ok(Some(Filter::from_json(&value)?))
        }
        None => Ok(None),
    }
}

#[derive(Serialize)]
struct Added {
    id: String,
    collection: String,
}

impl Render for Added {
    fn render(&self) -> String {
        format!("Added document {} to {}", self.id, self.collection)
    }
}

impl Render for GetResult {
    fn render(&self) -> String {
        if self.is_empty() {
            return "No documents found".to_string();
        }
        let mut lines = vec![format!("Documents ({} found):", self.len())];
        for (i, id) in self.ids.iter().enumerate() {
            let text = self
                .documents
                .as_ref()
                .and_then(|docs| docs[i].as_deref())
                .unwrap_or("");
            lines.push(format!("  {}: {}", id, preview(text)));
        }
        lines.join("\n")
    }
}

#[derive(Serialize)]
struct Hits {
    query: String,
    hits: Vec<ScoredHit>,
}

impl Render for Hits {
    fn render(&self) -> String {
        if self.hits.is_empty() {
            return format!("No matches for '{}'", self.query);
        }
        let mut lines = vec![format!("Matches for '{}':", self.query)];
        for hit in &self.hits {
            lines.push(format!(
                "  {} [{:.3} {:?}] {}",
                hit.id,
                hit.similarity,
                hit.relevance,
                preview(hit.document.as_deref().unwrap_or(""))
            ));
        }
        lines.join("\n")
    }
}

#[derive(Serialize)]
struct Deleted {
    deleted_count: usize,
}

impl Render for Deleted {
    fn render(&self) -> String {
        format!("Deleted {} documents", self.deleted_count)
    }
}

fn preview(text: &str) -> String {
    const MAX: usize = 80;
    if text.chars().count() <= MAX {
        text.to_string()
    } else {
        let head: String = text.chars().take(MAX).collect();
        format!("{}...", head)
    }
}

pub async fn run(args: &DocArgs, ctx: &AppContext) -> anyhow::Result<()> {
    let collection = ctx.collection.as_str();

    match &args.command {
        DocCommands::Add { text, id, meta } => {
            ctx.store.get_or_create_collection(collection).await?;

            let id = id.clone().unwrap_or_else(|| ulid::Ulid::new().to_string());
            let mut document = Document::new(id.clone(), text.clone());
            for (key, value) in meta {
                document = document.with_meta(key.clone(), value.clone());
            }
            ctx.store.add(collection, vec![document]).await?;
            tracing::info!("Added document {} to {}", id, collection);

            print(
                &Added {
                    id,
                    collection: collection.to_string(),
                },
                ctx.format,
            )?;
        }
        DocCommands::Get {
            ids,
            filter,
            limit,
            offset,
        } => {
            let mut request = GetRequest::all().with_offset(*offset);
            if !ids.is_empty() {
                request = request.with_ids(ids.iter().map(RecordId::from).collect());
            }
            if let Some(filter) = parse_filter(filter.as_deref())? {
                request = request.with_filter(filter);
            }
            if let Some(limit) = limit {
                request = request.with_limit(*limit);
            }

            let result = ctx.store.get(collection, &request).await?;
            print(&result, ctx.format)?;
        }
        DocCommands::Query {
            text,
            n_results,
            filter,
        } => {
            let mut request = QueryRequest::new(text.clone()).with_n_results(*n_results);
            if let Some(filter) = parse_filter(filter.as_deref())? {
                request = request.with_filter(filter);
            }

            let result = ctx.store.query(collection, &request).await?;
            let hits = result
                .scored(&RelevanceBands::default())
                .into_iter()
                .next()
                .unwrap_or_default();
            print(
                &Hits {
                    query: text.clone(),
                    hits,
                },
                ctx.format,
            )?;
        }
        DocCommands::Delete { ids } => {
            let ids: Vec<RecordId> = ids.iter().map(RecordId::from).collect();
            let deleted_count = ctx.store.delete(collection, &ids).await?;
            print(&Deleted { deleted_count }, ctx.format)?;
        }
    }

    Ok(())
}
