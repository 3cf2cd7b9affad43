//! MCP server command

use std::sync::Arc;

use clap::Args;
use docwarden_maint::LengthOptions;
use docwarden_mcp::McpServer;

use crate::AppContext;

#[derive(Args)]
pub struct ServeArgs {
    /// Serve over HTTP/SSE at this address instead of stdio
    #[arg(long, value_name = "ADDR")]
    pub sse: Option<String>,

    /// Bearer token required by the HTTP transport
    #[arg(long, env = "DOCWARDEN_TOKEN")]
    pub token: Option<String>,
}

pub async fn run(args: &ServeArgs, ctx: &AppContext) -> anyhow::Result<()> {
    let server = McpServer::new(ctx.store.clone(), ctx.error_log.clone())
        .with_default_collection(ctx.collection.clone())
        .with_length_defaults(LengthOptions {
            min_length: ctx.config.min_length,
            max_length: ctx.config.max_length,
            ..LengthOptions::default()
        });

    match &args.sse {
        Some(addr) => serve_sse(Arc::new(server), addr, args.token.clone()).await,
        None => {
            tracing::info!("Starting MCP server on stdio...");
            server.run_stdio().await
        }
    }
}

#[cfg(feature = "sse")]
async fn serve_sse<S>(server: Arc<McpServer<S>>, addr: &str, token: Option<String>) -> anyhow::Result<()>
where
    S: docwarden_storage::CollectionStore + ?Sized + 'static,
{
    if token.is_none() {
        tracing::warn!("HTTP transport running without a bearer token");
    }
    docwarden_mcp::run_sse_server(server, addr, token).await
}

#[cfg(not(feature = "sse"))]
async fn serve_sse<S>(_server: Arc<McpServer<S>>, _addr: &str, _token: Option<String>) -> anyhow::Result<()>
where
    S: docwarden_storage::CollectionStore + ?Sized + 'static,
{
    anyhow::bail!("HTTP transport not compiled in; rebuild with the 'sse' feature")
}
