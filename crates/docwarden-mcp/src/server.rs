//! MCP server implementation

use std::sync::Arc;

use docwarden_core::RelevanceBands;
use docwarden_maint::{ErrorLog, LengthOptions, Maintainer};
use docwarden_storage::CollectionStore;
use serde::Deserialize;
use tokio::io::{AsyncBufRead, AsyncWrite};

use crate::handlers::ToolCallResponse;
use crate::tools::get_tools;
use crate::transport::{codes, JsonRpcRequest, JsonRpcResponse, LineTransport, StdioTransport};

pub const SERVER_NAME: &str = "docwarden";
const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");
const PROTOCOL_VERSION: &str = "2024-11-05";

/// Collection used when a tool call names none
pub const DEFAULT_COLLECTION: &str = "documents";

/// MCP Server for Docwarden
pub struct McpServer<S: CollectionStore + ?Sized> {
    store: Arc<S>,
    maintainer: Maintainer<S>,
    default_collection: String,
    length_defaults: LengthOptions,
    bands: RelevanceBands,
}

impl<S: CollectionStore + ?Sized + 'static> McpServer<S> {
    pub fn new(store: Arc<S>, error_log: Arc<dyn ErrorLog>) -> Self {
        Self {
            maintainer: Maintainer::new(store.clone(), error_log),
            store,
            default_collection: DEFAULT_COLLECTION.to_string(),
            length_defaults: LengthOptions::default(),
            bands: RelevanceBands::default(),
        }
    }

    pub fn with_default_collection(mut self, name: impl Into<String>) -> Self {
        self.default_collection = name.into();
        self
    }

    pub fn with_length_defaults(mut self, options: LengthOptions) -> Self {
        self.length_defaults = options;
        self
    }

    pub fn with_relevance_bands(mut self, bands: RelevanceBands) -> Self {
        self.bands = bands;
        self
    }

    pub(crate) fn store(&self) -> &S {
        &self.store
    }

    pub(crate) fn maintainer(&self) -> &Maintainer<S> {
        &self.maintainer
    }

    pub(crate) fn length_defaults(&self) -> LengthOptions {
        self.length_defaults
    }

    pub(crate) fn relevance_bands(&self) -> &RelevanceBands {
        &self.bands
    }

    pub(crate) fn collection_or_default(&self, name: Option<String>) -> String {
        name.unwrap_or_else(|| self.default_collection.clone())
    }

    /// Start the MCP server on stdio
    pub async fn run_stdio(&self) -> anyhow::Result<()> {
        tracing::info!("Starting MCP server on stdio");
        let mut transport = StdioTransport::stdio();
        self.serve(&mut transport).await
    }

    /// Serve newline-delimited JSON-RPC until EOF
    pub async fn serve<R, W>(&self, transport: &mut LineTransport<R, W>) -> anyhow::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        loop {
            match transport.read_message().await {
                Ok(Some(line)) => {
                    if let Some(response) = self.handle_message(&line).await {
                        transport.write_response(&response).await?;
                    }
                }
                Ok(None) => {
                    tracing::info!("EOF on input, shutting down");
                    break;
                }
                Err(e) => {
                    tracing::error!("Failed to read request: {}", e);
                    break;
                }
            }
        }

        Ok(())
    }

    /// Handle one raw message; notifications get no response
    pub async fn handle_message(&self, line: &str) -> Option<JsonRpcResponse> {
        match serde_json::from_str::<JsonRpcRequest>(line) {
            Ok(request) => {
                tracing::debug!("Received request: {:?}", request.method);
                let notification = request.is_notification();
                let response = self.handle_request(request).await;
                (!notification).then_some(response)
            }
            Err(e) => Some(JsonRpcResponse::error(
                serde_json::Value::Null,
                codes::PARSE_ERROR,
                format!("Parse error: {}", e),
            )),
        }
    }

    /// Handle a JSON-RPC request
    pub async fn handle_request(&self, request: JsonRpcRequest) -> JsonRpcResponse {
        let id = request.id.unwrap_or(serde_json::Value::Null);
        match request.method.as_str() {
            "initialize" => self.handle_initialize(id),
            "initialized" | "notifications/initialized" | "ping" => {
                JsonRpcResponse::success(id, serde_json::json!({}))
            }
            "tools/list" => JsonRpcResponse::success(id, serde_json::json!({ "tools": get_tools() })),
            "tools/call" => self.handle_tools_call(id, request.params).await,
            _ => JsonRpcResponse::error(
                id,
                codes::METHOD_NOT_FOUND,
                format!("Method not found: {}", request.method),
            ),
        }
    }

    fn handle_initialize(&self, id: serde_json::Value) -> JsonRpcResponse {
        let result = serde_json::json!({
            "protocolVersion": PROTOCOL_VERSION,
            "capabilities": {
                "tools": {}
            },
            "serverInfo": {
                "name": SERVER_NAME,
                "version": SERVER_VERSION
            }
        });
        JsonRpcResponse::success(id, result)
    }

    async fn handle_tools_call(&self, id: serde_json::Value, params: serde_json::Value) -> JsonRpcResponse {
        #[derive(Deserialize)]
        struct ToolCallParams {
            name: String,
            #[serde(default)]
            arguments: serde_json::Value,
        }

        let params: ToolCallParams = match serde_json::from_value(params) {
            Ok(p) => p,
            Err(e) => {
                return JsonRpcResponse::error(id, codes::INVALID_PARAMS, format!("Invalid params: {}", e))
            }
        };

        tracing::debug!("Tool call: {} with args: {}", params.name, params.arguments);

        let response = self.call_tool(&params.name, params.arguments).await;

        match serde_json::to_value(response) {
            Ok(val) => JsonRpcResponse::success(id, val),
            Err(e) => JsonRpcResponse::error(id, codes::INTERNAL_ERROR, format!("Serialization error: {}", e)),
        }
    }

    /// Dispatch a tool by name
    pub async fn call_tool(&self, name: &str, arguments: serde_json::Value) -> ToolCallResponse {
        match name {
            "maintain_document_lengths" => self.handle_maintain_lengths(arguments).await,
            "delete_by_keyword" => self.handle_delete_by_keyword(arguments).await,
            "cleanup_invalid_ids" => self.handle_cleanup_invalid_ids(arguments).await,
            "list_collections" => self.handle_list_collections().await,
            "create_collection" => self.handle_create_collection(arguments).await,
            "delete_collection" => self.handle_delete_collection(arguments).await,
            "count_documents" => self.handle_count_documents(arguments).await,
            "get_documents" => self.handle_get_documents(arguments).await,
            "query_documents" => self.handle_query_documents(arguments).await,
            "add_documents" => self.handle_add_documents(arguments).await,
            "delete_documents" => self.handle_delete_documents(arguments).await,
            _ => ToolCallResponse::error(format!("Unknown tool: {}", name)),
        }
    }
}
