//! MCP tool call handlers

use docwarden_core::{
    Collection, Document, Filter, GetRequest, Include, Metadata, QueryRequest, RecordId,
    ScoredHit,
};
use docwarden_maint::{KeywordField, LengthOptions, Outcome};
use docwarden_storage::CollectionStore;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::server::McpServer;

/// MCP tool call response
#[derive(Debug, Serialize)]
pub struct ToolCallResponse {
    pub content: Vec<ContentBlock>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(rename = "isError")]
    pub is_error: Option<bool>,
}

/// Content block for responses
#[derive(Debug, Serialize)]
#[serde(tag = "type")]
pub enum ContentBlock {
    #[serde(rename = "text")]
    Text { text: String },
}

impl ToolCallResponse {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: vec![ContentBlock::Text {
                text: content.into(),
            }],
            is_error: None,
        }
    }

    pub fn json<T: Serialize>(data: &T) -> Self {
        match serde_json::to_string_pretty(data) {
            Ok(json) => Self::text(json),
            Err(e) => Self::error(format!("JSON serialization error: {}", e)),
        }
    }

    /// Failure carrying `{"success": false, "message": ...}`
    pub fn error(message: impl Into<String>) -> Self {
        let outcome: Outcome<()> = Outcome::failure(message);
        let text = serde_json::to_string_pretty(&outcome)
            .unwrap_or_else(|_| r#"{"success": false}"#.to_string());
        Self {
            content: vec![ContentBlock::Text { text }],
            is_error: Some(true),
        }
    }

    pub fn outcome<T: Serialize>(outcome: Outcome<T>) -> Self {
        if outcome.success {
            Self::json(&outcome)
        } else {
            Self::error(outcome.message.unwrap_or_default())
        }
    }

    /// Text of the first content block
    pub fn body(&self) -> &str {
        match self.content.first() {
            Some(ContentBlock::Text { text }) => text,
            None => "",
        }
    }
}

/// Parse tool arguments; a missing argument object reads as `{}`
fn parse_args<T: DeserializeOwned>(args: serde_json::Value) -> Result<T, ToolCallResponse> {
    let args = if args.is_null() {
        serde_json::json!({})
    } else {
        args
    };
    serde_json::from_value(args).map_err(|e| ToolCallResponse::error(format!("Invalid arguments: {}", e)))
}

macro_rules! try_args {
    ($args:expr) => {
        match parse_args($args) {
            Ok(a) => a,
            Err(response) => return response,
        }
    };
}

#[derive(Serialize)]
struct CollectionSummary {
    #[serde(flatten)]
    collection: Collection,
    count: usize,
}

#[derive(Serialize)]
struct CollectionList {
    collections: Vec<CollectionSummary>,
}

#[derive(Serialize)]
struct CreatedCollection {
    collection: Collection,
    created: bool,
}

#[derive(Serialize)]
struct DeletedCollection {
    deleted: String,
}

#[derive(Serialize)]
struct DocumentCount {
    collection: String,
    count: usize,
}

#[derive(Serialize)]
struct QuerySet {
    query: String,
    hits: Vec<ScoredHit>,
}

#[derive(Serialize)]
struct QueryResults {
    results: Vec<QuerySet>,
}

#[derive(Serialize)]
struct AddedDocuments {
    added_ids: Vec<String>,
}

#[derive(Serialize)]
struct DeletedDocuments {
    deleted_count: usize,
}

fn parse_include(columns: &[String]) -> Result<Include, String> {
    let mut include = Include::ids_only();
    for column in columns {
        match column.as_str() {
            "documents" => include.documents = true,
            "metadatas" => include.metadatas = true,
            "embeddings" => include.embeddings = true,
            other => return Err(format!("Unknown include column: {}", other)),
        }
    }
    Ok(include)
}

impl<S: CollectionStore + ?Sized + 'static> McpServer<S> {
    pub(crate) async fn handle_maintain_lengths(&self, args: serde_json::Value) -> ToolCallResponse {
        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct LengthArgs {
            collection_name: Option<String>,
            min_length: Option<usize>,
            max_length: Option<usize>,
            split_large: Option<bool>,
            delete_large: Option<bool>,
        }

        let args: LengthArgs = try_args!(args);
        let defaults = self.length_defaults();
        let options = LengthOptions {
            min_length: args.min_length.unwrap_or(defaults.min_length),
            max_length: args.max_length.unwrap_or(defaults.max_length),
            split_large: args.split_large.unwrap_or(defaults.split_large),
            delete_large: args.delete_large.unwrap_or(defaults.delete_large),
        };
        let collection = self.collection_or_default(args.collection_name);

        let result = self.maintainer().maintain_lengths(&collection, &options).await;
        ToolCallResponse::outcome(Outcome::from(result))
    }

    pub(crate) async fn handle_delete_by_keyword(&self, args: serde_json::Value) -> ToolCallResponse {
        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct KeywordArgs {
            collection_name: Option<String>,
            keyword: String,
            #[serde(default)]
            field: KeywordField,
        }

        let args: KeywordArgs = try_args!(args);
        let collection = self.collection_or_default(args.collection_name);

        let result = self
            .maintainer()
            .delete_by_keyword(&collection, &args.keyword, args.field)
            .await;
        ToolCallResponse::outcome(Outcome::from(result))
    }

    pub(crate) async fn handle_cleanup_invalid_ids(&self, args: serde_json::Value) -> ToolCallResponse {
        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct CleanupArgs {
            collection_name: Option<String>,
        }

        let args: CleanupArgs = try_args!(args);
        let collection = self.collection_or_default(args.collection_name);

        let result = self.maintainer().cleanup_invalid_ids(&collection).await;
        ToolCallResponse::outcome(Outcome::from(result))
    }

    pub(crate) async fn handle_list_collections(&self) -> ToolCallResponse {
        let collections = match self.store().list_collections().await {
            Ok(c) => c,
            Err(e) => return ToolCallResponse::error(format!("Storage error: {}", e)),
        };

        let mut summaries = Vec::with_capacity(collections.len());
        for collection in collections {
            let count = match self.store().count(&collection.name).await {
                Ok(n) => n,
                Err(e) => return ToolCallResponse::error(format!("Storage error: {}", e)),
            };
            summaries.push(CollectionSummary { collection, count });
        }

        ToolCallResponse::outcome(Outcome::ok(CollectionList {
            collections: summaries,
        }))
    }

    pub(crate) async fn handle_create_collection(&self, args: serde_json::Value) -> ToolCallResponse {
        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct CreateArgs {
            collection_name: String,
            #[serde(default)]
            get_or_create: bool,
        }

        let args: CreateArgs = try_args!(args);
        let store = self.store();

        let result = if args.get_or_create {
            match store.get_collection(&args.collection_name).await {
                Ok(Some(collection)) => Ok(CreatedCollection {
                    collection,
                    created: false,
                }),
                Ok(None) => store
                    .create_collection(&args.collection_name)
                    .await
                    .map(|collection| CreatedCollection {
                        collection,
                        created: true,
                    }),
                Err(e) => Err(e),
            }
        } else {
            store
                .create_collection(&args.collection_name)
                .await
                .map(|collection| CreatedCollection {
                    collection,
                    created: true,
                })
        };

        match result {
            Ok(created) => ToolCallResponse::outcome(Outcome::ok(created)),
            Err(e) => ToolCallResponse::error(e.to_string()),
        }
    }

    pub(crate) async fn handle_delete_collection(&self, args: serde_json::Value) -> ToolCallResponse {
        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct DeleteArgs {
            collection_name: String,
        }

        let args: DeleteArgs = try_args!(args);
        match self.store().delete_collection(&args.collection_name).await {
            Ok(()) => {
                tracing::info!("Deleted collection {}", args.collection_name);
                ToolCallResponse::outcome(Outcome::ok(DeletedCollection {
                    deleted: args.collection_name,
                }))
            }
            Err(e) => ToolCallResponse::error(e.to_string()),
        }
    }

    pub(crate) async fn handle_count_documents(&self, args: serde_json::Value) -> ToolCallResponse {
        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct CountArgs {
            collection_name: Option<String>,
        }

        let args: CountArgs = try_args!(args);
        let collection = self.collection_or_default(args.collection_name);
        match self.store().count(&collection).await {
            Ok(count) => ToolCallResponse::outcome(Outcome::ok(DocumentCount { collection, count })),
            Err(e) => ToolCallResponse::error(e.to_string()),
        }
    }

    pub(crate) async fn handle_get_documents(&self, args: serde_json::Value) -> ToolCallResponse {
        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct GetArgs {
            collection_name: Option<String>,
            ids: Option<Vec<RecordId>>,
            #[serde(rename = "where")]
            filter: Option<Filter>,
            include: Option<Vec<String>>,
            limit: Option<usize>,
            #[serde(default)]
            offset: usize,
        }

        let args: GetArgs = try_args!(args);
        let collection = self.collection_or_default(args.collection_name);

        let mut request = GetRequest::all().with_offset(args.offset);
        if let Some(ids) = args.ids {
            request = request.with_ids(ids);
        }
        if let Some(filter) = args.filter {
            request = request.with_filter(filter);
        }
        if let Some(columns) = args.include {
            match parse_include(&columns) {
                Ok(include) => request = request.with_include(include),
                Err(msg) => return ToolCallResponse::error(msg),
            }
        }
        if let Some(limit) = args.limit {
            request = request.with_limit(limit);
        }

        match self.store().get(&collection, &request).await {
            Ok(result) => ToolCallResponse::outcome(Outcome::ok(result)),
            Err(e) => ToolCallResponse::error(e.to_string()),
        }
    }

    pub(crate) async fn handle_query_documents(&self, args: serde_json::Value) -> ToolCallResponse {
        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct QueryArgs {
            collection_name: Option<String>,
            query_texts: Vec<String>,
            n_results: Option<usize>,
            #[serde(rename = "where")]
            filter: Option<Filter>,
        }

        let args: QueryArgs = try_args!(args);
        let collection = self.collection_or_default(args.collection_name);

        let request = QueryRequest {
            query_texts: args.query_texts,
            n_results: args.n_results.unwrap_or(10),
            filter: args.filter,
        };

        let result = match self.store().query(&collection, &request).await {
            Ok(r) => r,
            Err(e) => return ToolCallResponse::error(e.to_string()),
        };

        let results = request
            .query_texts
            .into_iter()
            .zip(result.scored(self.relevance_bands()))
            .map(|(query, hits)| QuerySet { query, hits })
            .collect();
        ToolCallResponse::outcome(Outcome::ok(QueryResults { results }))
    }

    pub(crate) async fn handle_add_documents(&self, args: serde_json::Value) -> ToolCallResponse {
        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct AddArgs {
            collection_name: Option<String>,
            documents: Vec<DocumentInput>,
        }

        #[derive(Deserialize)]
        struct DocumentInput {
            id: Option<String>,
            text: String,
            metadata: Option<Metadata>,
        }

        let args: AddArgs = try_args!(args);
        let collection = self.collection_or_default(args.collection_name);

        if let Err(e) = self.store().get_or_create_collection(&collection).await {
            return ToolCallResponse::error(e.to_string());
        }

        let documents: Vec<Document> = args
            .documents
            .into_iter()
            .map(|input| Document {
                id: input.id.unwrap_or_else(|| ulid::Ulid::new().to_string()),
                text: input.text,
                metadata: input.metadata,
            })
            .collect();
        let added_ids: Vec<String> = documents.iter().map(|d| d.id.clone()).collect();

        match self.store().add(&collection, documents).await {
            Ok(()) => ToolCallResponse::outcome(Outcome::ok(AddedDocuments { added_ids })),
            Err(e) => ToolCallResponse::error(e.to_string()),
        }
    }

    pub(crate) async fn handle_delete_documents(&self, args: serde_json::Value) -> ToolCallResponse {
        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct DeleteArgs {
            collection_name: Option<String>,
            ids: Vec<RecordId>,
        }

        let args: DeleteArgs = try_args!(args);
        let collection = self.collection_or_default(args.collection_name);

        match self.store().delete(&collection, &args.ids).await {
            Ok(deleted_count) => {
                ToolCallResponse::outcome(Outcome::ok(DeletedDocuments { deleted_count }))
            }
            Err(e) => ToolCallResponse::error(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_body_shape() {
        let response = ToolCallResponse::error("Collection not found: docs");
        assert_eq!(response.is_error, Some(true));
        let body: serde_json::Value = serde_json::from_str(response.body()).unwrap();
        assert_eq!(
            body,
            serde_json::json!({"success": false, "message": "Collection not found: docs"})
        );
    }

    #[test]
    fn test_parse_include() {
        let include = parse_include(&["documents".to_string()]).unwrap();
        assert!(include.documents);
        assert!(!include.metadatas);
        assert!(parse_include(&["vectors".to_string()]).is_err());
    }

    #[test]
    fn test_null_arguments_read_as_empty() {
        #[derive(Deserialize)]
        struct Args {
            collection_name: Option<String>,
        }
        let args: Args = parse_args(serde_json::Value::Null).ok().unwrap();
        assert!(args.collection_name.is_none());
    }
}
