//! MCP tool definitions

use serde::Serialize;

/// MCP tool definition
#[derive(Debug, Serialize)]
pub struct Tool {
    pub name: &'static str,
    pub description: &'static str,
    #[serde(rename = "inputSchema")]
    pub input_schema: serde_json::Value,
}

fn collection_property() -> serde_json::Value {
    serde_json::json!({
        "type": "string",
        "description": "Collection name (default: the server's default collection)"
    })
}

/// Get all available tools
pub fn get_tools() -> Vec<Tool> {
    vec![
        Tool {
            name: "maintain_document_lengths",
            description: "Remove documents whose trimmed text is shorter than minLength, and split or remove documents longer than maxLength. Split fragments get ids '<id>_split<n>' and a 'split_from' metadata entry.",
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "collectionName": collection_property(),
                    "minLength": {"type": "integer", "minimum": 0, "default": 1, "description": "Minimum trimmed length in characters"},
                    "maxLength": {"type": "integer", "minimum": 1, "default": 10000, "description": "Maximum length in characters"},
                    "splitLarge": {"type": "boolean", "default": true, "description": "Split oversized documents into fragments"},
                    "deleteLarge": {"type": "boolean", "default": false, "description": "Delete oversized documents instead of splitting them"}
                }
            }),
        },
        Tool {
            name: "delete_by_keyword",
            description: "Delete every document whose text (or any metadata value) contains the keyword. Documents with non-string ids are cleaned up first.",
            input_schema: serde_json::json!({
                "type": "object",
                "required": ["keyword"],
                "properties": {
                    "collectionName": collection_property(),
                    "keyword": {"type": "string", "description": "Substring to match"},
                    "field": {"type": "string", "enum": ["documents", "metadatas"], "default": "documents"}
                }
            }),
        },
        Tool {
            name: "cleanup_invalid_ids",
            description: "Delete every document whose id is not a string.",
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "collectionName": collection_property()
                }
            }),
        },
        Tool {
            name: "list_collections",
            description: "List collections with their document counts.",
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {}
            }),
        },
        Tool {
            name: "create_collection",
            description: "Create a collection. Names are 1-128 characters of letters, digits, '_', '-' and '.'.",
            input_schema: serde_json::json!({
                "type": "object",
                "required": ["collectionName"],
                "properties": {
                    "collectionName": {"type": "string"},
                    "getOrCreate": {"type": "boolean", "default": false, "description": "Return the existing collection instead of failing"}
                }
            }),
        },
        Tool {
            name: "delete_collection",
            description: "Delete a collection and all of its documents.",
            input_schema: serde_json::json!({
                "type": "object",
                "required": ["collectionName"],
                "properties": {
                    "collectionName": {"type": "string"}
                }
            }),
        },
        Tool {
            name: "count_documents",
            description: "Count the documents of a collection.",
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "collectionName": collection_property()
                }
            }),
        },
        Tool {
            name: "get_documents",
            description: "Read documents by id and/or metadata filter.",
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "collectionName": collection_property(),
                    "ids": {"type": "array", "description": "Document ids"},
                    "where": {"type": "object", "description": "Metadata filter, e.g. {\"$and\": [{\"year\": {\"$gte\": 2020}}, {\"lang\": \"en\"}]}"},
                    "include": {"type": "array", "items": {"type": "string", "enum": ["documents", "metadatas", "embeddings"]}},
                    "limit": {"type": "integer", "minimum": 0},
                    "offset": {"type": "integer", "minimum": 0, "default": 0}
                }
            }),
        },
        Tool {
            name: "query_documents",
            description: "Nearest-neighbour search. Each hit carries its distance, a similarity of 1/(1+distance) and a high/medium/low relevance band.",
            input_schema: serde_json::json!({
                "type": "object",
                "required": ["queryTexts"],
                "properties": {
                    "collectionName": collection_property(),
                    "queryTexts": {"type": "array", "items": {"type": "string"}},
                    "nResults": {"type": "integer", "minimum": 1, "maximum": 1000, "default": 10},
                    "where": {"type": "object", "description": "Metadata filter"}
                }
            }),
        },
        Tool {
            name: "add_documents",
            description: "Add documents. Ids must be unique; missing ids are generated.",
            input_schema: serde_json::json!({
                "type": "object",
                "required": ["documents"],
                "properties": {
                    "collectionName": collection_property(),
                    "documents": {
                        "type": "array",
                        "items": {
                            "type": "object",
                            "required": ["text"],
                            "properties": {
                                "id": {"type": "string"},
                                "text": {"type": "string"},
                                "metadata": {"type": "object", "description": "Flat map of string, number or boolean values"}
                            }
                        }
                    }
                }
            }),
        },
        Tool {
            name: "delete_documents",
            description: "Delete documents by id.",
            input_schema: serde_json::json!({
                "type": "object",
                "required": ["ids"],
                "properties": {
                    "collectionName": collection_property(),
                    "ids": {"type": "array", "description": "Document ids (non-string ids are accepted)"}
                }
            }),
        },
    ]
}
