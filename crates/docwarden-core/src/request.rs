//! Request and result shapes of the collection store operations

use serde::{Deserialize, Serialize};

use crate::document::{Metadata, RecordId, StoredRecord};
use crate::filter::Filter;
use crate::similarity::{distance_to_similarity, Relevance, RelevanceBands};

/// Which columns a bulk read returns (ids are always returned)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Include {
    pub documents: bool,
    pub metadatas: bool,
    pub embeddings: bool,
}

impl Default for Include {
    fn default() -> Self {
        Self {
            documents: true,
            metadatas: true,
            embeddings: false,
        }
    }
}

impl Include {
    /// Ids only
    pub fn ids_only() -> Self {
        Self {
            documents: false,
            metadatas: false,
            embeddings: false,
        }
    }

    pub fn all() -> Self {
        Self {
            documents: true,
            metadatas: true,
            embeddings: true,
        }
    }
}

/// Bulk read request
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GetRequest {
    /// Restrict to these ids
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ids: Option<Vec<RecordId>>,

    /// Metadata filter
    #[serde(default, rename = "where", skip_serializing_if = "Option::is_none")]
    pub filter: Option<Filter>,

    #[serde(default)]
    pub include: Include,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,

    #[serde(default)]
    pub offset: usize,
}

impl GetRequest {
    /// Every record with documents and metadata
    pub fn all() -> Self {
        Self::default()
    }

    pub fn with_ids(mut self, ids: Vec<RecordId>) -> Self {
        self.ids = Some(ids);
        self
    }

    pub fn with_filter(mut self, filter: Filter) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn with_include(mut self, include: Include) -> Self {
        self.include = include;
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    /// Whether a record passes the id and metadata restrictions
    pub fn selects(&self, record: &StoredRecord) -> bool {
        if let Some(ids) = &self.ids {
            if !ids.contains(&record.id) {
                return false;
            }
        }
        match &self.filter {
            Some(filter) => record
                .metadata
                .as_ref()
                .is_some_and(|meta| filter.matches(meta)),
            None => true,
        }
    }
}

/// Column-oriented bulk read result
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GetResult {
    pub ids: Vec<RecordId>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub documents: Option<Vec<Option<String>>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadatas: Option<Vec<Option<Metadata>>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embeddings: Option<Vec<Option<Vec<f32>>>>,
}

impl GetResult {
    /// Build a result from matching records, keeping only included columns
    pub fn from_records(records: Vec<StoredRecord>, include: Include) -> Self {
        let mut result = Self {
            ids: Vec::with_capacity(records.len()),
            documents: include.documents.then(Vec::new),
            metadatas: include.metadatas.then(Vec::new),
            embeddings: include.embeddings.then(Vec::new),
        };
        for record in records {
            result.ids.push(record.id);
            if let Some(docs) = result.documents.as_mut() {
                docs.push(record.document);
            }
            if let Some(metas) = result.metadatas.as_mut() {
                metas.push(record.metadata);
            }
            if let Some(embs) = result.embeddings.as_mut() {
                embs.push(record.embedding);
            }
        }
        result
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Re-assemble rows; columns that were not included come back as `None`
    pub fn into_records(self) -> Vec<StoredRecord> {
        let n = self.ids.len();
        let mut documents = self.documents.unwrap_or_else(|| vec![None; n]).into_iter();
        let mut metadatas = self.metadatas.unwrap_or_else(|| vec![None; n]).into_iter();
        let mut embeddings = self.embeddings.unwrap_or_else(|| vec![None; n]).into_iter();

        self.ids
            .into_iter()
            .map(|id| StoredRecord {
                id,
                document: documents.next().flatten(),
                metadata: metadatas.next().flatten(),
                embedding: embeddings.next().flatten(),
            })
            .collect()
    }
}

/// Nearest-neighbour query request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryRequest {
    pub query_texts: Vec<String>,

    #[serde(default = "default_n_results")]
    pub n_results: usize,

    #[serde(default, rename = "where", skip_serializing_if = "Option::is_none")]
    pub filter: Option<Filter>,
}

fn default_n_results() -> usize {
    10
}

impl QueryRequest {
    pub fn new(query_text: impl Into<String>) -> Self {
        Self {
            query_texts: vec![query_text.into()],
            n_results: default_n_results(),
            filter: None,
        }
    }

    pub fn with_n_results(mut self, n: usize) -> Self {
        self.n_results = n;
        self
    }

    pub fn with_filter(mut self, filter: Filter) -> Self {
        self.filter = Some(filter);
        self
    }
}

/// Query result: one inner list per query text, ascending distance
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    pub ids: Vec<Vec<RecordId>>,
    pub documents: Vec<Vec<Option<String>>>,
    pub metadatas: Vec<Vec<Option<Metadata>>>,
    pub distances: Vec<Vec<f32>>,
}

/// One query hit with its distance turned into a similarity score
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredHit {
    pub id: RecordId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
    pub distance: f32,
    pub similarity: f32,
    pub relevance: Relevance,
}

impl QueryResult {
    /// Hits per query text, keeping the ascending distance order
    pub fn scored(self, bands: &RelevanceBands) -> Vec<Vec<ScoredHit>> {
        let QueryResult {
            ids,
            documents,
            metadatas,
            distances,
        } = self;

        ids.into_iter()
            .zip(documents)
            .zip(metadatas)
            .zip(distances)
            .map(|(((ids, docs), metas), dists)| {
                ids.into_iter()
                    .zip(docs)
                    .zip(metas)
                    .zip(dists)
                    .map(|(((id, document), metadata), distance)| {
                        let similarity = distance_to_similarity(distance);
                        ScoredHit {
                            id,
                            document,
                            metadata,
                            distance,
                            similarity,
                            relevance: bands.classify(similarity),
                        }
                    })
                    .collect()
            })
            .collect()
    }
}
