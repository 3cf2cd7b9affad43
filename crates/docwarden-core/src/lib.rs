//! Docwarden Core - Document model for collection maintenance
//!
//! This crate provides the data types shared by the Docwarden store
//! backends, maintenance passes and tool surfaces.

pub mod chunk;
pub mod collection;
pub mod document;
pub mod embedding;
pub mod error;
pub mod filter;
pub mod limits;
pub mod request;
pub mod similarity;

pub use chunk::{chunk_text, fragment_id, text_len};
pub use collection::Collection;
pub use document::{Document, Metadata, MetadataValue, RecordId, StoredRecord, SPLIT_FROM_KEY};
pub use embedding::{Embedder, HashEmbedder};
pub use error::{Error, Result};
pub use filter::{Comparison, Filter};
pub use request::{GetRequest, GetResult, Include, QueryRequest, QueryResult, ScoredHit};
pub use similarity::{cosine_distance, distance_to_similarity, Relevance, RelevanceBands};
