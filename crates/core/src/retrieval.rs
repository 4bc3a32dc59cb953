//! ContentRetriever trait — the abstraction over reference-content search.
//!
//! A retriever takes a query string and returns scored passages from a
//! reference corpus, best first. The built-in implementation is lexical
//! keyword matching over an in-memory corpus; a vector-similarity backend
//! can be swapped in without changing any caller.

use crate::error::RetrievalError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A retrievable unit of reference text with chapter/location metadata.
///
/// Produced fresh per query; never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Passage {
    /// Opaque identifier within the corpus
    pub id: String,

    /// Chapter label (e.g., "Neonatal Jaundice")
    pub chapter: String,

    /// Page number in the source text
    pub page_number: u32,

    /// The passage text
    pub content: String,

    /// Relevance score in [0, 1]; meaningful only relative to one query
    pub relevance_score: f32,
}

/// The ContentRetriever trait.
///
/// Contract:
/// - Results are ordered best score first; equal scores keep corpus
///   insertion order.
/// - An empty corpus yields an empty vec, never an error.
/// - `RetrievalError::Unavailable` means "no enrichment available"; callers
///   assembling chat context must proceed without retrieved passages rather
///   than failing the request.
#[async_trait]
pub trait ContentRetriever: Send + Sync {
    /// A human-readable name for this retriever (e.g., "keyword").
    fn name(&self) -> &str;

    /// Search the corpus, returning at most `top_k` passages.
    async fn search(
        &self,
        query: &str,
        top_k: usize,
    ) -> std::result::Result<Vec<Passage>, RetrievalError>;
}
