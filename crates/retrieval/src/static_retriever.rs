//! Static retriever — a test double with scripted results.
//!
//! Returns a fixed passage list for every query, or a scripted
//! `Unavailable` error, so gateway and assembler tests can exercise both
//! the enrichment path and the degraded no-enrichment path without a
//! corpus.

use async_trait::async_trait;
use pedsgate_core::error::RetrievalError;
use pedsgate_core::retrieval::{ContentRetriever, Passage};

pub struct StaticRetriever {
    passages: Vec<Passage>,
    unavailable: Option<String>,
}

impl StaticRetriever {
    /// A retriever that answers every query with the given passages.
    pub fn with_passages(passages: Vec<Passage>) -> Self {
        Self {
            passages,
            unavailable: None,
        }
    }

    /// A retriever whose backend is down.
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            passages: Vec::new(),
            unavailable: Some(reason.into()),
        }
    }
}

#[async_trait]
impl ContentRetriever for StaticRetriever {
    fn name(&self) -> &str {
        "static"
    }

    async fn search(&self, _query: &str, top_k: usize) -> Result<Vec<Passage>, RetrievalError> {
        if let Some(reason) = &self.unavailable {
            return Err(RetrievalError::Unavailable(reason.clone()));
        }
        let mut results = self.passages.clone();
        results.truncate(top_k);
        Ok(results)
    }
}
