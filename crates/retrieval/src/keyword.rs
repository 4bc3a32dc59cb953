//! Keyword retriever — lexical substring matching over the corpus.
//!
//! Case-insensitive, whitespace-tokenized, OR semantics: a passage
//! qualifies if its content or chapter contains at least one query token.
//! The score is the fraction of query tokens matched, so it stays in
//! [0, 1] and orders deterministically. Equal scores keep corpus insertion
//! order (stable sort).

use crate::corpus::Corpus;
use async_trait::async_trait;
use pedsgate_core::error::RetrievalError;
use pedsgate_core::retrieval::{ContentRetriever, Passage};
use std::sync::Arc;
use tracing::debug;

/// A retriever backed by substring matching against an in-memory corpus.
pub struct KeywordRetriever {
    corpus: Arc<Corpus>,
}

impl KeywordRetriever {
    pub fn new(corpus: Arc<Corpus>) -> Self {
        Self { corpus }
    }
}

#[async_trait]
impl ContentRetriever for KeywordRetriever {
    fn name(&self) -> &str {
        "keyword"
    }

    async fn search(&self, query: &str, top_k: usize) -> Result<Vec<Passage>, RetrievalError> {
        let tokens: Vec<String> = query
            .split_whitespace()
            .map(|t| t.to_lowercase())
            .collect();

        if tokens.is_empty() || self.corpus.is_empty() {
            return Ok(Vec::new());
        }

        let mut results: Vec<Passage> = self
            .corpus
            .passages()
            .iter()
            .filter_map(|p| {
                let haystack = format!("{}\n{}", p.chapter, p.content).to_lowercase();
                let matched = tokens.iter().filter(|t| haystack.contains(t.as_str())).count();
                if matched == 0 {
                    return None;
                }
                let mut hit = p.clone();
                hit.relevance_score = matched as f32 / tokens.len() as f32;
                Some(hit)
            })
            .collect();

        // Stable sort: equal scores keep corpus insertion order.
        results.sort_by(|a, b| {
            b.relevance_score
                .partial_cmp(&a.relevance_score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        results.truncate(top_k);

        debug!(query_tokens = tokens.len(), hits = results.len(), "Keyword search");

        Ok(results)
    }
}
