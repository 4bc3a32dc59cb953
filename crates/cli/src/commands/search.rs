//! `pedsgate search` — Query the built-in corpus from the terminal.
//!
//! Handy for checking what a chat request would retrieve without
//! standing up the server.

use pedsgate_core::retrieval::ContentRetriever;
use pedsgate_retrieval::{Corpus, KeywordRetriever};
use std::sync::Arc;

pub async fn run(query: &str, top_k: usize) -> Result<(), Box<dyn std::error::Error>> {
    let corpus = Arc::new(Corpus::builtin());
    let retriever = KeywordRetriever::new(corpus);

    let results = retriever.search(query, top_k).await?;

    if results.is_empty() {
        println!("No passages matched '{query}'.");
        return Ok(());
    }

    for passage in &results {
        println!(
            "[{:.2}] {} (p. {})",
            passage.relevance_score, passage.chapter, passage.page_number
        );
        let preview: String = passage.content.chars().take(160).collect();
        println!("       {preview}...");
        println!();
    }
    println!("{} passage(s) matched.", results.len());

    Ok(())
}
