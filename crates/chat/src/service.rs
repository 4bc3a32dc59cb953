//! Chat service — one request pipeline per HTTP call.
//!
//! Received → Validated → ContextBuilt → Dispatched → {Completed | Failed}.
//! Validation happens before any network call; terminal states are final
//! (no retries, no persistence). The service owns the recorded generation
//! parameters so no default is substituted downstream.

use crate::assembler::ContextAssembler;
use chrono::{DateTime, Utc};
use pedsgate_core::error::{Error, GenerationError, Result};
use pedsgate_core::generation::{GenerationClient, GenerationRequest, StreamChunk};
use pedsgate_core::message::Message;
use pedsgate_core::retrieval::ContentRetriever;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// The result of a one-shot chat completion.
#[derive(Debug, Clone, Serialize)]
pub struct ChatCompletion {
    pub response: String,
    pub timestamp: DateTime<Utc>,
}

/// Orchestrates context assembly and upstream dispatch.
///
/// One instance is shared across requests; every per-request value
/// (history view, assembled messages, generation request) is owned by the
/// call, so there is no cross-request mutable state.
pub struct ChatService {
    client: Arc<dyn GenerationClient>,
    assembler: ContextAssembler,
    retriever: Option<Arc<dyn ContentRetriever>>,
    model: String,
    temperature: f32,
    max_tokens: u32,
    request_timeout: Duration,
}

impl ChatService {
    pub fn new(
        client: Arc<dyn GenerationClient>,
        assembler: ContextAssembler,
        model: impl Into<String>,
        temperature: f32,
        max_tokens: u32,
        request_timeout: Duration,
    ) -> Self {
        Self {
            client,
            assembler,
            retriever: None,
            model: model.into(),
            temperature,
            max_tokens,
            request_timeout,
        }
    }

    /// Enrich chat context through a retriever.
    ///
    /// Off by default: the chat endpoints currently ship without retrieval
    /// and the enhanced-chat preview is the only retrieval surface, so
    /// wiring this in is an explicit opt-in rather than an implicit
    /// unification of the two paths.
    pub fn with_retriever(mut self, retriever: Arc<dyn ContentRetriever>) -> Self {
        self.retriever = Some(retriever);
        self
    }

    /// The deadline applied to upstream calls (the streaming relay
    /// enforces it across the whole stream).
    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    fn request(&self, messages: Vec<Message>) -> GenerationRequest {
        GenerationRequest {
            model: self.model.clone(),
            messages,
            temperature: self.temperature,
            max_tokens: Some(self.max_tokens),
        }
    }

    /// One-shot completion: validate, assemble, dispatch under deadline.
    pub async fn complete(&self, message: &str, history: &[Message]) -> Result<ChatCompletion> {
        let messages = self
            .assembler
            .assemble_with_retrieval(history, message, self.retriever.as_deref())
            .await?;
        let request = self.request(messages);

        debug!(
            client = %self.client.name(),
            model = %request.model,
            context_len = request.messages.len(),
            "Dispatching one-shot completion"
        );

        let response = tokio::time::timeout(self.request_timeout, self.client.complete(request))
            .await
            .map_err(|_| {
                Error::from(GenerationError::Timeout(format!(
                    "no completion within {}s",
                    self.request_timeout.as_secs()
                )))
            })?
            .map_err(Error::from)?;

        Ok(ChatCompletion {
            response: response.text,
            timestamp: response.finished_at,
        })
    }

    /// Open a streaming completion: validate, assemble, hand back the
    /// chunk channel. Dropping the receiver cancels the upstream stream.
    pub async fn open_stream(
        &self,
        message: &str,
        history: &[Message],
    ) -> Result<tokio::sync::mpsc::Receiver<std::result::Result<StreamChunk, GenerationError>>>
    {
        let messages = self
            .assembler
            .assemble_with_retrieval(history, message, self.retriever.as_deref())
            .await?;
        let request = self.request(messages);

        debug!(
            client = %self.client.name(),
            model = %request.model,
            context_len = request.messages.len(),
            "Opening streaming completion"
        );

        self.client.stream(request).await.map_err(Error::from)
    }
}
