//! GenerationClient trait — the abstraction over the upstream LLM provider.
//!
//! A GenerationClient knows how to send an assembled message list to a
//! chat-completion service and get the answer back, either as a complete
//! response or as a stream of incremental deltas.
//!
//! Implementations: Mistral (OpenAI-compatible endpoint), scripted mock.

use crate::error::GenerationError;
use crate::message::Message;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single upstream generation request.
///
/// Constructed once per HTTP call and never mutated after dispatch. Model,
/// temperature, and max_tokens are always filled in explicitly — no default
/// is silently substituted downstream of this struct.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// The model to use (e.g., "mistral-large-latest")
    pub model: String,

    /// The assembled conversation messages, oldest first
    pub messages: Vec<Message>,

    /// Temperature (0.0 = deterministic, higher = creative)
    pub temperature: f32,

    /// Maximum tokens to generate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

/// A complete (non-streaming) response from the provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationResponse {
    /// The generated answer text
    pub text: String,

    /// Which model actually responded (may differ from requested)
    pub model: String,

    /// Token usage statistics
    pub usage: Option<Usage>,

    /// When the response finished arriving
    pub finished_at: DateTime<Utc>,
}

/// Token usage information.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// A single chunk in a streaming response.
///
/// The stream is a lazy, finite sequence: zero or more content chunks
/// followed by exactly one chunk with `done: true`. A transport failure
/// travels as the `Err` side of the channel and is always the last item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamChunk {
    /// Partial content delta
    #[serde(default)]
    pub content: Option<String>,

    /// Whether this is the final chunk
    #[serde(default)]
    pub done: bool,

    /// Usage info (typically only in the final chunk)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
}

impl StreamChunk {
    /// A content delta chunk.
    pub fn delta(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            done: false,
            usage: None,
        }
    }

    /// The terminal chunk of a successful stream.
    pub fn finished(usage: Option<Usage>) -> Self {
        Self {
            content: None,
            done: true,
            usage,
        }
    }
}

/// The core GenerationClient trait.
///
/// The gateway calls `complete()` or `stream()` without knowing which
/// provider is behind it — clients are constructed at startup and injected,
/// never global.
#[async_trait]
pub trait GenerationClient: Send + Sync {
    /// A human-readable name for this client (e.g., "mistral").
    fn name(&self) -> &str;

    /// Send a request and get a complete response in one round trip.
    async fn complete(
        &self,
        request: GenerationRequest,
    ) -> std::result::Result<GenerationResponse, GenerationError>;

    /// Send a request and get a stream of response chunks.
    ///
    /// The producer is cancellable: dropping the receiver makes the next
    /// send fail, which terminates the producer task and releases the
    /// upstream connection.
    async fn stream(
        &self,
        request: GenerationRequest,
    ) -> std::result::Result<
        tokio::sync::mpsc::Receiver<std::result::Result<StreamChunk, GenerationError>>,
        GenerationError,
    >;

    /// Probe whether the upstream endpoint is reachable.
    async fn health_check(&self) -> std::result::Result<bool, GenerationError> {
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Message;

    #[test]
    fn request_serializes_without_empty_max_tokens() {
        let request = GenerationRequest {
            model: "mistral-large-latest".into(),
            messages: vec![Message::user("hello")],
            temperature: 0.3,
            max_tokens: None,
        };
        let json = serde_json::to_string(&request).unwrap();
        assert!(!json.contains("max_tokens"));
    }

    #[test]
    fn chunk_constructors() {
        let delta = StreamChunk::delta("Neonatal");
        assert_eq!(delta.content.as_deref(), Some("Neonatal"));
        assert!(!delta.done);

        let done = StreamChunk::finished(Some(Usage {
            prompt_tokens: 10,
            completion_tokens: 5,
            total_tokens: 15,
        }));
        assert!(done.done);
        assert!(done.content.is_none());
        assert_eq!(done.usage.unwrap().total_tokens, 15);
    }
}
