//! Scripted mock client for tests.
//!
//! Lets gateway and service tests exercise the full request pipeline —
//! including streaming relay framing and failure paths — without a
//! network. Each constructed scenario plays back the same script on every
//! call.

use async_trait::async_trait;
use pedsgate_core::error::GenerationError;
use pedsgate_core::generation::{
    GenerationClient, GenerationRequest, GenerationResponse, StreamChunk, Usage,
};
use std::sync::Mutex;

enum Script {
    /// `complete` returns this text; `stream` splits it into word chunks.
    Text(String),
    /// `stream` yields these deltas then a done chunk; `complete` joins them.
    Chunks(Vec<String>),
    /// `stream` yields these deltas then the error; `complete` fails with it.
    ChunksThenError(Vec<String>, GenerationError),
    /// Both operations fail immediately.
    Failure(GenerationError),
}

/// A mock generation client that plays back a scripted outcome.
pub struct MockClient {
    script: Script,
    requests: Mutex<Vec<GenerationRequest>>,
}

impl MockClient {
    /// A client that answers every request with the given text.
    pub fn with_text(text: impl Into<String>) -> Self {
        Self {
            script: Script::Text(text.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// A client that streams exactly these content deltas, then completes.
    pub fn with_chunks(chunks: Vec<&str>) -> Self {
        Self {
            script: Script::Chunks(chunks.into_iter().map(String::from).collect()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// A client whose stream fails after yielding the given deltas.
    pub fn failing_after(chunks: Vec<&str>, error: GenerationError) -> Self {
        Self {
            script: Script::ChunksThenError(
                chunks.into_iter().map(String::from).collect(),
                error,
            ),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// A client that fails every request immediately.
    pub fn failing(error: GenerationError) -> Self {
        Self {
            script: Script::Failure(error),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// The requests this client has received, in order.
    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    fn record(&self, request: &GenerationRequest) {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(request.clone());
    }

    fn usage() -> Usage {
        Usage {
            prompt_tokens: 10,
            completion_tokens: 5,
            total_tokens: 15,
        }
    }
}

#[async_trait]
impl GenerationClient for MockClient {
    fn name(&self) -> &str {
        "mock"
    }

    async fn complete(
        &self,
        request: GenerationRequest,
    ) -> std::result::Result<GenerationResponse, GenerationError> {
        self.record(&request);

        let text = match &self.script {
            Script::Text(text) => text.clone(),
            Script::Chunks(chunks) => chunks.concat(),
            Script::ChunksThenError(_, error) | Script::Failure(error) => {
                return Err(error.clone());
            }
        };

        Ok(GenerationResponse {
            text,
            model: request.model,
            usage: Some(Self::usage()),
            finished_at: chrono::Utc::now(),
        })
    }

    async fn stream(
        &self,
        request: GenerationRequest,
    ) -> std::result::Result<
        tokio::sync::mpsc::Receiver<std::result::Result<StreamChunk, GenerationError>>,
        GenerationError,
    > {
        self.record(&request);

        let (deltas, error): (Vec<String>, Option<GenerationError>) = match &self.script {
            Script::Text(text) => (
                text.split_inclusive(' ').map(String::from).collect(),
                None,
            ),
            Script::Chunks(chunks) => (chunks.clone(), None),
            Script::ChunksThenError(chunks, error) => (chunks.clone(), Some(error.clone())),
            Script::Failure(error) => return Err(error.clone()),
        };

        let (tx, rx) = tokio::sync::mpsc::channel(16);
        tokio::spawn(async move {
            for delta in deltas {
                if tx.send(Ok(StreamChunk::delta(delta))).await.is_err() {
                    return;
                }
            }
            let terminal = match error {
                Some(e) => Err(e),
                None => Ok(StreamChunk::finished(Some(Self::usage()))),
            };
            let _ = tx.send(terminal).await;
        });

        Ok(rx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pedsgate_core::message::Message;

    fn request() -> GenerationRequest {
        GenerationRequest {
            model: "mock-model".into(),
            messages: vec![Message::user("hi")],
            temperature: 0.3,
            max_tokens: Some(100),
        }
    }

    #[tokio::test]
    async fn scripted_text_completes() {
        let client = MockClient::with_text("All done.");
        let response = client.complete(request()).await.unwrap();
        assert_eq!(response.text, "All done.");
        assert_eq!(client.requests().len(), 1);
    }

    #[tokio::test]
    async fn scripted_chunks_stream_then_finish() {
        let client = MockClient::with_chunks(vec!["a", "b", "c"]);
        let mut rx = client.stream(request()).await.unwrap();

        let mut deltas = Vec::new();
        let mut finished = false;
        while let Some(item) = rx.recv().await {
            let chunk = item.unwrap();
            if chunk.done {
                finished = true;
            } else {
                deltas.push(chunk.content.unwrap());
            }
        }
        assert_eq!(deltas, vec!["a", "b", "c"]);
        assert!(finished);
    }

    #[tokio::test]
    async fn failing_stream_ends_with_error() {
        let client = MockClient::failing_after(
            vec!["partial"],
            GenerationError::StreamInterrupted("connection reset".into()),
        );
        let mut rx = client.stream(request()).await.unwrap();

        assert!(rx.recv().await.unwrap().is_ok());
        assert!(rx.recv().await.unwrap().is_err());
        assert!(rx.recv().await.is_none());
    }
}
