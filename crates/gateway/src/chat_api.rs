//! Chat endpoints.
//!
//! - `POST /api/chat/complete` — one-shot completion
//! - `POST /api/chat/stream`   — SSE-style incremental completion
//! - `POST /api/chat/save`     — save acknowledgment (stub)
//!
//! The streaming relay is the defining behavior of this module: chunks
//! are flushed as produced, in upstream order, and every failure path
//! ends the stream with a terminal well-formed event so the client can
//! always detect completion.

use crate::{error_reply, ErrorResponse, SharedState};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::sse::{Event as SseEvent, Sse};
use axum::response::Json;
use axum::routing::post;
use axum::Router;
use chrono::{DateTime, Utc};
use pedsgate_core::error::GenerationError;
use pedsgate_core::generation::StreamChunk;
use pedsgate_core::message::Message;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::convert::Infallible;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tokio_stream::StreamExt;
use tracing::{debug, info};

pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/chat/complete", post(complete_chat_handler))
        .route("/chat/stream", post(stream_chat_handler))
        .route("/chat/save", post(save_chat_handler))
}

// --- DTOs ---

#[derive(Deserialize)]
struct ChatRequest {
    #[serde(default)]
    message: String,

    #[serde(default)]
    history: Vec<Message>,
}

#[derive(Serialize)]
struct CompleteResponse {
    response: String,
    timestamp: DateTime<Utc>,
}

#[derive(Deserialize)]
struct SaveChatRequest {
    #[serde(default)]
    #[allow(dead_code)]
    chat: serde_json::Value,
}

#[derive(Serialize)]
struct SaveChatResponse {
    success: bool,
    message: &'static str,
    chat_id: String,
}

// --- Handlers ---

async fn complete_chat_handler(
    State(state): State<SharedState>,
    Json(payload): Json<ChatRequest>,
) -> Result<Json<CompleteResponse>, (StatusCode, Json<ErrorResponse>)> {
    info!(history_len = payload.history.len(), "chat/complete request");

    let completion = state
        .chat
        .complete(&payload.message, &payload.history)
        .await
        .map_err(error_reply)?;

    Ok(Json(CompleteResponse {
        response: completion.response,
        timestamp: completion.timestamp,
    }))
}

async fn stream_chat_handler(
    State(state): State<SharedState>,
    Json(payload): Json<ChatRequest>,
) -> Result<
    Sse<impl futures::Stream<Item = Result<SseEvent, Infallible>>>,
    (StatusCode, Json<ErrorResponse>),
> {
    info!(history_len = payload.history.len(), "chat/stream request");

    let upstream = state
        .chat
        .open_stream(&payload.message, &payload.history)
        .await
        .map_err(error_reply)?;

    let deadline = tokio::time::Instant::now() + state.chat.request_timeout();
    let (tx, rx) = mpsc::channel::<serde_json::Value>(16);
    tokio::spawn(relay_stream(upstream, tx, deadline));

    let stream =
        ReceiverStream::new(rx).map(|event| Ok(SseEvent::default().data(event.to_string())));

    Ok(Sse::new(stream))
}

/// Relay upstream chunks to the client as `content`/`done`/`error` events.
///
/// Terminates on: the upstream `done` chunk, an upstream error, the
/// request deadline, or the client disconnecting (the event channel
/// closes). Returning drops the upstream receiver, which cancels the
/// provider's producer task and releases its connection.
async fn relay_stream(
    mut upstream: mpsc::Receiver<Result<StreamChunk, GenerationError>>,
    tx: mpsc::Sender<serde_json::Value>,
    deadline: tokio::time::Instant,
) {
    loop {
        let next = match tokio::time::timeout_at(deadline, upstream.recv()).await {
            Ok(item) => item,
            Err(_) => {
                let _ = tx
                    .send(json!({"error": "stream deadline exceeded"}))
                    .await;
                return;
            }
        };

        match next {
            Some(Ok(chunk)) => {
                if chunk.done {
                    if let Some(usage) = chunk.usage {
                        debug!(total_tokens = usage.total_tokens, "Stream finished");
                    }
                    let _ = tx.send(json!({"done": true})).await;
                    return;
                }

                if let Some(content) = chunk.content.filter(|c| !c.is_empty()) {
                    if tx.send(json!({"content": content})).await.is_err() {
                        return; // client disconnected
                    }
                }
            }
            Some(Err(e)) => {
                let _ = tx.send(json!({"error": e.to_string()})).await;
                return;
            }
            // Producer closed without a final chunk; end the stream
            // cleanly anyway.
            None => {
                let _ = tx.send(json!({"done": true})).await;
                return;
            }
        }
    }
}

/// Persistence is not wired up — acknowledge and hand back a fresh id so
/// the SPA can track the thread locally.
async fn save_chat_handler(
    Json(_payload): Json<SaveChatRequest>,
) -> Json<SaveChatResponse> {
    Json(SaveChatResponse {
        success: true,
        message: "Chat saved successfully",
        chat_id: uuid::Uuid::new_v4().to_string(),
    })
}
