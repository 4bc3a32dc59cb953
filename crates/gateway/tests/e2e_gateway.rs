//! End-to-end integration tests for the pedsgate gateway.
//!
//! These exercise the full pipeline from HTTP request to response —
//! validation, context assembly, upstream dispatch, and streaming relay —
//! against a scripted generation client and the built-in corpus.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use pedsgate_chat::{ChatService, ContextAssembler};
use pedsgate_config::AppConfig;
use pedsgate_core::error::GenerationError;
use pedsgate_core::generation::GenerationClient;
use pedsgate_core::message::Role;
use pedsgate_core::retrieval::ContentRetriever;
use pedsgate_gateway::{build_router, GatewayState};
use pedsgate_providers::MockClient;
use pedsgate_retrieval::{Corpus, KeywordRetriever};
use tower::ServiceExt;

// ── Harness ──────────────────────────────────────────────────────────────

/// Build a router around a scripted client, keeping a handle on the mock
/// so tests can inspect the requests it received.
fn harness(mock: MockClient) -> (Router, Arc<MockClient>) {
    let mock = Arc::new(mock);
    let client: Arc<dyn GenerationClient> = mock.clone();

    let corpus = Arc::new(Corpus::builtin());
    let retriever: Arc<dyn ContentRetriever> = Arc::new(KeywordRetriever::new(corpus.clone()));
    let assembler = ContextAssembler::new(10, 3);

    let chat = ChatService::new(
        client.clone(),
        assembler.clone(),
        "mistral-large-latest",
        0.3,
        2000,
        Duration::from_secs(5),
    );

    let state = Arc::new(GatewayState {
        chat,
        assembler,
        client,
        retriever,
        corpus,
    });

    (build_router(state, &AppConfig::default()), mock)
}

fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn sse_events(response: axum::response::Response) -> Vec<serde_json::Value> {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    text.split("\n\n")
        .filter_map(|frame| frame.strip_prefix("data: "))
        .map(|data| serde_json::from_str(data).unwrap())
        .collect()
}

fn long_history() -> serde_json::Value {
    let entries: Vec<serde_json::Value> = (0..15)
        .map(|i| {
            let role = if i % 2 == 0 { "user" } else { "assistant" };
            serde_json::json!({"role": role, "content": format!("turn {i}")})
        })
        .collect();
    serde_json::Value::Array(entries)
}

// ── One-shot flow ────────────────────────────────────────────────────────

#[tokio::test]
async fn one_shot_flow_assembles_bounded_context() {
    let (app, mock) = harness(MockClient::with_text("Phototherapy is first-line."));

    let req = post_json(
        "/api/chat/complete",
        serde_json::json!({
            "message": "How is neonatal jaundice treated?",
            "history": long_history(),
        }),
    );

    let response = app.oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["response"], "Phototherapy is first-line.");
    assert!(json["timestamp"].is_string());

    // The upstream saw: 1 system + 10 most recent history + 1 user.
    let requests = mock.requests();
    assert_eq!(requests.len(), 1);
    let request = &requests[0];
    assert_eq!(request.messages.len(), 12);
    assert_eq!(request.messages[0].role, Role::System);
    assert!(request.messages[0].content.contains("pediatric medicine"));
    assert_eq!(request.messages[1].content, "turn 5");
    assert_eq!(
        request.messages.last().unwrap().content,
        "How is neonatal jaundice treated?"
    );

    // Recorded parameters, no silent defaults.
    assert_eq!(request.model, "mistral-large-latest");
    assert_eq!(request.temperature, 0.3);
    assert_eq!(request.max_tokens, Some(2000));
}

#[tokio::test]
async fn validation_fails_before_any_dispatch() {
    let (app, mock) = harness(MockClient::with_text("never sent"));

    let req = post_json("/api/chat/complete", serde_json::json!({"message": " \n "}));
    let response = app.oneshot(req).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "Message is required");
    assert!(mock.requests().is_empty());
}

// ── Streaming flow ───────────────────────────────────────────────────────

#[tokio::test]
async fn streaming_flow_relays_chunks_in_order() {
    let (app, _mock) = harness(MockClient::with_chunks(vec![
        "Fever ", "above ", "38\u{b0}C ", "matters.",
    ]));

    let req = post_json("/api/chat/stream", serde_json::json!({"message": "fever?"}));
    let response = app.oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let events = sse_events(response).await;
    assert_eq!(events.len(), 5);
    let text: String = events[..4]
        .iter()
        .map(|e| e["content"].as_str().unwrap())
        .collect();
    assert_eq!(text, "Fever above 38\u{b0}C matters.");
    assert_eq!(events[4], serde_json::json!({"done": true}));
}

#[tokio::test]
async fn streaming_flow_surfaces_terminal_error() {
    let (app, _mock) = harness(MockClient::failing_after(
        vec!["partial "],
        GenerationError::StreamInterrupted("connection reset by peer".into()),
    ));

    let req = post_json("/api/chat/stream", serde_json::json!({"message": "fever?"}));
    let response = app.oneshot(req).await.unwrap();

    let events = sse_events(response).await;
    assert_eq!(events.len(), 2);
    assert_eq!(events[0]["content"], "partial ");
    assert!(events[1]["error"]
        .as_str()
        .unwrap()
        .contains("connection reset"));
    assert!(events.iter().all(|e| e.get("done").is_none()));
}

// ── Retrieval flow ───────────────────────────────────────────────────────

#[tokio::test]
async fn retrieval_preview_flow_round_trips() {
    let (app, mock) = harness(MockClient::with_text("unused"));

    // Build the enhanced prompt for a question matching one passage.
    let req = post_json(
        "/api/rag/enhanced-chat",
        serde_json::json!({"message": "what about bilirubin levels"}),
    );
    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["context_used"], 1);
    assert_eq!(json["relevant_chapters"], serde_json::json!(["Neonatal Jaundice"]));
    let prompt = json["enhanced_message"].as_str().unwrap();
    assert!(prompt.contains("Chapter: Neonatal Jaundice"));
    assert!(prompt.contains("User Question: what about bilirubin levels"));

    // The preview endpoint never calls the generation provider.
    assert!(mock.requests().is_empty());

    // The chapter named in the preview resolves to its full passage.
    let req = Request::builder()
        .uri("/api/rag/content/1")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let passage = body_json(response).await;
    assert_eq!(passage["chapter"], "Neonatal Jaundice");
    assert!(passage["content"].as_str().unwrap().contains("bilirubin"));
}
