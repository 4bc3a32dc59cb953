//! Reference-content endpoints.
//!
//! - `POST /api/rag/search`        — keyword search with previews
//! - `GET  /api/rag/content/{id}`  — exact passage lookup
//! - `GET  /api/rag/chapters`      — chapter listing
//! - `POST /api/rag/enhanced-chat` — retrieval-augmented prompt preview
//!
//! The enhanced-chat endpoint builds the context-annotated prompt and
//! returns it without calling the generation provider; merging it with
//! the chat endpoints stays an explicit, opt-in mode.

use crate::{error_reply, ErrorResponse, SharedState};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use axum::routing::{get, post};
use axum::Router;
use pedsgate_core::error::Error;
use pedsgate_core::retrieval::Passage;
use serde::{Deserialize, Serialize};
use tracing::info;

/// At most this many results appear in a search response.
const SEARCH_RESULT_LIMIT: usize = 5;

/// Search results preview passage content up to this many characters.
const SEARCH_PREVIEW_CHARS: usize = 500;

/// At most this many chapters are reported for an enhanced prompt.
const ENHANCED_CHAPTER_LIMIT: usize = 3;

pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/rag/search", post(search_handler))
        .route("/rag/content/{id}", get(content_handler))
        .route("/rag/chapters", get(chapters_handler))
        .route("/rag/enhanced-chat", post(enhanced_chat_handler))
}

// --- DTOs ---

#[derive(Deserialize)]
struct SearchRequest {
    #[serde(default)]
    query: String,
}

#[derive(Serialize)]
struct SearchResult {
    id: String,
    chapter: String,
    page_number: u32,
    content: String,
    relevance_score: f32,
}

impl SearchResult {
    /// A preview row: content capped at [`SEARCH_PREVIEW_CHARS`].
    fn preview(passage: Passage) -> Self {
        let content = if passage.content.chars().count() > SEARCH_PREVIEW_CHARS {
            let truncated: String = passage.content.chars().take(SEARCH_PREVIEW_CHARS).collect();
            format!("{truncated}...")
        } else {
            passage.content
        };

        Self {
            id: passage.id,
            chapter: passage.chapter,
            page_number: passage.page_number,
            content,
            relevance_score: passage.relevance_score,
        }
    }
}

#[derive(Serialize)]
struct SearchResponse {
    results: Vec<SearchResult>,
    total_found: usize,
}

#[derive(Serialize)]
struct ChaptersResponse {
    chapters: Vec<String>,
    total_content_pieces: usize,
}

#[derive(Deserialize)]
struct EnhancedChatRequest {
    #[serde(default)]
    message: String,
}

#[derive(Serialize)]
struct EnhancedChatResponse {
    enhanced_message: String,
    context_used: usize,
    relevant_chapters: Vec<String>,
}

// --- Handlers ---

async fn search_handler(
    State(state): State<SharedState>,
    Json(payload): Json<SearchRequest>,
) -> Result<Json<SearchResponse>, (StatusCode, Json<ErrorResponse>)> {
    if payload.query.trim().is_empty() {
        return Err(error_reply(Error::InvalidInput("Query is required".into())));
    }

    info!(query_len = payload.query.len(), "rag/search request");

    let hits = state
        .retriever
        .search(&payload.query, state.corpus.len())
        .await
        .map_err(|e| error_reply(e.into()))?;

    let total_found = hits.len();
    let results: Vec<SearchResult> = hits
        .into_iter()
        .take(SEARCH_RESULT_LIMIT)
        .map(SearchResult::preview)
        .collect();

    Ok(Json(SearchResponse {
        results,
        total_found,
    }))
}

async fn content_handler(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<Passage>, (StatusCode, Json<ErrorResponse>)> {
    state
        .corpus
        .get(&id)
        .cloned()
        .map(Json)
        .ok_or_else(|| error_reply(Error::NotFound("Content not found".into())))
}

async fn chapters_handler(State(state): State<SharedState>) -> Json<ChaptersResponse> {
    Json(ChaptersResponse {
        chapters: state.corpus.chapters(),
        total_content_pieces: state.corpus.len(),
    })
}

async fn enhanced_chat_handler(
    State(state): State<SharedState>,
    Json(payload): Json<EnhancedChatRequest>,
) -> Result<Json<EnhancedChatResponse>, (StatusCode, Json<ErrorResponse>)> {
    if payload.message.trim().is_empty() {
        return Err(error_reply(Error::InvalidInput(
            "Message is required".into(),
        )));
    }

    info!(message_len = payload.message.len(), "rag/enhanced-chat request");

    let hits = state
        .retriever
        .search(&payload.message, state.corpus.len())
        .await
        .map_err(|e| error_reply(e.into()))?;

    let enhanced_message = state
        .assembler
        .build_enhanced_prompt(&payload.message, &hits);

    let relevant_chapters: Vec<String> = hits
        .iter()
        .take(ENHANCED_CHAPTER_LIMIT)
        .map(|p| p.chapter.clone())
        .collect();

    Ok(Json(EnhancedChatResponse {
        enhanced_message,
        context_used: hits.len(),
        relevant_chapters,
    }))
}

#[cfg(test)]
mod tests {
    use crate::test_support::test_router;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use http_body_util::BodyExt;
    use pedsgate_providers::MockClient;
    use tower::ServiceExt;

    fn app() -> axum::Router {
        test_router(MockClient::with_text("unused"))
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

    #[tokio::test]
    async fn search_finds_jaundice_passage() {
        let req = post_json("/api/rag/search", serde_json::json!({"query": "jaundice"}));
        let response = app().oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json["total_found"], 1);
        assert_eq!(json["results"][0]["chapter"], "Neonatal Jaundice");
        assert!(json["results"][0]["relevance_score"].as_f64().unwrap() > 0.0);
    }

    #[tokio::test]
    async fn search_previews_long_content() {
        let req = post_json("/api/rag/search", serde_json::json!({"query": "jaundice"}));
        let response = app().oneshot(req).await.unwrap();
        let json = body_json(response).await;

        let content = json["results"][0]["content"].as_str().unwrap();
        assert!(content.chars().count() <= 503); // preview + ellipsis
        assert!(content.ends_with("..."));
    }

    #[tokio::test]
    async fn search_with_no_matches_is_empty_not_error() {
        let req = post_json(
            "/api/rag/search",
            serde_json::json!({"query": "unrelated_token_xyz"}),
        );
        let response = app().oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json["total_found"], 0);
        assert_eq!(json["results"].as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn search_rejects_blank_query() {
        let req = post_json("/api/rag/search", serde_json::json!({"query": "  "}));
        let response = app().oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let json = body_json(response).await;
        assert_eq!(json["error"], "Query is required");
    }

    #[tokio::test]
    async fn search_maps_unavailable_backend_to_500() {
        use pedsgate_chat::{ChatService, ContextAssembler};
        use pedsgate_core::generation::GenerationClient;
        use pedsgate_core::retrieval::ContentRetriever;
        use pedsgate_retrieval::{Corpus, StaticRetriever};
        use std::sync::Arc;
        use std::time::Duration;

        let client: Arc<dyn GenerationClient> = Arc::new(MockClient::with_text("unused"));
        let corpus = Arc::new(Corpus::builtin());
        let retriever: Arc<dyn ContentRetriever> =
            Arc::new(StaticRetriever::unavailable("embedding service down"));
        let assembler = ContextAssembler::new(10, 3);
        let chat = ChatService::new(
            client.clone(),
            assembler.clone(),
            "mock-model",
            0.3,
            2000,
            Duration::from_secs(5),
        );
        let state = Arc::new(crate::GatewayState {
            chat,
            assembler,
            client,
            retriever,
            corpus,
        });
        let app = crate::build_router(state, &pedsgate_config::AppConfig::default());

        let req = post_json("/api/rag/search", serde_json::json!({"query": "jaundice"}));
        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let json = body_json(response).await;
        assert!(json["error"].as_str().unwrap().contains("unavailable"));
    }

    #[tokio::test]
    async fn content_lookup_returns_exact_passage() {
        let req = Request::builder()
            .uri("/api/rag/content/1")
            .body(Body::empty())
            .unwrap();
        let response = app().oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json["id"], "1");
        assert_eq!(json["chapter"], "Neonatal Jaundice");
        assert_eq!(json["page_number"], 102);
        // Full content, no preview truncation.
        assert!(json["content"].as_str().unwrap().contains("phototherapy"));
    }

    #[tokio::test]
    async fn content_lookup_unknown_id_is_404() {
        let req = Request::builder()
            .uri("/api/rag/content/999")
            .body(Body::empty())
            .unwrap();
        let response = app().oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let json = body_json(response).await;
        assert_eq!(json["error"], "Content not found");
    }

    #[tokio::test]
    async fn chapters_lists_whole_corpus() {
        let req = Request::builder()
            .uri("/api/rag/chapters")
            .body(Body::empty())
            .unwrap();
        let response = app().oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json["total_content_pieces"], 5);
        let chapters = json["chapters"].as_array().unwrap();
        assert_eq!(chapters.len(), 5);
        // Sorted alphabetically.
        assert_eq!(chapters[0], "Neonatal Jaundice");
    }

    #[tokio::test]
    async fn enhanced_chat_reports_matched_context() {
        // "bilirubin" only occurs in the jaundice passage, "bronchiolitis"
        // only in the respiratory one.
        let req = post_json(
            "/api/rag/enhanced-chat",
            serde_json::json!({"message": "bilirubin bronchiolitis"}),
        );
        let response = app().oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json["context_used"], 2);
        assert_eq!(
            json["relevant_chapters"],
            serde_json::json!(["Neonatal Jaundice", "Pediatric Respiratory Infections"])
        );

        let prompt = json["enhanced_message"].as_str().unwrap();
        assert!(prompt.contains("Chapter: Neonatal Jaundice"));
        assert!(prompt.contains("User Question: bilirubin bronchiolitis"));
    }

    #[tokio::test]
    async fn enhanced_chat_without_matches_still_builds_prompt() {
        let req = post_json(
            "/api/rag/enhanced-chat",
            serde_json::json!({"message": "unrelated_token_xyz"}),
        );
        let response = app().oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json["context_used"], 0);
        assert_eq!(json["relevant_chapters"].as_array().unwrap().len(), 0);
        assert!(json["enhanced_message"]
            .as_str()
            .unwrap()
            .contains("User Question: unrelated_token_xyz"));
    }

    #[tokio::test]
    async fn enhanced_chat_rejects_blank_message() {
        let req = post_json("/api/rag/enhanced-chat", serde_json::json!({"message": ""}));
        let response = app().oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
