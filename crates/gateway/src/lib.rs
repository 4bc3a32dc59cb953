//! HTTP API gateway for pedsgate.
//!
//! Exposes the chat endpoints (one-shot, streaming, save stub), the
//! reference-content endpoints (search, lookup, chapters, enhanced-chat
//! preview), a health check, and the SPA static assets.
//!
//! Built on Axum. All collaborators — the generation client and the
//! content retriever — are constructed once at startup and injected via
//! shared state, so tests substitute scripted fakes behind the same
//! traits.

pub mod chat_api;
pub mod frontend;
pub mod rag_api;

use axum::extract::{DefaultBodyLimit, State};
use axum::http::StatusCode;
use axum::response::Json;
use axum::routing::get;
use axum::Router;
use pedsgate_chat::{ChatService, ContextAssembler};
use pedsgate_config::AppConfig;
use pedsgate_core::error::Error;
use pedsgate_core::generation::GenerationClient;
use pedsgate_core::retrieval::ContentRetriever;
use pedsgate_providers::MistralClient;
use pedsgate_retrieval::{Corpus, KeywordRetriever};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::CorsLayer;
use tracing::info;

/// Shared application state for the gateway.
///
/// Immutable after startup; every request reads through the same `Arc`.
pub struct GatewayState {
    pub chat: ChatService,
    pub assembler: ContextAssembler,
    pub client: Arc<dyn GenerationClient>,
    pub retriever: Arc<dyn ContentRetriever>,
    pub corpus: Arc<Corpus>,
}

pub type SharedState = Arc<GatewayState>;

/// Build the full router: `/api` endpoints plus SPA fallback.
pub fn build_router(state: SharedState, config: &AppConfig) -> Router {
    let api = Router::new()
        .route("/health", get(health_handler))
        .merge(chat_api::router())
        .merge(rag_api::router())
        .with_state(state);

    // The SPA may be served from another origin during development; the
    // original deployment allowed any origin.
    let cors = if config.gateway.cors_allow_any_origin {
        CorsLayer::permissive()
    } else {
        CorsLayer::new()
    };

    Router::new()
        .nest("/api", api)
        .fallback_service(frontend::frontend_service(&config.gateway.static_dir))
        .layer(DefaultBodyLimit::max(1024 * 1024)) // 1 MB body limit
        .layer(cors)
        .layer(tower_http::trace::TraceLayer::new_for_http())
}

/// Build the shared state from configuration: real Mistral client plus the
/// built-in keyword corpus.
pub fn build_state(config: &AppConfig) -> Result<SharedState, Error> {
    let api_key = config.api_key.clone().ok_or_else(|| {
        Error::Config {
            message: "No API key configured — set MISTRAL_API_KEY or api_key in config.toml"
                .into(),
        }
    })?;

    let client: Arc<dyn GenerationClient> = Arc::new(MistralClient::new(
        "mistral",
        &config.provider.base_url,
        api_key,
    )?);

    let corpus = Arc::new(Corpus::builtin());
    let retriever: Arc<dyn ContentRetriever> = Arc::new(KeywordRetriever::new(corpus.clone()));

    let mut assembler =
        ContextAssembler::new(config.chat.history_window, config.chat.context_passages);
    if let Some(prompt) = &config.chat.system_prompt_override {
        assembler = assembler.with_system_prompt(prompt.clone());
    }

    let chat = ChatService::new(
        client.clone(),
        assembler.clone(),
        &config.provider.model,
        config.provider.temperature,
        config.provider.max_tokens,
        Duration::from_secs(config.gateway.request_timeout_secs),
    );

    Ok(Arc::new(GatewayState {
        chat,
        assembler,
        client,
        retriever,
        corpus,
    }))
}

/// Start the gateway HTTP server.
pub async fn start(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let state = build_state(&config)?;
    let app = build_router(state, &config);

    let addr = format!("{}:{}", config.gateway.host, config.gateway.port);
    info!(addr = %addr, model = %config.provider.model, "Gateway starting");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// --- Error envelope ---

/// The JSON error body used by every endpoint.
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Translate a domain error to the matching HTTP response.
///
/// Validation errors fail fast with 400, unknown content ids with 404,
/// everything else (upstream faults included) surfaces as 500 with the
/// underlying message echoed.
pub(crate) fn error_reply(err: Error) -> (StatusCode, Json<ErrorResponse>) {
    let status = match &err {
        Error::InvalidInput(_) => StatusCode::BAD_REQUEST,
        Error::NotFound(_) => StatusCode::NOT_FOUND,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };

    let message = match err {
        Error::InvalidInput(message) | Error::NotFound(message) => message,
        other => other.to_string(),
    };

    (status, Json(ErrorResponse { error: message }))
}

// --- Handlers ---

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    upstream: bool,
}

async fn health_handler(State(state): State<SharedState>) -> Json<HealthResponse> {
    let upstream = state.client.health_check().await.unwrap_or(false);
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        upstream,
    })
}
