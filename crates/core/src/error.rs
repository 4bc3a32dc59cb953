//! Error types for the pedsgate domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error enum; the top-level `Error`
//! aggregates them and carries the request-validation variants that the
//! gateway translates to HTTP status codes.

use thiserror::Error;

/// The top-level error type for all pedsgate operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Upstream generation errors ---
    #[error("Generation error: {0}")]
    Generation(#[from] GenerationError),

    // --- Retrieval errors ---
    #[error("Retrieval error: {0}")]
    Retrieval(#[from] RetrievalError),

    // --- Request validation ---
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not found: {0}")]
    NotFound(String),

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // --- Generic ---
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

/// Failures from the upstream generation provider.
///
/// Never retried internally: retry policy belongs to the caller, not the
/// client (one request, one round trip).
#[derive(Debug, Clone, Error)]
pub enum GenerationError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Stream interrupted: {0}")]
    StreamInterrupted(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),
}

/// Failures from the reference-content retriever.
///
/// `Unavailable` is a non-fatal condition for context assembly: the chat
/// proceeds without enrichment when the retrieval backend is down.
#[derive(Debug, Clone, Error)]
pub enum RetrievalError {
    #[error("Retrieval unavailable: {0}")]
    Unavailable(String),
}
