//! # Pedsgate Core
//!
//! Domain types, traits, and error definitions for the pedsgate chat gateway.
//! This crate has **zero framework dependencies** — it defines the domain model
//! that all other crates implement against.
//!
//! ## Design Philosophy
//!
//! The two external collaborators — the upstream generation provider and the
//! reference-content retriever — are defined as traits here. Implementations
//! live in their respective crates. This enables:
//! - Swapping implementations via configuration
//! - Easy testing with mock/stub implementations
//! - Clean dependency graph (all crates depend inward on core)

pub mod error;
pub mod generation;
pub mod message;
pub mod retrieval;

// Re-export key types at crate root for ergonomics
pub use error::{Error, GenerationError, Result, RetrievalError};
pub use generation::{
    GenerationClient, GenerationRequest, GenerationResponse, StreamChunk, Usage,
};
pub use message::{Message, Role};
pub use retrieval::{ContentRetriever, Passage};
