//! Chat pipeline for pedsgate.
//!
//! Two pieces:
//! - `ContextAssembler` builds the ordered message list sent upstream
//!   (system prompt + trimmed history + optional retrieved context +
//!   user message).
//! - `ChatService` constructs one `GenerationRequest` per HTTP call and
//!   dispatches it, one-shot or streaming, under a bounded deadline.

pub mod assembler;
pub mod service;

pub use assembler::{ContextAssembler, DEFAULT_SYSTEM_PROMPT};
pub use service::{ChatCompletion, ChatService};
