//! Generation client implementations for pedsgate.
//!
//! All clients implement the `pedsgate_core::GenerationClient` trait.
//! The gateway constructs one at startup from configuration and injects it
//! into the chat service; nothing here is process-global.

pub mod mistral;
pub mod mock;

pub use mistral::MistralClient;
pub use mock::MockClient;
