//! Context assembly — building the message list sent upstream.
//!
//! Assembly is deterministic and never mutates its inputs. The shape is
//! fixed:
//!
//! 1. Exactly one system message (domain scope + disclaimer)
//! 2. At most the last `history_window` history entries, verbatim
//! 3. If passages were retrieved: one synthetic user message carrying the
//!    top `context_passages` of them, immediately before the final entry
//! 4. The current user message

use pedsgate_core::error::Error;
use pedsgate_core::message::Message;
use pedsgate_core::retrieval::{ContentRetriever, Passage};
use tracing::warn;

/// The fixed domain prompt: pediatric-medicine scope, educational-use
/// disclaimer, structured-output instruction.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are Pedsgate, an AI assistant specialized in \
pediatric medicine based on the Nelson Textbook of Pediatrics. You provide evidence-based \
medical information for healthcare professionals and medical students. Always emphasize that \
your responses are for educational purposes and should not replace clinical judgment or direct \
patient care. Format your responses in clear, professional markdown.";

const CONTEXT_HEADER: &str = "Relevant information from the Nelson Textbook of Pediatrics:";

const CONTEXT_FRAMING: &str = "Please ground your answer in the above context together with \
your general knowledge of pediatric medicine.";

const ENHANCED_SUFFIX: &str = "Please provide a comprehensive answer based on the above \
context and your knowledge of pediatric medicine.";

/// Builds the ordered message list for a generation request.
#[derive(Debug, Clone)]
pub struct ContextAssembler {
    system_prompt: String,
    history_window: usize,
    context_passages: usize,
}

impl ContextAssembler {
    pub fn new(history_window: usize, context_passages: usize) -> Self {
        Self {
            system_prompt: DEFAULT_SYSTEM_PROMPT.into(),
            history_window,
            context_passages,
        }
    }

    /// Replace the built-in system prompt.
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    /// Assemble the full context for one request.
    ///
    /// `history` is borrowed and never modified; entries beyond the window
    /// are dropped silently, oldest first. Passes an empty `passages`
    /// slice to skip retrieval enrichment.
    pub fn assemble(
        &self,
        history: &[Message],
        user_message: &str,
        passages: &[Passage],
    ) -> Result<Vec<Message>, Error> {
        if user_message.trim().is_empty() {
            return Err(Error::InvalidInput("Message is required".into()));
        }

        let start = history.len().saturating_sub(self.history_window);
        let window = &history[start..];

        let mut messages = Vec::with_capacity(window.len() + 3);
        messages.push(Message::system(&self.system_prompt));
        messages.extend(window.iter().cloned());

        if !passages.is_empty() {
            let block = format!(
                "{}\n{}",
                self.context_block(passages),
                CONTEXT_FRAMING
            );
            messages.push(Message::user(block));
        }

        messages.push(Message::user(user_message));
        Ok(messages)
    }

    /// Assemble with an optional retrieval step.
    ///
    /// When a retriever is supplied, its top passages enrich the context.
    /// An unavailable retrieval backend is not fatal: the chat proceeds
    /// without enrichment, exactly as if nothing had matched.
    pub async fn assemble_with_retrieval(
        &self,
        history: &[Message],
        user_message: &str,
        retriever: Option<&dyn ContentRetriever>,
    ) -> Result<Vec<Message>, Error> {
        // Validate before spending anything on retrieval.
        if user_message.trim().is_empty() {
            return Err(Error::InvalidInput("Message is required".into()));
        }

        let passages = match retriever {
            Some(retriever) => match retriever
                .search(user_message, self.context_passages)
                .await
            {
                Ok(passages) => passages,
                Err(e) => {
                    warn!(retriever = retriever.name(), error = %e, "Retrieval unavailable, proceeding without context");
                    Vec::new()
                }
            },
            None => Vec::new(),
        };

        self.assemble(history, user_message, &passages)
    }

    /// The retrieval-preview prompt served by the enhanced-chat endpoint:
    /// context block, original question, instruction suffix. Not a chat
    /// completion — the caller returns this string without dispatching it.
    pub fn build_enhanced_prompt(&self, user_message: &str, passages: &[Passage]) -> String {
        let context = if passages.is_empty() {
            String::new()
        } else {
            self.context_block(passages)
        };

        format!("{context}\nUser Question: {user_message}\n\n{ENHANCED_SUFFIX}")
    }

    /// Format the top passages as labeled chapter/content blocks.
    fn context_block(&self, passages: &[Passage]) -> String {
        let mut block = format!("{CONTEXT_HEADER}\n\n");
        for passage in passages.iter().take(self.context_passages) {
            block.push_str(&format!(
                "Chapter: {}\nContent: {}\n\n",
                passage.chapter, passage.content
            ));
        }
        block
    }
}
