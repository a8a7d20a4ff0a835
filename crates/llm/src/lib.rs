//! Chat-completion client used by the analysis endpoints.
//!
//! [`LlmClient`] speaks the OpenAI-compatible `chat/completions` protocol.
//! Callers depend on the [`CompletionProvider`] trait so tests can swap in
//! a canned implementation.

pub mod client;
pub mod config;
pub mod prompts;

use async_trait::async_trait;

pub use client::{LlmClient, LlmError};
pub use config::LlmConfig;

/// Anything that turns a prompt into completion text.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Complete `prompt`, capping the reply at `max_tokens`.
    async fn complete(&self, prompt: &str, max_tokens: u32) -> Result<String, LlmError>;
}

#[async_trait]
impl CompletionProvider for LlmClient {
    async fn complete(&self, prompt: &str, max_tokens: u32) -> Result<String, LlmError> {
        LlmClient::complete(self, prompt, max_tokens).await
    }
}
