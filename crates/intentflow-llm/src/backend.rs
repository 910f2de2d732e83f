//! The chat seam between synthesis and a concrete provider.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{ChatRequest, Completion};

/// Anything that can answer a single chat request with a completion.
///
/// [`crate::LlmClient`] is the production implementation; tests substitute
/// canned backends.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Short provider name, used in logs and explanations ("openai", ...).
    fn provider_name(&self) -> &str;

    /// Send `request` and return the first completion.
    async fn chat(&self, request: &ChatRequest) -> Result<Completion>;
}
