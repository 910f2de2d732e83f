//! LLM client error types.
//!
//! Every failure between "we have a prompt" and "we have completion text"
//! surfaces as an [`LlmError`].

/// Unified error type for the LLM client.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    /// An HTTP request to the provider failed or returned a non-success status.
    #[error("llm request failed: {reason}")]
    RequestFailed { reason: String },

    /// The provider response could not be parsed into the expected format.
    #[error("llm response parse error: {reason}")]
    ParseFailed { reason: String },

    /// The provider answered but the first candidate carried no text.
    #[error("no content in {provider} completion")]
    EmptyCompletion { provider: String },

    /// The API key is missing for a provider that requires one.
    #[error("missing api key for provider: {provider}")]
    MissingApiKey { provider: String },

    /// JSON serialization or deserialization failed.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience alias used throughout the llm crate.
pub type Result<T> = std::result::Result<T, LlmError>;

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        Self::RequestFailed {
            reason: err.to_string(),
        }
    }
}
