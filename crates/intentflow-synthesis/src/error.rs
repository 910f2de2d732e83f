//! Synthesis error types.

use intentflow_graph::ValidationError;
use intentflow_llm::LlmError;

/// Everything that can go wrong between an intent and a validated graph.
#[derive(Debug, thiserror::Error)]
pub enum SynthesisError {
    /// The request itself is unusable (e.g. blank intent text).
    #[error("invalid synthesis request: {reason}")]
    InvalidRequest { reason: String },

    /// The generator answered with something that is not a graph document.
    #[error("malformed generator response: {reason}")]
    MalformedResponse { reason: String },

    /// The decoded graph broke a structural rule.
    #[error("generated graph rejected: {0}")]
    Validation(#[from] ValidationError),

    /// The generator could not be reached or returned nothing usable.
    #[error(transparent)]
    Llm(#[from] LlmError),
}

/// Convenience alias used throughout the synthesis crate.
pub type Result<T> = std::result::Result<T, SynthesisError>;
