//! LLM access for intentflow.
//!
//! A thin, non-streaming chat client for the OpenAI Chat Completions API
//! (and compatible endpoints) and the Anthropic Messages API, plus the
//! [`ChatBackend`] trait that the synthesis layer talks to.

pub mod backend;
pub mod client;
pub mod error;
pub mod types;

pub use backend::ChatBackend;
pub use client::{LlmClient, LlmClientConfig, LlmProvider};
pub use error::{LlmError, Result};
pub use types::{ChatRequest, Completion, Message, Role};
