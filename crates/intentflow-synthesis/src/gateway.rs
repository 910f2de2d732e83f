//! One-shot flow generation through a chat backend.

use std::sync::Arc;

use tracing::{debug, info};

use intentflow_graph::CandidateGraph;
use intentflow_llm::{ChatBackend, ChatRequest, Message};

use crate::error::Result;
use crate::extract::extract_graph;
use crate::prompt::{SYSTEM_PROMPT, build_prompt};
use crate::request::IntentRequest;

/// Default model for flow generation.
pub const DEFAULT_MODEL: &str = "gpt-4.1-mini";

/// Default sampling temperature.  Low, because the output must be JSON.
pub const DEFAULT_TEMPERATURE: f32 = 0.2;

/// What one generation call produced.
#[derive(Debug, Clone)]
pub struct GeneratedFlow {
    /// Provider-assigned completion id, when the provider reports one.
    pub completion_id: Option<String>,
    /// Name of the backend that answered.
    pub provider: String,
    pub graph: CandidateGraph,
}

/// Sends prompts to a [`ChatBackend`] and extracts candidate graphs.
///
/// Exactly one backend call is made per [`generate_flow`](Self::generate_flow);
/// transient failures are returned to the caller as-is.
#[derive(Clone)]
pub struct FlowGateway {
    backend: Arc<dyn ChatBackend>,
    model: String,
    temperature: f32,
    max_tokens: Option<u32>,
}

impl FlowGateway {
    /// A gateway with the default model and temperature.
    pub fn new(backend: Arc<dyn ChatBackend>) -> Self {
        Self {
            backend,
            model: DEFAULT_MODEL.to_owned(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: None,
        }
    }

    /// Override the model.  An empty string defers to the backend default.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// The backend's provider name.
    pub fn provider_name(&self) -> &str {
        self.backend.provider_name()
    }

    /// The chat request that would be sent for `request`.
    pub fn build_request(&self, request: &IntentRequest) -> ChatRequest {
        ChatRequest {
            model: self.model.clone(),
            messages: vec![Message::system(SYSTEM_PROMPT), Message::user(build_prompt(request))],
            temperature: Some(self.temperature),
            max_tokens: self.max_tokens,
        }
    }

    /// Generate a candidate graph for `request`.
    pub async fn generate_flow(&self, request: &IntentRequest) -> Result<GeneratedFlow> {
        let chat = self.build_request(request);
        info!(
            provider = self.provider_name(),
            model = %chat.model,
            user_id = %request.user_id,
            "requesting flow generation"
        );

        let completion = self.backend.chat(&chat).await?;
        debug!(chars = completion.content.len(), "generator answered");

        let graph = extract_graph(&completion.content)?;
        Ok(GeneratedFlow {
            completion_id: completion.id,
            provider: self.provider_name().to_owned(),
            graph,
        })
    }
}

impl std::fmt::Debug for FlowGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FlowGateway")
            .field("provider", &self.provider_name())
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}
