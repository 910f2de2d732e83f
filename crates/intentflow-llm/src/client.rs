//! Multi-provider LLM client.
//!
//! Supports the **OpenAI Chat Completions API** (including OpenAI-compatible
//! endpoints such as Ollama, Together, and vLLM) and the **Anthropic
//! Messages API**, non-streaming only.  Flow synthesis needs one complete
//! JSON document per request, so there is nothing to gain from SSE here.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde_json::{Value, json};

use crate::backend::ChatBackend;
use crate::error::{LlmError, Result};
use crate::types::{ChatRequest, Completion, Message, Role};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Default OpenAI API base URL.
const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Default Anthropic API base URL.
const ANTHROPIC_BASE_URL: &str = "https://api.anthropic.com";

/// Anthropic API version header value.
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Default request timeout.
const DEFAULT_TIMEOUT_SECS: u64 = 120;

// ---------------------------------------------------------------------------
// Provider enum
// ---------------------------------------------------------------------------

/// Identifies which LLM provider the client should target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmProvider {
    /// OpenAI Chat Completions API (also covers OpenAI-compatible endpoints).
    OpenAI,
    /// Anthropic Messages API.
    Anthropic,
}

impl LlmProvider {
    /// Lowercase provider name used in logs, errors and config files.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::OpenAI => "openai",
            Self::Anthropic => "anthropic",
        }
    }
}

impl std::fmt::Display for LlmProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for LlmProvider {
    type Err = LlmError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openai" => Ok(Self::OpenAI),
            "anthropic" => Ok(Self::Anthropic),
            other => Err(LlmError::RequestFailed {
                reason: format!("unknown provider `{other}`"),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Client configuration
// ---------------------------------------------------------------------------

/// Configuration for connecting to a single LLM provider endpoint.
#[derive(Debug, Clone)]
pub struct LlmClientConfig {
    /// Which provider this configuration targets.
    pub provider: LlmProvider,
    /// API key for authentication.
    pub api_key: String,
    /// Base URL for the API.
    pub base_url: String,
    /// Default model identifier.
    pub default_model: String,
    /// Default maximum tokens per response.
    pub max_tokens: u32,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl LlmClientConfig {
    /// Create a configuration for the OpenAI API.
    pub fn openai(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            provider: LlmProvider::OpenAI,
            api_key: api_key.into(),
            base_url: OPENAI_BASE_URL.to_owned(),
            default_model: model.into(),
            max_tokens: 2048,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Create a configuration for any OpenAI-compatible API.
    pub fn openai_compatible(
        api_key: impl Into<String>,
        model: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::openai(api_key, model)
        }
    }

    /// Create a configuration for the Anthropic Messages API.
    pub fn anthropic(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            provider: LlmProvider::Anthropic,
            api_key: api_key.into(),
            base_url: ANTHROPIC_BASE_URL.to_owned(),
            default_model: model.into(),
            max_tokens: 2048,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// An LLM client for either the OpenAI or the Anthropic API.
///
/// Cheap to clone; clones share the HTTP connection pool.
#[derive(Debug, Clone)]
pub struct LlmClient {
    config: Arc<LlmClientConfig>,
    http: reqwest::Client,
}

impl LlmClient {
    /// Create a new client with the given configuration.
    pub fn new(config: LlmClientConfig) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            return Err(LlmError::MissingApiKey {
                provider: config.provider.as_str().into(),
            });
        }

        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| LlmError::RequestFailed {
                reason: format!("failed to build HTTP client: {e}"),
            })?;

        Ok(Self {
            config: Arc::new(config),
            http,
        })
    }

    /// The provider this client targets.
    pub fn provider(&self) -> LlmProvider {
        self.config.provider
    }

    /// The model used when a request leaves `model` empty.
    pub fn default_model(&self) -> &str {
        &self.config.default_model
    }

    /// Send a chat request and return the first completion.
    pub async fn complete(&self, request: &ChatRequest) -> Result<Completion> {
        let (resp, provider) = match self.config.provider {
            LlmProvider::OpenAI => {
                let body = self.build_openai_request_body(request);
                (self.send_openai_request(&body).await?, LlmProvider::OpenAI)
            }
            LlmProvider::Anthropic => {
                let body = self.build_anthropic_request_body(request);
                (self.send_anthropic_request(&body).await?, LlmProvider::Anthropic)
            }
        };

        let status = resp.status();
        let text = resp.text().await.map_err(|e| LlmError::RequestFailed {
            reason: format!("failed to read response body: {e}"),
        })?;

        if !status.is_success() {
            return Err(LlmError::RequestFailed {
                reason: format!("API returned {status}: {text}"),
            });
        }

        let v: Value = serde_json::from_str(&text).map_err(|e| LlmError::ParseFailed {
            reason: format!("invalid JSON response: {e}"),
        })?;

        let completion = match provider {
            LlmProvider::OpenAI => parse_openai_response(&v)?,
            LlmProvider::Anthropic => parse_anthropic_response(&v)?,
        };

        tracing::debug!(
            provider = %provider,
            completion_id = completion.id.as_deref().unwrap_or("-"),
            chars = completion.content.len(),
            "received completion"
        );

        Ok(completion)
    }

    fn model_for<'a>(&'a self, request: &'a ChatRequest) -> &'a str {
        if request.model.is_empty() {
            &self.config.default_model
        } else {
            &request.model
        }
    }

    // =======================================================================
    // OpenAI
    // =======================================================================

    /// Build the JSON body for the OpenAI Chat Completions API.
    fn build_openai_request_body(&self, request: &ChatRequest) -> Value {
        let mut body = json!({
            "model": self.model_for(request),
            "max_tokens": request.max_tokens.unwrap_or(self.config.max_tokens),
            "messages": messages_to_openai(&request.messages),
        });

        if let Some(temp) = request.temperature {
            body["temperature"] = json!(temp);
        }

        body
    }

    async fn send_openai_request(&self, body: &Value) -> Result<reqwest::Response> {
        let url = format!("{}/chat/completions", self.config.base_url);

        let mut headers = HeaderMap::new();
        let auth_value = format!("Bearer {}", self.config.api_key);
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&auth_value).map_err(|e| LlmError::RequestFailed {
                reason: format!("invalid authorization header: {e}"),
            })?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        tracing::debug!(url = %url, model = %body["model"], provider = "openai", "sending LLM request");

        self.http
            .post(&url)
            .headers(headers)
            .json(body)
            .send()
            .await
            .map_err(|e| LlmError::RequestFailed {
                reason: e.to_string(),
            })
    }

    // =======================================================================
    // Anthropic
    // =======================================================================

    /// Build the JSON body for the Anthropic Messages API.
    fn build_anthropic_request_body(&self, request: &ChatRequest) -> Value {
        let (system_text, messages) = messages_to_anthropic(&request.messages);

        let mut body = json!({
            "model": self.model_for(request),
            "max_tokens": request.max_tokens.unwrap_or(self.config.max_tokens),
            "messages": messages,
        });

        if let Some(system) = system_text {
            body["system"] = json!(system);
        }

        if let Some(temp) = request.temperature {
            body["temperature"] = json!(temp);
        }

        body
    }

    async fn send_anthropic_request(&self, body: &Value) -> Result<reqwest::Response> {
        let url = format!("{}/v1/messages", self.config.base_url);

        let mut headers = HeaderMap::new();
        headers.insert(
            "x-api-key",
            HeaderValue::from_str(&self.config.api_key).map_err(|e| LlmError::RequestFailed {
                reason: format!("invalid API key header: {e}"),
            })?,
        );
        headers.insert("anthropic-version", HeaderValue::from_static(ANTHROPIC_VERSION));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        tracing::debug!(url = %url, model = %body["model"], provider = "anthropic", "sending LLM request");

        self.http
            .post(&url)
            .headers(headers)
            .json(body)
            .send()
            .await
            .map_err(|e| LlmError::RequestFailed {
                reason: e.to_string(),
            })
    }
}

#[async_trait]
impl ChatBackend for LlmClient {
    fn provider_name(&self) -> &str {
        self.config.provider.as_str()
    }

    async fn chat(&self, request: &ChatRequest) -> Result<Completion> {
        self.complete(request).await
    }
}

// ===========================================================================
// Format conversion (free functions)
// ===========================================================================

/// Convert messages to the OpenAI wire format (system messages inline).
pub fn messages_to_openai(messages: &[Message]) -> Vec<Value> {
    messages
        .iter()
        .map(|msg| {
            let role = match msg.role {
                Role::System => "system",
                Role::User => "user",
                Role::Assistant => "assistant",
            };
            json!({ "role": role, "content": msg.content })
        })
        .collect()
}

/// Split system messages out (Anthropic expects a top-level `system` field)
/// and convert the rest.
fn messages_to_anthropic(messages: &[Message]) -> (Option<String>, Vec<Value>) {
    let mut system: Option<String> = None;
    let mut wire_messages: Vec<Value> = Vec::with_capacity(messages.len());

    for msg in messages {
        match msg.role {
            Role::System => match &mut system {
                Some(existing) => {
                    existing.push('\n');
                    existing.push_str(&msg.content);
                }
                None => system = Some(msg.content.clone()),
            },
            Role::User => wire_messages.push(json!({ "role": "user", "content": msg.content })),
            Role::Assistant => {
                wire_messages.push(json!({ "role": "assistant", "content": msg.content }))
            }
        }
    }

    (system, wire_messages)
}

/// Parse a non-streaming OpenAI Chat Completions response.
///
/// Only the first choice is considered.
pub fn parse_openai_response(v: &Value) -> Result<Completion> {
    let message = &v["choices"][0]["message"];

    if message.is_null() {
        return Err(LlmError::ParseFailed {
            reason: "missing `choices[0].message` in response".into(),
        });
    }

    let content = message["content"].as_str().unwrap_or_default();
    if content.trim().is_empty() {
        return Err(LlmError::EmptyCompletion {
            provider: "openai".into(),
        });
    }

    Ok(Completion {
        id: v["id"].as_str().map(str::to_owned),
        model: v["model"].as_str().map(str::to_owned),
        content: content.to_owned(),
    })
}

/// Parse a non-streaming Anthropic Messages response, joining text blocks.
pub fn parse_anthropic_response(v: &Value) -> Result<Completion> {
    let blocks = v["content"].as_array().ok_or_else(|| LlmError::ParseFailed {
        reason: "missing `content` array in response".into(),
    })?;

    let content: String = blocks
        .iter()
        .filter(|b| b["type"].as_str() == Some("text"))
        .filter_map(|b| b["text"].as_str())
        .collect();

    if content.trim().is_empty() {
        return Err(LlmError::EmptyCompletion {
            provider: "anthropic".into(),
        });
    }

    Ok(Completion {
        id: v["id"].as_str().map(str::to_owned),
        model: v["model"].as_str().map(str::to_owned),
        content,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
