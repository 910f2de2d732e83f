//! Application configuration.
//!
//! Values come from an optional TOML or JSON file, then environment
//! variables override them:
//!
//! | variable | field |
//! |---|---|
//! | `INTENTFLOW_PROVIDER` | `llm.provider` |
//! | `INTENTFLOW_MODEL` | `llm.model` |
//! | `INTENTFLOW_BASE_URL` | `llm.base_url` |
//! | `OPENAI_API_KEY` / `ANTHROPIC_API_KEY` | `llm.api_key` (for the selected provider) |
//! | `INTENTFLOW_GATE_CONDITIONS` | `engine.gate_conditions` |
//!
//! A missing or blank API key selects demo mode.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use intentflow_llm::{LlmClient, LlmClientConfig, LlmProvider};
use intentflow_runtime::EngineConfig;
use intentflow_synthesis::{DEFAULT_MODEL, DEFAULT_TEMPERATURE, FlowGateway};

/// Model used for Anthropic when none is configured.
const DEFAULT_ANTHROPIC_MODEL: &str = "claude-3-5-haiku-latest";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub llm: LlmSettings,
    pub engine: EngineSettings,
}

/// Generator connection settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmSettings {
    /// `openai` (also for compatible endpoints) or `anthropic`.
    pub provider: String,
    pub model: Option<String>,
    /// Override for OpenAI-compatible servers.
    pub base_url: Option<String>,
    pub api_key: Option<String>,
    pub temperature: f32,
    pub max_tokens: Option<u32>,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            provider: "openai".into(),
            model: None,
            base_url: None,
            api_key: None,
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    pub gate_conditions: bool,
}

impl AppConfig {
    /// Load from `path` (if any), then apply the process environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(p) => Self::from_file(p)?,
            None => Self::default(),
        };
        config.apply_env_from(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Parse a config file; `.json` files are JSON, everything else TOML.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;

        let config = if path.extension().and_then(|s| s.to_str()) == Some("json") {
            serde_json::from_str(&content)
                .with_context(|| format!("failed to parse JSON config {}", path.display()))?
        } else {
            toml::from_str(&content)
                .with_context(|| format!("failed to parse TOML config {}", path.display()))?
        };

        info!(path = %path.display(), "configuration loaded from file");
        Ok(config)
    }

    /// Apply overrides from `lookup` (normally `std::env::var`).
    pub fn apply_env_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let non_blank = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(provider) = non_blank("INTENTFLOW_PROVIDER") {
            self.llm.provider = provider;
        }
        if let Some(model) = non_blank("INTENTFLOW_MODEL") {
            self.llm.model = Some(model);
        }
        if let Some(base_url) = non_blank("INTENTFLOW_BASE_URL") {
            self.llm.base_url = Some(base_url);
        }

        let key_var = match self.llm.provider.trim().to_ascii_lowercase().as_str() {
            "anthropic" => "ANTHROPIC_API_KEY",
            _ => "OPENAI_API_KEY",
        };
        if let Some(key) = non_blank(key_var) {
            self.llm.api_key = Some(key);
        }

        if let Some(flag) = non_blank("INTENTFLOW_GATE_CONDITIONS") {
            match parse_bool(&flag) {
                Some(b) => self.engine.gate_conditions = b,
                None => warn!(value = %flag, "ignoring unrecognised INTENTFLOW_GATE_CONDITIONS"),
            }
        }
    }

    /// Engine policy from these settings.
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            gate_conditions: self.engine.gate_conditions,
        }
    }

    /// The generator to use, or `None` for demo mode.
    pub fn build_gateway(&self) -> Result<Option<FlowGateway>> {
        let Some(api_key) = self.llm.api_key.as_deref().filter(|k| !k.trim().is_empty()) else {
            info!("no API key configured, synthesis runs in demo mode");
            return Ok(None);
        };

        let provider: LlmProvider = self
            .llm
            .provider
            .parse()
            .with_context(|| format!("invalid llm.provider `{}`", self.llm.provider))?;

        let model = self.llm.model.clone().unwrap_or_else(|| match provider {
            LlmProvider::OpenAI => DEFAULT_MODEL.to_owned(),
            LlmProvider::Anthropic => DEFAULT_ANTHROPIC_MODEL.to_owned(),
        });

        let mut client_config = match (provider, &self.llm.base_url) {
            (LlmProvider::OpenAI, Some(url)) => {
                LlmClientConfig::openai_compatible(api_key, model.clone(), url.clone())
            }
            (LlmProvider::OpenAI, None) => LlmClientConfig::openai(api_key, model.clone()),
            (LlmProvider::Anthropic, base_url) => {
                let mut c = LlmClientConfig::anthropic(api_key, model.clone());
                if let Some(url) = base_url {
                    c.base_url = url.clone();
                }
                c
            }
        };
        if let Some(max) = self.llm.max_tokens {
            client_config.max_tokens = max;
        }

        if !(0.0..=2.0).contains(&self.llm.temperature) {
            bail!("llm.temperature must be within 0.0..=2.0, got {}", self.llm.temperature);
        }

        let client = LlmClient::new(client_config).context("failed to create LLM client")?;
        let mut gateway = FlowGateway::new(Arc::new(client))
            .with_model(model)
            .with_temperature(self.llm.temperature);
        if let Some(max) = self.llm.max_tokens {
            gateway = gateway.with_max_tokens(max);
        }

        info!(provider = %provider, "LLM gateway configured");
        Ok(Some(gateway))
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
