//! The synthesis entry point.
//!
//! With a gateway configured, intents go to the generator and the result is
//! validated.  Without one, every intent gets the same built-in demo flow so
//! the rest of the system can be exercised offline.

use chrono::{SecondsFormat, Utc};
use tracing::{info, warn};
use uuid::Uuid;

use intentflow_graph::{
    BlockType, CandidateResponse, FlowBlock, FlowEdge, FlowGraph, FlowGraphResponse,
    FlowValidator,
};

use crate::error::{Result, SynthesisError};
use crate::gateway::FlowGateway;
use crate::request::IntentRequest;

/// Turns intents into validated flow graphs.
#[derive(Debug, Clone)]
pub struct SynthesisService {
    gateway: Option<FlowGateway>,
    validator: FlowValidator,
}

impl SynthesisService {
    /// Create a service.  `None` means demo mode.
    pub fn new(gateway: Option<FlowGateway>) -> Self {
        Self {
            gateway,
            validator: FlowValidator::new(),
        }
    }

    /// Use a restricted validator instead of the full catalog.
    pub fn with_validator(mut self, validator: FlowValidator) -> Self {
        self.validator = validator;
        self
    }

    /// Whether requests are answered by the built-in demo flow.
    pub fn is_demo(&self) -> bool {
        self.gateway.is_none()
    }

    /// Synthesize a validated flow for `request`.
    pub async fn synthesize(&self, request: &IntentRequest) -> Result<FlowGraphResponse> {
        if request.intent_text.trim().is_empty() {
            return Err(SynthesisError::InvalidRequest {
                reason: "intent_text is blank".into(),
            });
        }

        let candidate = match &self.gateway {
            None => {
                info!(user_id = %request.user_id, "no generator configured, answering with demo flow");
                CandidateResponse::from(demo_flow())
            }
            Some(gateway) => {
                let generated = gateway.generate_flow(request).await?;
                let flow_id = generated
                    .completion_id
                    .unwrap_or_else(|| Uuid::now_v7().to_string());
                CandidateResponse {
                    flow_id,
                    graph: generated.graph,
                    explanation: format!(
                        "Generated via {} at {}",
                        generated.provider,
                        Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
                    ),
                    risk_flags: vec!["AI generated".to_owned()],
                }
            }
        };

        let response = self.validator.validate(&candidate).inspect_err(|e| {
            warn!(flow_id = %candidate.flow_id, error = %e, "synthesized graph rejected");
        })?;

        info!(
            flow_id = %response.flow_id,
            title = %response.graph.title,
            blocks = response.graph.blocks.len(),
            "flow synthesized"
        );
        Ok(response)
    }
}

/// The deterministic offline flow: walk a few steps, get photographed,
/// located and notified.
///
/// Ids are fresh per call; everything else is fixed.
pub fn demo_flow() -> FlowGraphResponse {
    let graph = FlowGraph {
        id: Uuid::now_v7().to_string(),
        title: "Intruder Alert".into(),
        blocks: vec![
            FlowBlock::new("trigger1", BlockType::ManualQuickTrigger)
                .with_param("label", "Start Security"),
            FlowBlock::new("condition1", BlockType::Pedometer).with_param("threshold", "5"),
            FlowBlock::new("action1", BlockType::Camera).with_param("lens", "front"),
            FlowBlock::new("action2", BlockType::Location).with_param("accuracy", "high"),
            FlowBlock::new("action3", BlockType::SendNotificationAction)
                .with_param("title", "Security Alert")
                .with_param("message", "Movement detected! Photo taken at location."),
        ],
        edges: vec![
            FlowEdge::new("trigger1", "condition1", "activate"),
            FlowEdge::new("condition1", "action1", "steps_detected"),
            FlowEdge::new("action1", "action2", "photo_saved"),
            FlowEdge::new("action2", "action3", "location_found"),
        ],
        explanation: "If you walk 5 steps, I'll take a selfie, tag your location, and notify you."
            .into(),
        risk_flags: vec!["Uses Camera".into(), "Tracks Location".into()],
    };

    FlowGraphResponse {
        flow_id: Uuid::now_v7().to_string(),
        graph,
        explanation: "Demo response: Security scenario with sensors.".into(),
        risk_flags: vec!["Demo mode".into()],
    }
}
