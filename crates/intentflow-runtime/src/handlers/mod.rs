//! Standard block handlers.
//!
//! Conditions read [`FlowExecutionInput`] metadata, actions go through the
//! injected [`crate::Device`], utilities work on [`FlowExecutionState`].

mod actions;
mod conditions;
mod utility;

pub use actions::{
    CameraCaptureHandler, HttpWebhookHandler, LocationHandler, NotificationHandler,
    PlaySoundHandler, SetAlarmHandler, SmsHandler, ToggleWifiHandler,
};
pub use conditions::{
    ActivityRecognitionHandler, BatteryGuardHandler, BatteryLevelHandler, ContextMatchHandler,
    PedometerHandler, TimeWindowConditionHandler,
};
pub use utility::{BranchSelectorHandler, DelayHandler, VariableHandler};

use async_trait::async_trait;

use intentflow_graph::FlowBlock;

use crate::error::HandlerError;
use crate::handler::{FlowBlockHandler, FlowExecutionInput, FlowExecutionState, FlowStepResult};

/// Succeeds unconditionally with a fixed description.
///
/// Triggers have already fired by the time a flow executes, so there is
/// nothing to check.
#[derive(Debug, Clone)]
pub struct TriggerHandler {
    description: String,
}

impl TriggerHandler {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
        }
    }
}

#[async_trait]
impl FlowBlockHandler for TriggerHandler {
    async fn handle(
        &self,
        block: &FlowBlock,
        _input: &FlowExecutionInput,
        _state: &mut FlowExecutionState,
    ) -> Result<FlowStepResult, HandlerError> {
        Ok(FlowStepResult::success(block, self.description.clone()))
    }
}

/// Parse a numeric param, falling back to `default` when absent or invalid.
pub(crate) fn param_or<T: std::str::FromStr>(block: &FlowBlock, key: &str, default: T) -> T {
    block
        .param(key)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

/// Parse a numeric metadata value; `None` when absent or invalid.
pub(crate) fn metadata_number(input: &FlowExecutionInput, key: &str) -> Option<f64> {
    input.get(key).and_then(|v| v.trim().trim_end_matches('%').parse().ok())
}

/// Render a number without a trailing `.0`.
pub(crate) fn fmt_number(n: f64) -> String {
    if n.fract() == 0.0 {
        format!("{n:.0}")
    } else {
        n.to_string()
    }
}
