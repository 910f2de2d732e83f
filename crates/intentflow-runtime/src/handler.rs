//! The handler contract and the values that flow through an execution.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use intentflow_graph::FlowBlock;

use crate::error::HandlerError;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Outcome of one block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StepStatus {
    Success,
    Skipped,
    Failed,
}

impl std::fmt::Display for StepStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Success => write!(f, "SUCCESS"),
            Self::Skipped => write!(f, "SKIPPED"),
            Self::Failed => write!(f, "FAILED"),
        }
    }
}

/// What a handler reports for a block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowStepResult {
    pub block_id: String,
    pub status: StepStatus,
    pub message: String,
}

impl FlowStepResult {
    pub fn new(block_id: impl Into<String>, status: StepStatus, message: impl Into<String>) -> Self {
        Self {
            block_id: block_id.into(),
            status,
            message: message.into(),
        }
    }

    pub fn success(block: &FlowBlock, message: impl Into<String>) -> Self {
        Self::new(block.id.clone(), StepStatus::Success, message)
    }

    pub fn skipped(block: &FlowBlock, message: impl Into<String>) -> Self {
        Self::new(block.id.clone(), StepStatus::Skipped, message)
    }

    pub fn failed(block: &FlowBlock, message: impl Into<String>) -> Self {
        Self::new(block.id.clone(), StepStatus::Failed, message)
    }

    /// Success when `ok`, otherwise skipped.  The common condition outcome.
    pub fn pass_or_skip(block: &FlowBlock, ok: bool, message: impl Into<String>) -> Self {
        let status = if ok { StepStatus::Success } else { StepStatus::Skipped };
        Self::new(block.id.clone(), status, message)
    }
}

/// Runtime signals an execution is evaluated against.
///
/// Keys conventionally used by the standard handlers: `local_time`,
/// `battery_percent`, `context`, `trigger`, `step_count`, `activity`,
/// `activity_confidence`, `location`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowExecutionInput {
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

impl FlowExecutionInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).map(String::as_str)
    }
}

impl FromIterator<(String, String)> for FlowExecutionInput {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            metadata: iter.into_iter().collect(),
        }
    }
}

/// Variables shared between the blocks of a single execution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlowExecutionState {
    variables: BTreeMap<String, String>,
}

impl FlowExecutionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.variables.get(key).map(String::as_str)
    }

    /// Set a variable, returning the previous value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.variables.insert(key.into(), value.into())
    }

    pub fn variables(&self) -> &BTreeMap<String, String> {
        &self.variables
    }

    /// Replace every `{{name}}` in `template` with the variable's value.
    ///
    /// Unknown names are left as written.
    pub fn interpolate(&self, template: &str) -> String {
        let mut out = String::with_capacity(template.len());
        let mut rest = template;
        while let Some(start) = rest.find("{{") {
            let Some(len) = rest[start + 2..].find("}}") else {
                break;
            };
            let name = rest[start + 2..start + 2 + len].trim();
            out.push_str(&rest[..start]);
            match self.get(name) {
                Some(value) => out.push_str(value),
                None => out.push_str(&rest[start..start + 4 + len]),
            }
            rest = &rest[start + 4 + len..];
        }
        out.push_str(rest);
        out
    }
}

/// The ordered trace of one execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowExecutionResult {
    pub graph_id: String,
    /// Results in visitation order.
    pub steps: Vec<FlowStepResult>,
}

impl FlowExecutionResult {
    /// The result for `block_id`, if that block ran.
    pub fn step(&self, block_id: &str) -> Option<&FlowStepResult> {
        self.steps.iter().find(|s| s.block_id == block_id)
    }

    /// Number of steps with `status`.
    pub fn count(&self, status: StepStatus) -> usize {
        self.steps.iter().filter(|s| s.status == status).count()
    }
}

// ---------------------------------------------------------------------------
// Handler trait
// ---------------------------------------------------------------------------

/// Executes blocks of one (or more) types.
///
/// Logical outcomes go in the returned [`FlowStepResult`]; an `Err` aborts
/// the entire run.
#[async_trait]
pub trait FlowBlockHandler: Send + Sync {
    async fn handle(
        &self,
        block: &FlowBlock,
        input: &FlowExecutionInput,
        state: &mut FlowExecutionState,
    ) -> std::result::Result<FlowStepResult, HandlerError>;
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
