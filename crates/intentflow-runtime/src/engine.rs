//! Flow graph execution.
//!
//! The engine walks a validated graph depth-first from its entry points and
//! runs each reachable block's handler at most once.  Traversal is driven by
//! an explicit work stack, so each visit is one awaited handler call in
//! pre-order and no recursion across `.await` is needed.
//!
//! Policy knobs live in [`EngineConfig`]:
//!
//! - by default every outgoing edge is followed whatever a block reported;
//! - with `gate_conditions`, a CONDITION block that does not report SUCCESS
//!   stops traversal through it.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use intentflow_graph::{BlockCategory, FlowBlock, FlowGraph};

use crate::error::{EngineError, Result};
use crate::handler::{
    FlowExecutionInput, FlowExecutionResult, FlowExecutionState, FlowStepResult, StepStatus,
};
use crate::registry::HandlerRegistry;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Traversal policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Prune the outgoing edges of condition blocks that did not succeed.
    #[serde(default)]
    pub gate_conditions: bool,
}

/// Where a run is.  Only ever logged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionPhase {
    Pending,
    Running,
    Complete,
}

impl std::fmt::Display for ExecutionPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Running => write!(f, "running"),
            Self::Complete => write!(f, "complete"),
        }
    }
}

/// Receives each step result as soon as it exists.
///
/// Closures `FnMut(&FlowStepResult) + Send` implement this.
pub trait StepObserver: Send {
    fn on_step(&mut self, step: &FlowStepResult);
}

impl<F> StepObserver for F
where
    F: FnMut(&FlowStepResult) + Send,
{
    fn on_step(&mut self, step: &FlowStepResult) {
        self(step)
    }
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Executes flow graphs against a handler registry.
///
/// Holds no per-run state, so one engine can serve concurrent runs behind
/// an `Arc`.
#[derive(Debug, Clone)]
pub struct FlowEngine {
    registry: HandlerRegistry,
    config: EngineConfig,
}

impl FlowEngine {
    /// An engine with the default (non-gating) policy.
    pub fn new(registry: HandlerRegistry) -> Self {
        Self::with_config(registry, EngineConfig::default())
    }

    pub fn with_config(registry: HandlerRegistry, config: EngineConfig) -> Self {
        Self { registry, config }
    }

    pub fn config(&self) -> EngineConfig {
        self.config
    }

    pub fn registry(&self) -> &HandlerRegistry {
        &self.registry
    }

    /// Run `graph` once and return the step trace.
    pub async fn execute(
        &self,
        graph: &FlowGraph,
        input: &FlowExecutionInput,
    ) -> Result<FlowExecutionResult> {
        self.execute_with_observer(graph, input, |_: &FlowStepResult| {})
            .await
    }

    /// Like [`execute`](Self::execute), but reports every step to `observer`
    /// before moving on.  If a handler error aborts the run, the observer
    /// has still seen everything that ran before it.
    pub async fn execute_with_observer(
        &self,
        graph: &FlowGraph,
        input: &FlowExecutionInput,
        mut observer: impl StepObserver,
    ) -> Result<FlowExecutionResult> {
        let mut phase = ExecutionPhase::Pending;
        debug!(graph_id = %graph.id, %phase, "execution created");

        let index: HashMap<&str, &FlowBlock> =
            graph.blocks.iter().map(|b| (b.id.as_str(), b)).collect();
        let mut visited: HashSet<&str> = HashSet::with_capacity(graph.blocks.len());
        let mut state = FlowExecutionState::new();
        let mut steps = Vec::with_capacity(graph.blocks.len());

        let mut stack: Vec<&FlowBlock> = entry_points(graph);
        stack.reverse();

        phase = ExecutionPhase::Running;
        info!(
            graph_id = %graph.id,
            title = %graph.title,
            entries = stack.len(),
            gate_conditions = self.config.gate_conditions,
            %phase,
            "executing flow"
        );

        while let Some(block) = stack.pop() {
            if !visited.insert(block.id.as_str()) {
                continue;
            }

            let Some(handler) = self.registry.get(block.block_type) else {
                debug!(block_id = %block.id, block_type = %block.block_type, "no handler, branch ends");
                continue;
            };

            let step = handler
                .handle(block, input, &mut state)
                .await
                .map_err(|source| {
                    warn!(block_id = %block.id, error = %source, "handler error aborted run");
                    EngineError::Handler {
                        block_id: block.id.clone(),
                        block_type: block.block_type,
                        source,
                    }
                })?;

            debug!(
                block_id = %block.id,
                block_type = %block.block_type,
                status = %step.status,
                message = %step.message,
                "block executed"
            );
            observer.on_step(&step);

            let follow = !(self.config.gate_conditions
                && block.category() == BlockCategory::Condition
                && step.status != StepStatus::Success);
            steps.push(step);

            if !follow {
                debug!(block_id = %block.id, "condition not met, pruning children");
                continue;
            }

            let children: Vec<&FlowBlock> = graph
                .outgoing(&block.id)
                .filter_map(|edge| {
                    let next = index.get(edge.to.as_str()).copied();
                    if next.is_none() {
                        warn!(from = %edge.from, to = %edge.to, "edge target missing, ignored");
                    }
                    next
                })
                .collect();
            stack.extend(children.into_iter().rev());
        }

        phase = ExecutionPhase::Complete;
        info!(
            graph_id = %graph.id,
            steps = steps.len(),
            succeeded = steps.iter().filter(|s| s.status == StepStatus::Success).count(),
            %phase,
            "flow finished"
        );

        Ok(FlowExecutionResult {
            graph_id: graph.id.clone(),
            steps,
        })
    }
}

/// Triggers in declaration order, or else the first block.
fn entry_points(graph: &FlowGraph) -> Vec<&FlowBlock> {
    let triggers: Vec<&FlowBlock> = graph.triggers().collect();
    if triggers.is_empty() {
        graph.blocks.first().into_iter().collect()
    } else {
        triggers
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
