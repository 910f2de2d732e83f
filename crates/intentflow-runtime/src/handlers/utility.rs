//! Utility handlers: delays, variables, branch labels.

use std::time::Duration;

use async_trait::async_trait;

use intentflow_graph::{BlockType, FlowBlock};

use super::param_or;
use crate::error::HandlerError;
use crate::handler::{FlowBlockHandler, FlowExecutionInput, FlowExecutionState, FlowStepResult};

type HandlerResult = Result<FlowStepResult, HandlerError>;

/// Sleeps for `millis` (0).
#[derive(Debug, Default, Clone, Copy)]
pub struct DelayHandler;

#[async_trait]
impl FlowBlockHandler for DelayHandler {
    async fn handle(
        &self,
        block: &FlowBlock,
        _input: &FlowExecutionInput,
        _state: &mut FlowExecutionState,
    ) -> HandlerResult {
        let millis: u64 = param_or(block, "millis", 0);
        if millis > 0 {
            tokio::time::sleep(Duration::from_millis(millis)).await;
        }
        Ok(FlowStepResult::success(block, format!("Delayed for {millis} ms")))
    }
}

/// Serves both `SetVariableAction` (stores `value` under `key`) and
/// `GetVariableBlock` (reports the value under `key`).
#[derive(Debug, Default, Clone, Copy)]
pub struct VariableHandler;

#[async_trait]
impl FlowBlockHandler for VariableHandler {
    async fn handle(
        &self,
        block: &FlowBlock,
        _input: &FlowExecutionInput,
        state: &mut FlowExecutionState,
    ) -> HandlerResult {
        let Some(key) = block.param("key").filter(|k| !k.trim().is_empty()) else {
            return Ok(FlowStepResult::failed(block, "Missing key"));
        };
        let result = match block.block_type {
            BlockType::SetVariableAction => {
                let value = state.interpolate(block.param("value").unwrap_or_default());
                state.set(key, value);
                FlowStepResult::success(block, format!("Set {key}"))
            }
            BlockType::GetVariableBlock => FlowStepResult::success(
                block,
                format!("Value for {key} = {}", state.get(key).unwrap_or("null")),
            ),
            _ => FlowStepResult::skipped(block, "Unsupported variable op"),
        };
        Ok(result)
    }
}

/// Reports the selected `route`.  Routing itself is expressed by edges.
#[derive(Debug, Default, Clone, Copy)]
pub struct BranchSelectorHandler;

#[async_trait]
impl FlowBlockHandler for BranchSelectorHandler {
    async fn handle(
        &self,
        block: &FlowBlock,
        _input: &FlowExecutionInput,
        _state: &mut FlowExecutionState,
    ) -> HandlerResult {
        let route = block.param("route").unwrap_or("default");
        Ok(FlowStepResult::success(block, format!("Branch evaluated ({route})")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::StepStatus;

    async fn run(handler: &dyn FlowBlockHandler, block: FlowBlock, state: &mut FlowExecutionState) -> FlowStepResult {
        handler
            .handle(&block, &FlowExecutionInput::new(), state)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn set_then_get() {
        let mut state = FlowExecutionState::new();
        let set = FlowBlock::new("s", BlockType::SetVariableAction)
            .with_param("key", "mood")
            .with_param("value", "calm");
        assert_eq!(run(&VariableHandler, set, &mut state).await.message, "Set mood");
        assert_eq!(state.get("mood"), Some("calm"));

        let get = FlowBlock::new("g", BlockType::GetVariableBlock).with_param("key", "mood");
        assert_eq!(run(&VariableHandler, get, &mut state).await.message, "Value for mood = calm");

        let unset = FlowBlock::new("g", BlockType::GetVariableBlock).with_param("key", "other");
        assert_eq!(run(&VariableHandler, unset, &mut state).await.message, "Value for other = null");
    }

    #[tokio::test]
    async fn variable_without_key_fails() {
        let r = run(
            &VariableHandler,
            FlowBlock::new("s", BlockType::SetVariableAction),
            &mut FlowExecutionState::new(),
        )
        .await;
        assert_eq!((r.status, r.message.as_str()), (StepStatus::Failed, "Missing key"));
    }

    #[tokio::test(start_paused = true)]
    async fn delay_waits() {
        let block = FlowBlock::new("d", BlockType::DelayAction).with_param("millis", "1500");
        let before = tokio::time::Instant::now();
        let r = run(&DelayHandler, block, &mut FlowExecutionState::new()).await;
        assert_eq!(r.message, "Delayed for 1500 ms");
        assert!(before.elapsed() >= Duration::from_millis(1500));
    }

    #[tokio::test]
    async fn branch_selector_route() {
        let mut state = FlowExecutionState::new();
        let r = run(&BranchSelectorHandler, FlowBlock::new("b", BlockType::BranchSelector), &mut state).await;
        assert_eq!(r.message, "Branch evaluated (default)");
        let r = run(
            &BranchSelectorHandler,
            FlowBlock::new("b", BlockType::BranchSelector).with_param("route", "night"),
            &mut state,
        )
        .await;
        assert_eq!(r.message, "Branch evaluated (night)");
    }
}
