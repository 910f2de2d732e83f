//! Condition handlers.  Each one evaluates execution metadata and reports
//! SUCCESS when the condition holds, SKIPPED otherwise.

use async_trait::async_trait;
use chrono::NaiveTime;

use intentflow_graph::FlowBlock;

use super::{fmt_number, metadata_number, param_or};
use crate::error::HandlerError;
use crate::handler::{FlowBlockHandler, FlowExecutionInput, FlowExecutionState, FlowStepResult};

type HandlerResult = Result<FlowStepResult, HandlerError>;

// ---------------------------------------------------------------------------
// Time window
// ---------------------------------------------------------------------------

/// `start`..=`end` against the `local_time` metadata.
///
/// A window whose end is before its start wraps past midnight
/// (`22:00`-`06:00`).
#[derive(Debug, Default, Clone, Copy)]
pub struct TimeWindowConditionHandler;

#[async_trait]
impl FlowBlockHandler for TimeWindowConditionHandler {
    async fn handle(
        &self,
        block: &FlowBlock,
        input: &FlowExecutionInput,
        _state: &mut FlowExecutionState,
    ) -> HandlerResult {
        let Some(raw_now) = input.get("local_time") else {
            return Ok(FlowStepResult::skipped(block, "Missing local time metadata"));
        };
        let start_text = block.param("start").unwrap_or("00:00");
        let end_text = block.param("end").unwrap_or("23:59");

        let Some(now) = parse_local_time(raw_now) else {
            return Ok(FlowStepResult::failed(block, format!("Unparseable local time '{raw_now}'")));
        };
        let Some(start) = parse_hh_mm(start_text) else {
            return Ok(FlowStepResult::failed(block, format!("Invalid window start '{start_text}'")));
        };
        let Some(end) = parse_hh_mm(end_text) else {
            return Ok(FlowStepResult::failed(block, format!("Invalid window end '{end_text}'")));
        };

        let within = if start <= end {
            start <= now && now <= end
        } else {
            now >= start || now <= end
        };

        let message = if within {
            format!("Within {start_text}-{end_text} window")
        } else {
            format!("Outside window {start_text}-{end_text}")
        };
        Ok(FlowStepResult::pass_or_skip(block, within, message))
    }
}

fn parse_hh_mm(text: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(text.trim(), "%H:%M").ok()
}

/// Accepts `HH:MM`, `HH:MM:SS`, or any ISO-8601 datetime whose characters
/// 11..16 are the wall-clock `HH:MM` (`2026-10-16T08:30:00+02:00`).
fn parse_local_time(text: &str) -> Option<NaiveTime> {
    let text = text.trim();
    parse_hh_mm(text)
        .or_else(|| NaiveTime::parse_from_str(text, "%H:%M:%S").ok())
        .or_else(|| text.get(11..16).and_then(parse_hh_mm))
}

// ---------------------------------------------------------------------------
// Battery
// ---------------------------------------------------------------------------

/// Passes unless `battery_percent` is known and below `minPercent` (30).
#[derive(Debug, Default, Clone, Copy)]
pub struct BatteryGuardHandler;

#[async_trait]
impl FlowBlockHandler for BatteryGuardHandler {
    async fn handle(
        &self,
        block: &FlowBlock,
        input: &FlowExecutionInput,
        _state: &mut FlowExecutionState,
    ) -> HandlerResult {
        let threshold: f64 = param_or(block, "minPercent", 30.0);
        let result = match metadata_number(input, "battery_percent") {
            None => FlowStepResult::success(block, "Battery OK (unknown%)"),
            Some(p) if p >= threshold => {
                FlowStepResult::success(block, format!("Battery OK ({}%)", fmt_number(p)))
            }
            Some(p) => FlowStepResult::skipped(block, format!("Battery too low ({}%)", fmt_number(p))),
        };
        Ok(result)
    }
}

/// `battery_percent` within `minLevel`..=`maxLevel` (0..=100).
#[derive(Debug, Default, Clone, Copy)]
pub struct BatteryLevelHandler;

#[async_trait]
impl FlowBlockHandler for BatteryLevelHandler {
    async fn handle(
        &self,
        block: &FlowBlock,
        input: &FlowExecutionInput,
        _state: &mut FlowExecutionState,
    ) -> HandlerResult {
        let min: f64 = param_or(block, "minLevel", 0.0);
        let max: f64 = param_or(block, "maxLevel", 100.0);
        let (min_s, max_s) = (fmt_number(min), fmt_number(max));

        let Some(level) = metadata_number(input, "battery_percent") else {
            return Ok(FlowStepResult::skipped(block, "Battery level unknown"));
        };
        let ok = (min..=max).contains(&level);
        let message = if ok {
            format!("Battery within range {min_s}-{max_s}")
        } else {
            format!("Battery outside range {min_s}-{max_s}")
        };
        Ok(FlowStepResult::pass_or_skip(block, ok, message))
    }
}

// ---------------------------------------------------------------------------
// Context
// ---------------------------------------------------------------------------

/// Case-insensitive substring match of `value` against the `context`
/// metadata.
#[derive(Debug, Default, Clone, Copy)]
pub struct ContextMatchHandler;

#[async_trait]
impl FlowBlockHandler for ContextMatchHandler {
    async fn handle(
        &self,
        block: &FlowBlock,
        input: &FlowExecutionInput,
        _state: &mut FlowExecutionState,
    ) -> HandlerResult {
        let Some(target) = block.param("value").map(str::to_lowercase) else {
            return Ok(FlowStepResult::skipped(block, "No target context"));
        };
        let actual = input.get("context").map(str::to_lowercase);
        let matches = actual.as_deref().is_some_and(|a| a.contains(&target));
        let message = if matches {
            format!("Context matched '{target}'")
        } else {
            format!("Context '{}' != '{target}'", actual.as_deref().unwrap_or("none"))
        };
        Ok(FlowStepResult::pass_or_skip(block, matches, message))
    }
}

// ---------------------------------------------------------------------------
// Sensors
// ---------------------------------------------------------------------------

/// `step_count` metadata reaching `threshold` (10).
#[derive(Debug, Default, Clone, Copy)]
pub struct PedometerHandler;

#[async_trait]
impl FlowBlockHandler for PedometerHandler {
    async fn handle(
        &self,
        block: &FlowBlock,
        input: &FlowExecutionInput,
        _state: &mut FlowExecutionState,
    ) -> HandlerResult {
        let threshold: u64 = param_or(block, "threshold", 10);
        let Some(steps) = input.get("step_count").and_then(|v| v.trim().parse::<u64>().ok()) else {
            return Ok(FlowStepResult::skipped(block, "Step count unavailable"));
        };
        let ok = steps >= threshold;
        let message = if ok {
            format!("{steps} steps detected (threshold {threshold})")
        } else {
            format!("Only {steps} steps (threshold {threshold})")
        };
        Ok(FlowStepResult::pass_or_skip(block, ok, message))
    }
}

/// `activity` metadata equal to `type`, with `activity_confidence` of at
/// least `confidence` (50).  A missing confidence counts as certain.
#[derive(Debug, Default, Clone, Copy)]
pub struct ActivityRecognitionHandler;

#[async_trait]
impl FlowBlockHandler for ActivityRecognitionHandler {
    async fn handle(
        &self,
        block: &FlowBlock,
        input: &FlowExecutionInput,
        _state: &mut FlowExecutionState,
    ) -> HandlerResult {
        let wanted = block.param("type").unwrap_or("WALKING").trim().to_uppercase();
        let min_confidence: f64 = param_or(block, "confidence", 50.0);

        let Some(actual) = input.get("activity").map(|a| a.trim().to_uppercase()) else {
            return Ok(FlowStepResult::skipped(block, "Activity unavailable"));
        };
        let confidence = metadata_number(input, "activity_confidence").unwrap_or(100.0);

        let result = if actual != wanted {
            FlowStepResult::skipped(block, format!("Activity {actual} != {wanted}"))
        } else if confidence < min_confidence {
            FlowStepResult::skipped(
                block,
                format!("{actual} confidence {} below {}", fmt_number(confidence), fmt_number(min_confidence)),
            )
        } else {
            FlowStepResult::success(block, format!("{actual} detected ({}%)", fmt_number(confidence)))
        };
        Ok(result)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::StepStatus;
    use intentflow_graph::BlockType;

    async fn run(handler: &dyn FlowBlockHandler, block: FlowBlock, input: FlowExecutionInput) -> FlowStepResult {
        handler
            .handle(&block, &input, &mut FlowExecutionState::new())
            .await
            .unwrap()
    }

    fn window(start: &str, end: &str) -> FlowBlock {
        FlowBlock::new("w", BlockType::TimeWindowCondition)
            .with_param("start", start)
            .with_param("end", end)
    }

    #[tokio::test]
    async fn time_window_inside_and_outside() {
        let inside = FlowExecutionInput::new().with("local_time", "2026-10-16T10:15:00+02:00");
        let r = run(&TimeWindowConditionHandler, window("09:00", "17:00"), inside).await;
        assert_eq!(r.status, StepStatus::Success);
        assert_eq!(r.message, "Within 09:00-17:00 window");

        let outside = FlowExecutionInput::new().with("local_time", "2026-10-16T20:00:00");
        let r = run(&TimeWindowConditionHandler, window("09:00", "17:00"), outside).await;
        assert_eq!(r.status, StepStatus::Skipped);
        assert_eq!(r.message, "Outside window 09:00-17:00");
    }

    #[tokio::test]
    async fn time_window_edges_are_inclusive() {
        for t in ["09:00", "17:00"] {
            let input = FlowExecutionInput::new().with("local_time", t);
            let r = run(&TimeWindowConditionHandler, window("09:00", "17:00"), input).await;
            assert_eq!(r.status, StepStatus::Success, "{t}");
        }
    }

    #[tokio::test]
    async fn time_window_wraps_midnight() {
        let late = FlowExecutionInput::new().with("local_time", "23:30");
        let early = FlowExecutionInput::new().with("local_time", "05:59:59");
        let noon = FlowExecutionInput::new().with("local_time", "12:00");
        assert_eq!(run(&TimeWindowConditionHandler, window("22:00", "06:00"), late).await.status, StepStatus::Success);
        assert_eq!(run(&TimeWindowConditionHandler, window("22:00", "06:00"), early).await.status, StepStatus::Success);
        assert_eq!(run(&TimeWindowConditionHandler, window("22:00", "06:00"), noon).await.status, StepStatus::Skipped);
    }

    #[tokio::test]
    async fn time_window_missing_and_garbage() {
        let block = FlowBlock::new("w", BlockType::TimeWindowCondition);
        let r = run(&TimeWindowConditionHandler, block.clone(), FlowExecutionInput::new()).await;
        assert_eq!(r.status, StepStatus::Skipped);
        assert_eq!(r.message, "Missing local time metadata");

        let r = run(&TimeWindowConditionHandler, block, FlowExecutionInput::new().with("local_time", "soon")).await;
        assert_eq!(r.status, StepStatus::Failed);

        let r = run(&TimeWindowConditionHandler, window("9am", "17:00"), FlowExecutionInput::new().with("local_time", "10:00")).await;
        assert_eq!(r.status, StepStatus::Failed);
        assert!(r.message.contains("9am"));
    }

    #[tokio::test]
    async fn battery_guard() {
        let block = FlowBlock::new("b", BlockType::BatteryGuardCondition).with_param("minPercent", "20");
        let low = run(&BatteryGuardHandler, block.clone(), FlowExecutionInput::new().with("battery_percent", "15")).await;
        assert_eq!((low.status, low.message.as_str()), (StepStatus::Skipped, "Battery too low (15%)"));

        let ok = run(&BatteryGuardHandler, block.clone(), FlowExecutionInput::new().with("battery_percent", "20")).await;
        assert_eq!((ok.status, ok.message.as_str()), (StepStatus::Success, "Battery OK (20%)"));

        let unknown = run(&BatteryGuardHandler, block, FlowExecutionInput::new()).await;
        assert_eq!(unknown.status, StepStatus::Success);
    }

    #[tokio::test]
    async fn battery_guard_default_threshold() {
        let block = FlowBlock::new("b", BlockType::BatteryGuardCondition);
        let r = run(&BatteryGuardHandler, block, FlowExecutionInput::new().with("battery_percent", "29")).await;
        assert_eq!(r.status, StepStatus::Skipped);
    }

    #[tokio::test]
    async fn battery_level_range() {
        let block = FlowBlock::new("b", BlockType::BatteryLevelCondition)
            .with_param("minLevel", "15")
            .with_param("maxLevel", "80");
        let r = run(&BatteryLevelHandler, block.clone(), FlowExecutionInput::new().with("battery_percent", "50")).await;
        assert_eq!((r.status, r.message.as_str()), (StepStatus::Success, "Battery within range 15-80"));
        let r = run(&BatteryLevelHandler, block.clone(), FlowExecutionInput::new().with("battery_percent", "90")).await;
        assert_eq!(r.status, StepStatus::Skipped);
        let r = run(&BatteryLevelHandler, block, FlowExecutionInput::new()).await;
        assert_eq!(r.status, StepStatus::Skipped);
    }

    #[tokio::test]
    async fn context_match() {
        let block = FlowBlock::new("c", BlockType::ContextMatchCondition).with_param("value", "Driving");
        let r = run(&ContextMatchHandler, block.clone(), FlowExecutionInput::new().with("context", "user is DRIVING home")).await;
        assert_eq!(r.status, StepStatus::Success);
        assert_eq!(r.message, "Context matched 'driving'");

        let r = run(&ContextMatchHandler, block, FlowExecutionInput::new()).await;
        assert_eq!(r.status, StepStatus::Skipped);

        let r = run(&ContextMatchHandler, FlowBlock::new("c", BlockType::ContextMatchCondition), FlowExecutionInput::new()).await;
        assert_eq!(r.message, "No target context");
    }

    #[tokio::test]
    async fn pedometer_threshold() {
        let block = FlowBlock::new("p", BlockType::Pedometer).with_param("threshold", "5");
        let r = run(&PedometerHandler, block.clone(), FlowExecutionInput::new().with("step_count", "5")).await;
        assert_eq!(r.status, StepStatus::Success);
        let r = run(&PedometerHandler, block.clone(), FlowExecutionInput::new().with("step_count", "4")).await;
        assert_eq!(r.status, StepStatus::Skipped);
        let r = run(&PedometerHandler, block, FlowExecutionInput::new()).await;
        assert_eq!(r.message, "Step count unavailable");
    }

    #[tokio::test]
    async fn activity_recognition() {
        let block = FlowBlock::new("a", BlockType::ActivityRecognition)
            .with_param("type", "running")
            .with_param("confidence", "70");
        let input = FlowExecutionInput::new()
            .with("activity", "RUNNING")
            .with("activity_confidence", "85");
        assert_eq!(run(&ActivityRecognitionHandler, block.clone(), input).await.status, StepStatus::Success);

        let unsure = FlowExecutionInput::new()
            .with("activity", "running")
            .with("activity_confidence", "40");
        assert_eq!(run(&ActivityRecognitionHandler, block.clone(), unsure).await.status, StepStatus::Skipped);

        let still = FlowExecutionInput::new().with("activity", "STILL");
        let r = run(&ActivityRecognitionHandler, block, still).await;
        assert_eq!(r.message, "Activity STILL != RUNNING");
    }
}
