//! Integration tests for the intentflow-runtime crate.
//!
//! Graphs are decoded from wire JSON and run through the standard registry
//! over a dry-run device.

use std::sync::Arc;

use intentflow_graph::{FlowGraph, FlowValidator};
use intentflow_runtime::{
    EngineConfig, FlowEngine, FlowExecutionInput, HandlerRegistry, LoggingDevice, StepStatus,
};
use serde_json::json;

// ═══════════════════════════════════════════════════════════════════════
//  Helpers
// ═══════════════════════════════════════════════════════════════════════

fn engine() -> FlowEngine {
    FlowEngine::new(HandlerRegistry::standard(Arc::new(LoggingDevice::new())))
}

fn gated_engine() -> FlowEngine {
    FlowEngine::with_config(
        HandlerRegistry::standard(Arc::new(LoggingDevice::new())),
        EngineConfig { gate_conditions: true },
    )
}

fn decode(v: serde_json::Value) -> FlowGraph {
    let graph: FlowGraph = serde_json::from_value(v).expect("graph should decode");
    FlowValidator::new().validate_graph(&graph).expect("graph should be valid");
    graph
}

// ═══════════════════════════════════════════════════════════════════════
//  Scenarios
// ═══════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn trigger_then_sound() {
    let graph = decode(json!({
        "id": "g", "title": "Beep", "explanation": "beep",
        "blocks": [
            {"id": "t", "type": "ManualQuickTrigger"},
            {"id": "a", "type": "PlaySoundAction"}
        ],
        "edges": [{"from": "t", "to": "a", "condition": "always"}]
    }));

    let result = engine().execute(&graph, &FlowExecutionInput::new()).await.unwrap();
    assert_eq!(result.steps.len(), 2);
    assert_eq!(result.steps[0].block_id, "t");
    assert_eq!(result.steps[0].status, StepStatus::Success);
    assert_eq!(result.steps[1].block_id, "a");
    assert_eq!(result.steps[1].status, StepStatus::Success);
    assert_eq!(result.steps[1].message, "Sound played");
}

#[tokio::test]
async fn office_hours_window_outside() {
    let graph = decode(json!({
        "id": "g", "title": "Office", "explanation": "office hours only",
        "blocks": [
            {"id": "t", "type": "TimeScheduleTrigger", "params": {"time": "20:00"}},
            {"id": "w", "type": "TimeWindowCondition", "params": {"start": "09:00", "end": "17:00"}},
            {"id": "n", "type": "SendNotificationAction"}
        ],
        "edges": [
            {"from": "t", "to": "w"},
            {"from": "w", "to": "n"}
        ]
    }));
    let input = FlowExecutionInput::new().with("local_time", "2026-10-16T20:00:00+02:00");

    let result = engine().execute(&graph, &input).await.unwrap();
    let w = result.step("w").unwrap();
    assert_eq!(w.status, StepStatus::Skipped);
    assert!(w.message.contains("09:00-17:00"));
    assert!(result.step("n").is_some(), "default policy keeps going");

    let gated = gated_engine().execute(&graph, &input).await.unwrap();
    assert!(gated.step("n").is_none());
}

#[tokio::test]
async fn two_triggers_share_one_action() {
    let graph = decode(json!({
        "id": "g", "title": "Shared", "explanation": "",
        "blocks": [
            {"id": "t1", "type": "ManualQuickTrigger"},
            {"id": "t2", "type": "LocationExitTrigger", "params": {"geofence": "home"}},
            {"id": "wifi", "type": "ToggleWifiAction", "params": {"enable": "false"}}
        ],
        "edges": [
            {"from": "t1", "to": "wifi"},
            {"from": "t2", "to": "wifi"}
        ]
    }));
    let result = engine().execute(&graph, &FlowExecutionInput::new()).await.unwrap();
    let wifi_steps = result.steps.iter().filter(|s| s.block_id == "wifi").count();
    assert_eq!(wifi_steps, 1);
    assert_eq!(result.steps.len(), 3);
}

#[tokio::test]
async fn intruder_alert_flow_runs_end_to_end() {
    let graph = decode(json!({
        "id": "demo", "title": "Intruder Alert", "explanation": "",
        "blocks": [
            {"id": "trigger1", "type": "ManualQuickTrigger", "params": {"label": "Start Security"}},
            {"id": "condition1", "type": "Pedometer", "params": {"threshold": 5}},
            {"id": "action1", "type": "Camera", "params": {"lens": "front"}},
            {"id": "action2", "type": "Location", "params": {"accuracy": "high"}},
            {"id": "action3", "type": "SendNotificationAction",
             "params": {"title": "Security Alert", "message": "Photo {{last_photo}} at {{last_location}}"}}
        ],
        "edges": [
            {"from": "trigger1", "to": "condition1", "condition": "activate"},
            {"from": "condition1", "to": "action1", "condition": "steps_detected"},
            {"from": "action1", "to": "action2", "condition": "photo_saved"},
            {"from": "action2", "to": "action3", "condition": "location_found"}
        ]
    }));
    let input = FlowExecutionInput::new().with("step_count", "12");

    let result = gated_engine().execute(&graph, &input).await.unwrap();
    assert_eq!(result.count(StepStatus::Success), 5);
    assert!(result.step("action1").unwrap().message.starts_with("Photo saved: IMG_"));

    let idle = gated_engine()
        .execute(&graph, &FlowExecutionInput::new().with("step_count", "2"))
        .await
        .unwrap();
    assert_eq!(idle.steps.len(), 2);
}

#[tokio::test]
async fn variables_flow_between_blocks() {
    let graph = decode(json!({
        "id": "g", "title": "Vars", "explanation": "",
        "blocks": [
            {"id": "t", "type": "ManualQuickTrigger"},
            {"id": "set", "type": "SetVariableAction", "params": {"key": "mode", "value": "night"}},
            {"id": "get", "type": "GetVariableBlock", "params": {"key": "mode"}},
            {"id": "route", "type": "BranchSelector", "params": {"route": "night"}}
        ],
        "edges": [
            {"from": "t", "to": "set"},
            {"from": "set", "to": "get"},
            {"from": "get", "to": "route"}
        ]
    }));
    let result = engine().execute(&graph, &FlowExecutionInput::new()).await.unwrap();
    assert_eq!(result.step("get").unwrap().message, "Value for mode = night");
    assert_eq!(result.step("route").unwrap().message, "Branch evaluated (night)");
}

#[tokio::test]
async fn result_serializes_for_callers() {
    let graph = decode(json!({
        "id": "g", "title": "t", "explanation": "",
        "blocks": [{"id": "t", "type": "ManualQuickTrigger"}],
        "edges": []
    }));
    let result = engine().execute(&graph, &FlowExecutionInput::new()).await.unwrap();
    let v = serde_json::to_value(&result).unwrap();
    assert_eq!(v["graph_id"], "g");
    assert_eq!(v["steps"][0]["status"], "SUCCESS");
    assert_eq!(v["steps"][0]["message"], "Manual trigger fired");
}
