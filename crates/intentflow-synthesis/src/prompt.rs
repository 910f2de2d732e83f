//! Prompt construction for flow generation.
//!
//! The prompt is a pure function of the request, so identical requests
//! always produce identical prompts.

use std::fmt::Write;

use intentflow_graph::{BlockCategory, BlockType};

use crate::request::IntentRequest;

/// System message sent with every generation request.
pub const SYSTEM_PROMPT: &str = "You are an automation architect returning strict JSON for mobile \
automation flows. You must never include explanations outside the JSON payload.";

const SCHEMA: &str = r#"{
  "graph": {
    "id": "unique_guid",
    "title": "Short Title",
    "blocks": [
      { "id": "b1", "type": "Type", "params": { "k": "v" } }
    ],
    "edges": [
      { "from": "b1", "to": "b2", "condition": "label" }
    ],
    "explanation": "One sentence summary",
    "risk_flags": []
  },
  "explanation": "Same summary as above",
  "risk_flags": []
}"#;

const CATEGORY_ORDER: [BlockCategory; 4] = [
    BlockCategory::Trigger,
    BlockCategory::Condition,
    BlockCategory::Action,
    BlockCategory::Utility,
];

/// Build the user prompt for `request`.
pub fn build_prompt(request: &IntentRequest) -> String {
    let ctx = &request.context;
    let mut out = String::with_capacity(2048);

    // Writing into a String cannot fail.
    let _ = writeln!(out, "User intent: {}", request.intent_text.trim());
    let _ = writeln!(out, "Capabilities available: {}", list_or_none(&ctx.capabilities));
    if !ctx.location_aliases.is_empty() {
        let _ = writeln!(out, "Known locations: {}", ctx.location_aliases.join(", "));
    }
    if let Some(window) = &ctx.time_window {
        let _ = writeln!(out, "Current local time: {} ({})", window.now, window.tz);
    }

    let _ = writeln!(out, "RETURN JSON ONLY. The JSON must match this EXACT structure:");
    let _ = writeln!(out, "{SCHEMA}");

    let _ = writeln!(out, "IMPORTANT:");
    let _ = writeln!(out, "1. Use 'blocks', NOT 'nodes'.");
    let _ = writeln!(
        out,
        "2. 'graph' object MUST contain 'id', 'title', 'blocks', 'edges', 'explanation'."
    );
    let _ = writeln!(out, "3. Use the exact block types listed below.");
    let _ = writeln!(
        out,
        "4. EVERY flow MUST start with a Trigger. For immediate commands, use \
         'ManualQuickTrigger' and link it to the first action."
    );

    let _ = writeln!(out, "AVAILABLE BLOCKS:");
    out.push_str(&render_catalog());

    let _ = writeln!(
        out,
        "Edges should reference block ids. Condition is optional (empty string if none)."
    );
    out
}

/// Render the block catalog grouped by category, one type per line.
pub fn render_catalog() -> String {
    let mut out = String::new();
    for (n, category) in CATEGORY_ORDER.iter().enumerate() {
        let _ = writeln!(out, "{}. {}:", n + 1, category);
        for block_type in BlockType::ALL.iter().filter(|t| t.category() == *category) {
            let hint = block_type.param_hint();
            if hint.is_empty() {
                let _ = writeln!(out, "   - {block_type}");
            } else {
                let _ = writeln!(out, "   - {block_type} (params: {hint})");
            }
        }
    }
    out
}

fn list_or_none(items: &[String]) -> String {
    if items.is_empty() {
        "none declared".to_owned()
    } else {
        items.join(", ")
    }
}
