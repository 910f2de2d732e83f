//! Shared helpers for the CLI subcommands.

use std::path::Path;

use anyhow::{Context, Result, bail};
use serde_json::Value;
use tracing_subscriber::EnvFilter;

use intentflow_graph::{
    BlockCategory, BlockType, CandidateGraph, CandidateResponse, FlowGraph, FlowValidator,
};
use intentflow_runtime::{FlowExecutionInput, FlowExecutionResult};

// ---------------------------------------------------------------------------
// Tracing
// ---------------------------------------------------------------------------

/// Initialise the global tracing subscriber.
///
/// Respects `RUST_LOG`; falls back to `default_level`.  Logs go to stderr
/// so stdout stays machine-readable.
pub fn init_tracing(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

// ---------------------------------------------------------------------------
// Flow files
// ---------------------------------------------------------------------------

/// Read and validate a flow file.
///
/// Accepts a full synthesis response (`{"flow_id", "graph", ...}`) or a bare
/// graph.
pub fn load_flow_file(path: &Path, validator: &FlowValidator) -> Result<FlowGraph> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    parse_flow(&text, validator).with_context(|| format!("invalid flow file {}", path.display()))
}

/// Parse and validate flow JSON text.
pub fn parse_flow(text: &str, validator: &FlowValidator) -> Result<FlowGraph> {
    let value: Value = serde_json::from_str(text).context("not valid JSON")?;
    if !value.is_object() {
        bail!("expected a JSON object");
    }

    if value.get("graph").is_some() {
        let response: CandidateResponse =
            serde_json::from_value(value).context("not a synthesis response")?;
        Ok(validator.validate(&response)?.graph)
    } else {
        let graph: CandidateGraph = serde_json::from_value(value).context("not a flow graph")?;
        Ok(validator.validate_candidate_graph(&graph)?)
    }
}

// ---------------------------------------------------------------------------
// Execution input
// ---------------------------------------------------------------------------

/// Build execution input from `key=value` pairs.
pub fn parse_meta(pairs: &[String]) -> Result<FlowExecutionInput> {
    pairs
        .iter()
        .map(|pair| -> Result<(String, String)> {
            let (key, value) = pair
                .split_once('=')
                .with_context(|| format!("metadata `{pair}` is not key=value"))?;
            let key = key.trim();
            if key.is_empty() {
                bail!("metadata `{pair}` has an empty key");
            }
            Ok((key.to_owned(), value.trim().to_owned()))
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

/// The catalog as a printable table.
pub fn render_catalog() -> String {
    let mut out = String::new();
    for category in [
        BlockCategory::Trigger,
        BlockCategory::Condition,
        BlockCategory::Action,
        BlockCategory::Utility,
    ] {
        out.push_str(&format!("{category}\n"));
        for t in BlockType::ALL.iter().filter(|t| t.category() == category) {
            let hint = match t.param_hint() {
                "" => "-",
                h => h,
            };
            out.push_str(&format!("  {:<24} {hint}\n", t.name()));
        }
    }
    out
}

/// A step trace as printable lines.
pub fn render_result(result: &FlowExecutionResult) -> String {
    let mut out = String::new();
    for (n, step) in result.steps.iter().enumerate() {
        out.push_str(&format!(
            "{:>3}. {:<16} {:<8} {}\n",
            n + 1,
            step.block_id,
            step.status.to_string(),
            step.message
        ));
    }
    out
}
