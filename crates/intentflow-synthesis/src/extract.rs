//! Recovering a candidate graph from raw generator text.
//!
//! Generators wrap JSON in markdown fences, prepend chatter, or nest the
//! graph under a `graph` key.  Extraction undoes exactly those habits and
//! nothing more; structural problems are left for the validator.

use serde_json::Value;
use tracing::debug;

use intentflow_graph::CandidateGraph;

use crate::error::{Result, SynthesisError};

/// Extract a [`CandidateGraph`] from generator output.
pub fn extract_graph(raw: &str) -> Result<CandidateGraph> {
    let value = extract_json(raw)?;
    let mut object = match value {
        Value::Object(map) => map,
        other => {
            return Err(SynthesisError::MalformedResponse {
                reason: format!("expected a JSON object, got {}", kind(&other)),
            });
        }
    };

    let graph = match object.remove("graph") {
        Some(inner) => {
            debug!("unwrapping nested `graph` object");
            inner
        }
        None => Value::Object(object),
    };

    serde_json::from_value(graph).map_err(|e| SynthesisError::MalformedResponse {
        reason: format!("not a flow graph: {e}"),
    })
}

/// Parse the JSON document embedded in `raw`.
///
/// Fences are stripped first.  If the remainder still does not parse, the
/// slice from the first `{` to the last `}` is tried.
pub fn extract_json(raw: &str) -> Result<Value> {
    let cleaned = strip_fences(raw);

    let first_err = match serde_json::from_str::<Value>(cleaned) {
        Ok(v) => return Ok(v),
        Err(e) => e,
    };

    if let (Some(start), Some(end)) = (cleaned.find('{'), cleaned.rfind('}'))
        && start < end
        && let Ok(v) = serde_json::from_str::<Value>(&cleaned[start..=end])
    {
        debug!(skipped = cleaned.len() - (end + 1 - start), "recovered JSON from surrounding text");
        return Ok(v);
    }

    Err(SynthesisError::MalformedResponse {
        reason: format!("no parseable JSON object: {first_err}"),
    })
}

fn strip_fences(raw: &str) -> &str {
    let cleaned = raw.trim();
    let cleaned = cleaned.strip_prefix("```json").unwrap_or(cleaned);
    let cleaned = cleaned.strip_prefix("```").unwrap_or(cleaned);
    let cleaned = cleaned.strip_suffix("```").unwrap_or(cleaned);
    cleaned.trim()
}

fn kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GRAPH: &str = r#"{"id":"g","title":"Beep","blocks":[{"id":"t","type":"ManualQuickTrigger"}],"edges":[],"explanation":"beeps"}"#;

    #[test]
    fn plain_json() {
        let graph = extract_graph(GRAPH).unwrap();
        assert_eq!(graph.title, "Beep");
        assert_eq!(graph.blocks[0].block_type, "ManualQuickTrigger");
    }

    #[test]
    fn fenced_json_with_whitespace() {
        let raw = format!("\n  ```json\n{GRAPH}\n```  \n");
        assert_eq!(extract_graph(&raw).unwrap(), extract_graph(GRAPH).unwrap());
    }

    #[test]
    fn bare_fence_without_language() {
        let raw = format!("```\n{GRAPH}\n```");
        assert!(extract_graph(&raw).is_ok());
    }

    #[test]
    fn prose_around_json() {
        let raw = format!("Sure! Here is your flow:\n{GRAPH}\nLet me know if you need changes.");
        assert_eq!(extract_graph(&raw).unwrap().id, "g");
    }

    #[test]
    fn fenced_json_inside_prose() {
        let raw = format!("Here you go:\n```json\n{GRAPH}\n```\nEnjoy.");
        assert_eq!(extract_json(&raw).unwrap(), extract_json(GRAPH).unwrap());
    }

    #[test]
    fn nested_graph_is_unwrapped() {
        let raw = format!(r#"{{"graph":{GRAPH},"explanation":"outer","risk_flags":[]}}"#);
        assert_eq!(extract_graph(&raw).unwrap().explanation, "beeps");
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let raw = r#"{"id":"g","title":"t","blocks":[],"edges":[],"explanation":"e","confidence":0.9}"#;
        assert!(extract_graph(raw).is_ok());
    }

    #[test]
    fn no_json_is_malformed() {
        let err = extract_graph("I cannot help with that.").unwrap_err();
        assert!(matches!(err, SynthesisError::MalformedResponse { .. }));
    }

    #[test]
    fn non_object_is_malformed() {
        let err = extract_graph("[1, 2, 3]").unwrap_err();
        assert!(err.to_string().contains("an array"));
    }

    #[test]
    fn nodes_instead_of_blocks_is_malformed() {
        let raw = r#"{"id":"g","title":"t","nodes":[],"edges":[],"explanation":"e"}"#;
        assert!(matches!(
            extract_graph(raw),
            Err(SynthesisError::MalformedResponse { .. })
        ));
    }
}
