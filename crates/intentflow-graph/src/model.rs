//! Typed flow graph model.
//!
//! These are the trusted shapes: every block type is a catalog entry and the
//! graph has passed [`crate::FlowValidator`] (or was built in code).  Field
//! names on the wire are snake_case; unknown fields are ignored on decode.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::block::{BlockCategory, BlockType};

// ---------------------------------------------------------------------------
// Block
// ---------------------------------------------------------------------------

/// One node of a flow graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowBlock {
    /// Unique within the graph.
    pub id: String,

    /// Catalog type, which also fixes the block's category.
    #[serde(rename = "type")]
    pub block_type: BlockType,

    /// Type-specific parameters.  Only the consuming handler interprets them.
    #[serde(default, deserialize_with = "lenient_params")]
    pub params: BTreeMap<String, String>,
}

impl FlowBlock {
    /// Create a block with no parameters.
    pub fn new(id: impl Into<String>, block_type: BlockType) -> Self {
        Self {
            id: id.into(),
            block_type,
            params: BTreeMap::new(),
        }
    }

    /// Add a parameter.
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// The category of this block's type.
    pub fn category(&self) -> BlockCategory {
        self.block_type.category()
    }

    /// Look up a parameter by key.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }
}

// ---------------------------------------------------------------------------
// Edge
// ---------------------------------------------------------------------------

/// A directed link between two blocks.
///
/// `condition` is a descriptive label for humans and the generator; the
/// engine never evaluates it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowEdge {
    pub from: String,
    pub to: String,
    #[serde(default)]
    pub condition: String,
}

impl FlowEdge {
    pub fn new(from: impl Into<String>, to: impl Into<String>, condition: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            condition: condition.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Graph
// ---------------------------------------------------------------------------

/// A complete automation definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowGraph {
    pub id: String,
    pub title: String,
    pub blocks: Vec<FlowBlock>,
    pub edges: Vec<FlowEdge>,
    pub explanation: String,
    /// Free-text capability warnings ("Uses Camera", ...).
    #[serde(default)]
    pub risk_flags: Vec<String>,
}

impl FlowGraph {
    /// Find a block by id.
    pub fn block(&self, id: &str) -> Option<&FlowBlock> {
        self.blocks.iter().find(|b| b.id == id)
    }

    /// Trigger blocks in declaration order.
    pub fn triggers(&self) -> impl Iterator<Item = &FlowBlock> {
        self.blocks
            .iter()
            .filter(|b| b.category() == BlockCategory::Trigger)
    }

    /// Outgoing edges of a block in declaration order.
    pub fn outgoing<'a>(&'a self, block_id: &'a str) -> impl Iterator<Item = &'a FlowEdge> + 'a {
        self.edges.iter().filter(move |e| e.from == block_id)
    }
}

// ---------------------------------------------------------------------------
// Synthesis response
// ---------------------------------------------------------------------------

/// A validated synthesis result as returned to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowGraphResponse {
    pub flow_id: String,
    pub graph: FlowGraph,
    pub explanation: String,
    #[serde(default)]
    pub risk_flags: Vec<String>,
}

// ---------------------------------------------------------------------------
// Parameter decoding
// ---------------------------------------------------------------------------

/// Decode a parameter map, coercing scalar values to strings.
///
/// Generators regularly emit `"threshold": 5` or `"enable": true` even when
/// told every value is a string.  `null` entries are dropped and an explicit
/// `"params": null` yields an empty map.
pub(crate) fn lenient_params<'de, D>(deserializer: D) -> Result<BTreeMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<BTreeMap<String, Value>>::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .filter_map(|(key, value)| match value {
            Value::Null => None,
            Value::String(s) => Some((key, s)),
            other => Some((key, other.to_string())),
        })
        .collect())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
