//! Untrusted graph shapes.
//!
//! Generator output decodes into these before anything else happens.  Block
//! types stay as raw text and missing ids/endpoints decode as empty strings
//! so that [`crate::FlowValidator`] can report exactly which rule a graph
//! breaks instead of surfacing a generic decode error.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::{FlowBlock, FlowEdge, FlowGraph, FlowGraphResponse, lenient_params};

/// A block whose type has not been checked against the catalog yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateBlock {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "type", default)]
    pub block_type: String,
    #[serde(default, deserialize_with = "lenient_params")]
    pub params: BTreeMap<String, String>,
}

/// An edge whose endpoints have not been checked yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateEdge {
    #[serde(default)]
    pub from: String,
    #[serde(default)]
    pub to: String,
    #[serde(default)]
    pub condition: String,
}

/// A graph as decoded from generator output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateGraph {
    pub id: String,
    pub title: String,
    pub blocks: Vec<CandidateBlock>,
    pub edges: Vec<CandidateEdge>,
    pub explanation: String,
    #[serde(default)]
    pub risk_flags: Vec<String>,
}

/// A synthesis response awaiting validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateResponse {
    pub flow_id: String,
    pub graph: CandidateGraph,
    pub explanation: String,
    #[serde(default)]
    pub risk_flags: Vec<String>,
}

// ---------------------------------------------------------------------------
// Conversions from typed values
// ---------------------------------------------------------------------------

impl From<FlowBlock> for CandidateBlock {
    fn from(block: FlowBlock) -> Self {
        Self {
            id: block.id,
            block_type: block.block_type.name().to_owned(),
            params: block.params,
        }
    }
}

impl From<FlowEdge> for CandidateEdge {
    fn from(edge: FlowEdge) -> Self {
        Self {
            from: edge.from,
            to: edge.to,
            condition: edge.condition,
        }
    }
}

impl From<FlowGraph> for CandidateGraph {
    fn from(graph: FlowGraph) -> Self {
        Self {
            id: graph.id,
            title: graph.title,
            blocks: graph.blocks.into_iter().map(Into::into).collect(),
            edges: graph.edges.into_iter().map(Into::into).collect(),
            explanation: graph.explanation,
            risk_flags: graph.risk_flags,
        }
    }
}

impl From<FlowGraphResponse> for CandidateResponse {
    fn from(response: FlowGraphResponse) -> Self {
        Self {
            flow_id: response.flow_id,
            graph: response.graph.into(),
            explanation: response.explanation,
            risk_flags: response.risk_flags,
        }
    }
}
