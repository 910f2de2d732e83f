//! Structural acceptance gate for flow graphs.
//!
//! Rules are checked in a fixed order and the first violation wins:
//!
//! 1. every block has a non-blank id, and its type is in the allow-list
//!    (checked block by block), and ids are unique;
//! 2. every edge's `from` and `to` reference an existing block;
//! 3. at least one block is a trigger.
//!
//! The validator never repairs anything.

use std::collections::{BTreeSet, HashSet};
use std::str::FromStr;

use tracing::{debug, warn};

use crate::block::{BlockType, BlockCategory};
use crate::candidate::{CandidateGraph, CandidateResponse};
use crate::error::{Result, ValidationError};
use crate::model::{FlowBlock, FlowEdge, FlowGraph, FlowGraphResponse};

/// Checks graphs against the structural rules and the type allow-list.
#[derive(Debug, Clone)]
pub struct FlowValidator {
    allowed: BTreeSet<BlockType>,
}

impl FlowValidator {
    /// A validator that accepts the whole catalog.
    pub fn new() -> Self {
        Self {
            allowed: BlockType::ALL.into_iter().collect(),
        }
    }

    /// A validator restricted to the given types.
    ///
    /// Useful when the embedding device only supports part of the catalog.
    pub fn with_allowed(types: impl IntoIterator<Item = BlockType>) -> Self {
        Self {
            allowed: types.into_iter().collect(),
        }
    }

    /// Whether `block_type` passes the allow-list.
    pub fn allows(&self, block_type: BlockType) -> bool {
        self.allowed.contains(&block_type)
    }

    /// Validate a candidate response and produce its typed form.
    pub fn validate(&self, response: &CandidateResponse) -> Result<FlowGraphResponse> {
        let graph = self.validate_candidate_graph(&response.graph)?;
        Ok(FlowGraphResponse {
            flow_id: response.flow_id.clone(),
            graph,
            explanation: response.explanation.clone(),
            risk_flags: response.risk_flags.clone(),
        })
    }

    /// Validate a candidate graph and produce its typed form.
    pub fn validate_candidate_graph(&self, graph: &CandidateGraph) -> Result<FlowGraph> {
        self.check(
            graph
                .blocks
                .iter()
                .map(|b| (b.id.as_str(), b.block_type.as_str())),
            graph.edges.iter().map(|e| (e.from.as_str(), e.to.as_str())),
        )?;

        let blocks = graph
            .blocks
            .iter()
            .map(|b| {
                let block_type = self.parse_allowed(&b.id, &b.block_type)?;
                Ok(FlowBlock {
                    id: b.id.clone(),
                    block_type,
                    params: b.params.clone(),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let edges = graph
            .edges
            .iter()
            .map(|e| FlowEdge::new(e.from.clone(), e.to.clone(), e.condition.clone()))
            .collect();

        debug!(
            graph_id = %graph.id,
            blocks = graph.blocks.len(),
            edges = graph.edges.len(),
            "graph passed validation"
        );

        Ok(FlowGraph {
            id: graph.id.clone(),
            title: graph.title.clone(),
            blocks,
            edges,
            explanation: graph.explanation.clone(),
            risk_flags: graph.risk_flags.clone(),
        })
    }

    /// Validate an already-typed graph, e.g. one loaded from storage.
    pub fn validate_graph(&self, graph: &FlowGraph) -> Result<()> {
        self.check(
            graph.blocks.iter().map(|b| (b.id.as_str(), b.block_type.name())),
            graph.edges.iter().map(|e| (e.from.as_str(), e.to.as_str())),
        )
    }

    // -----------------------------------------------------------------------
    // Rules
    // -----------------------------------------------------------------------

    fn check<'a>(
        &self,
        blocks: impl Iterator<Item = (&'a str, &'a str)>,
        edges: impl Iterator<Item = (&'a str, &'a str)>,
    ) -> Result<()> {
        let mut ids: HashSet<&str> = HashSet::new();
        let mut has_trigger = false;

        for (index, (id, type_name)) in blocks.enumerate() {
            if id.trim().is_empty() {
                return Err(ValidationError::BlankBlockId { index });
            }
            self.parse_allowed(id, type_name)?;
            if !ids.insert(id) {
                return Err(ValidationError::DuplicateBlockId {
                    block_id: id.to_owned(),
                });
            }
            has_trigger |= names_trigger(type_name);
        }

        for (from, to) in edges {
            if !ids.contains(from) {
                return Err(ValidationError::DanglingEdgeSource {
                    from: from.to_owned(),
                    to: to.to_owned(),
                });
            }
            if !ids.contains(to) {
                return Err(ValidationError::DanglingEdgeTarget {
                    from: from.to_owned(),
                    to: to.to_owned(),
                });
            }
        }

        if !has_trigger {
            warn!("graph rejected: no trigger blocks");
            return Err(ValidationError::NoTrigger);
        }

        Ok(())
    }

    fn parse_allowed(&self, block_id: &str, type_name: &str) -> Result<BlockType> {
        BlockType::from_str(type_name)
            .ok()
            .filter(|t| self.allows(*t))
            .ok_or_else(|| ValidationError::UnsupportedBlockType {
                block_id: block_id.to_owned(),
                block_type: type_name.to_owned(),
            })
    }
}

impl Default for FlowValidator {
    fn default() -> Self {
        Self::new()
    }
}

/// Whether a textual type names a trigger.
///
/// The catalog category is authoritative; the substring match only matters
/// for text that does not parse as a catalog entry.
fn names_trigger(type_name: &str) -> bool {
    match BlockType::from_str(type_name) {
        Ok(t) => t.category() == BlockCategory::Trigger,
        Err(_) => type_name.to_lowercase().contains("trigger"),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
