//! Graph validation errors.
//!
//! Each variant names exactly one structural rule, so callers (and users) can
//! tell which part of a generated graph is wrong.

/// A structural defect that keeps a graph from being trusted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// A block has an empty or whitespace-only id.
    #[error("block id missing (block at index {index})")]
    BlankBlockId { index: usize },

    /// A block's type is not in the allow-list.
    #[error("unsupported block type `{block_type}` on block `{block_id}`")]
    UnsupportedBlockType { block_id: String, block_type: String },

    /// Two blocks share an id.
    #[error("duplicate block id `{block_id}`")]
    DuplicateBlockId { block_id: String },

    /// An edge starts at an id that no block carries.
    #[error("edge source `{from}` missing (edge {from} -> {to})")]
    DanglingEdgeSource { from: String, to: String },

    /// An edge ends at an id that no block carries.
    #[error("edge target `{to}` missing (edge {from} -> {to})")]
    DanglingEdgeTarget { from: String, to: String },

    /// Nothing in the graph can start a traversal.
    #[error("no trigger blocks found")]
    NoTrigger,
}

/// Convenience alias used throughout the graph crate.
pub type Result<T> = std::result::Result<T, ValidationError>;
