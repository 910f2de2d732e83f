//! Runtime error types.
//!
//! Per-block logical failures (a condition not matching, a webhook answering
//! 500) are step statuses, not errors.  The types here are for failures that
//! abort a whole run.

use intentflow_graph::BlockType;

/// A failure inside a platform capability.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeviceError {
    /// The capability does not exist on this device or is switched off.
    #[error("{capability} is unavailable")]
    Unavailable { capability: String },

    /// The capability exists but the operation failed.
    #[error("{capability} failed: {reason}")]
    Failed { capability: String, reason: String },
}

/// An unrecoverable failure inside a block handler.
#[derive(Debug, thiserror::Error)]
pub enum HandlerError {
    /// The handler could not complete for a reason it cannot express as a
    /// step status.
    #[error("handler failed: {reason}")]
    ExecutionFailed { reason: String },

    /// A device error the handler chose to propagate.
    #[error(transparent)]
    Device(#[from] DeviceError),
}

/// Why an execution was aborted.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// A handler returned an error; no further blocks were run.
    #[error("block `{block_id}` ({block_type}) aborted the run: {source}")]
    Handler {
        block_id: String,
        block_type: BlockType,
        #[source]
        source: HandlerError,
    },
}

/// Convenience alias used throughout the runtime crate.
pub type Result<T> = std::result::Result<T, EngineError>;
