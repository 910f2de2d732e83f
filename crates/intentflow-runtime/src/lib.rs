//! Flow graph execution for intentflow.
//!
//! This crate provides:
//!
//! - **Engine**: deterministic, at-most-once traversal of a flow graph via
//!   [`engine::FlowEngine`].
//! - **Handlers**: the [`handler::FlowBlockHandler`] contract and the
//!   standard handler set in [`handlers`].
//! - **Registry**: block type to handler wiring via
//!   [`registry::HandlerRegistry`].
//! - **Device**: the injected platform capability surface via
//!   [`device::Device`], with a dry-run [`device::LoggingDevice`].

pub mod device;
pub mod engine;
pub mod error;
pub mod handler;
pub mod handlers;
pub mod registry;

pub use device::{Accuracy, Device, Lens, LoggingDevice};
pub use engine::{EngineConfig, ExecutionPhase, FlowEngine, StepObserver};
pub use error::{DeviceError, EngineError, HandlerError, Result};
pub use handler::{
    FlowBlockHandler, FlowExecutionInput, FlowExecutionResult, FlowExecutionState,
    FlowStepResult, StepStatus,
};
pub use registry::HandlerRegistry;
