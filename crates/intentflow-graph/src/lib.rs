//! Flow graph model and structural validation for intentflow.
//!
//! This crate provides:
//!
//! - **Block catalog**: the closed set of block types and their categories
//!   via [`block::BlockType`].
//! - **Graph model**: typed, serde-friendly flow graphs via
//!   [`model::FlowGraph`].
//! - **Candidates**: untrusted, textually-typed graphs decoded from generator
//!   output via [`candidate::CandidateGraph`].
//! - **Validation**: the acceptance gate that turns candidates into typed
//!   graphs via [`validator::FlowValidator`].

pub mod block;
pub mod candidate;
pub mod error;
pub mod model;
pub mod validator;

pub use block::{BlockCategory, BlockType, UnknownBlockType};
pub use candidate::{CandidateBlock, CandidateEdge, CandidateGraph, CandidateResponse};
pub use error::{Result, ValidationError};
pub use model::{FlowBlock, FlowEdge, FlowGraph, FlowGraphResponse};
pub use validator::FlowValidator;
