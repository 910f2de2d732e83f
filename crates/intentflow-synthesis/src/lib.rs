//! Intent-to-flow synthesis for intentflow.
//!
//! This crate provides:
//!
//! - **Requests**: the wire shape of an automation request via
//!   [`request::IntentRequest`].
//! - **Prompting**: deterministic prompt construction via
//!   [`prompt::build_prompt`].
//! - **Extraction**: recovery of candidate graphs from untrusted generator
//!   text via [`extract::extract_graph`].
//! - **Generation**: one-shot calls through a chat backend via
//!   [`gateway::FlowGateway`].
//! - **Service**: the validated end-to-end pipeline, with an offline demo
//!   mode, via [`service::SynthesisService`].

pub mod error;
pub mod extract;
pub mod gateway;
pub mod prompt;
pub mod request;
pub mod service;

pub use error::{Result, SynthesisError};
pub use extract::{extract_graph, extract_json};
pub use gateway::{DEFAULT_MODEL, DEFAULT_TEMPERATURE, FlowGateway, GeneratedFlow};
pub use prompt::{SYSTEM_PROMPT, build_prompt, render_catalog};
pub use request::{IntentContext, IntentRequest, TimeWindow};
pub use service::{SynthesisService, demo_flow};
