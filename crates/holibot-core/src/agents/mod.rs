//! Agent runtimes and the typed events they produce.
//!
//! - [`event`]: the unified [`AgentEvent`] model
//! - [`wire`] / [`decoder`]: JSON wire shape and its translation
//! - [`runtime`]: the [`AgentRuntime`] seam and one-shot [`Completion`]
//! - [`bedrock`]: Amazon Bedrock Agents
//! - [`replay`]: JSON-lines fixtures

pub mod bedrock;
pub mod decoder;
pub mod error;
pub mod event;
pub mod replay;
pub mod runtime;
pub mod wire;

pub use bedrock::BedrockAgentRuntime;
pub use error::AgentError;
pub use event::{AgentEvent, InvocationInput, Observation, OrchestrationStep, Trace};
pub use replay::ReplayRuntime;
pub use runtime::{AgentRuntime, Completion, InvokeRequest};
