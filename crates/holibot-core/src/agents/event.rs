//! Typed agent events.
//!
//! Every runtime (Bedrock, replay fixtures) converts what it receives into
//! these types exactly once, at the boundary. Rendering then matches on
//! them exhaustively instead of probing optional JSON keys.

use serde::{Deserialize, Serialize};

/// A single event from an agent's completion stream.
///
/// Exactly one of trace or chunk is carried per event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum AgentEvent {
    /// Diagnostic/progress trace emitted alongside the answer.
    Trace { trace: Trace },

    /// A fragment of the final answer, as raw bytes.
    Chunk { bytes: Vec<u8> },
}

impl AgentEvent {
    /// Convenience constructor for an answer chunk.
    pub fn chunk(text: impl Into<String>) -> Self {
        AgentEvent::Chunk {
            bytes: text.into().into_bytes(),
        }
    }

    /// Convenience constructor for an orchestration trace.
    pub fn orchestration(steps: Vec<OrchestrationStep>) -> Self {
        AgentEvent::Trace {
            trace: Trace::Orchestration { steps },
        }
    }
}

/// Trace categories.
///
/// Only orchestration traces are displayed; pre/post-processing, guardrail
/// and failure traces decode to `Other` and are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "category", rename_all = "camelCase")]
pub enum Trace {
    Orchestration { steps: Vec<OrchestrationStep> },
    Other,
}

/// One step inside an orchestration trace.
///
/// The JSON wire shape may carry several of these keys in one event; they
/// are kept in the fixed order modelInvocationInput, modelInvocationOutput,
/// rationale, invocationInput, observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "camelCase")]
pub enum OrchestrationStep {
    /// The prompt sent to the foundation model. Often JSON, not always.
    ModelInvocationInput { text: String },

    /// The raw model response content. Often JSON, not always.
    ModelInvocationOutput { content: String },

    /// The agent's reasoning for its next action.
    Rationale { text: String },

    /// A tool, knowledge base or sub-agent is about to be called.
    InvocationInput { input: InvocationInput },

    /// The result of a previous invocation.
    Observation { observation: Observation },
}

/// Dispatched on the trace's `invocationType`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "invocationType", rename_all = "camelCase")]
pub enum InvocationInput {
    AgentCollaborator {
        name: String,
        text: String,
    },
    KnowledgeBase {
        text: String,
    },
    ActionGroup {
        detail: serde_json::Value,
    },
    /// Forward-compatible catch-all; renders nothing.
    Unrecognized {
        invocation_type: String,
    },
}

/// Dispatched on the observation's `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "observationType", rename_all = "camelCase")]
pub enum Observation {
    AgentCollaborator {
        name: String,
        text: String,
    },
    KnowledgeBase {
        references: serde_json::Value,
    },
    ActionGroup {
        text: String,
    },
    /// Forward-compatible catch-all; renders nothing.
    Unrecognized {
        observation_type: String,
    },
}

/// Discriminator strings shared by invocation inputs and observations.
pub mod invocation_type {
    pub const AGENT_COLLABORATOR: &str = "AGENT_COLLABORATOR";
    pub const KNOWLEDGE_BASE: &str = "KNOWLEDGE_BASE";
    pub const ACTION_GROUP: &str = "ACTION_GROUP";
}
