//! JSON wire shapes of InvokeAgent completion events.
//!
//! These mirror the structure the agent runtime uses when an event is
//! rendered as JSON (the same nesting the Bedrock SDKs expose):
//!
//! ```json
//! {"trace": {"agentId": "A1", "trace": {"orchestrationTrace": {"rationale": {"text": "..."}}}}}
//! {"chunk": {"bytes": "final answer text"}}
//! ```
//!
//! Almost every field is optional with `#[serde(default)]`; the payloads
//! are heterogeneous and the decoder fills the gaps.

use serde::Deserialize;

/// Top-level completion event. Exactly one field should be present.
#[derive(Debug, Clone, Deserialize)]
pub struct WireEvent {
    #[serde(default)]
    pub trace: Option<WireTracePart>,

    #[serde(default)]
    pub chunk: Option<WireChunk>,
}

/// Answer fragment. Fixtures store the bytes as UTF-8 text.
#[derive(Debug, Clone, Deserialize)]
pub struct WireChunk {
    #[serde(default)]
    pub bytes: String,
}

/// Envelope around a trace, carrying agent identifiers.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireTracePart {
    #[serde(default)]
    pub agent_id: Option<String>,

    #[serde(default)]
    pub session_id: Option<String>,

    #[serde(default)]
    pub trace: Option<WireTrace>,
}

/// The trace union. Only the orchestration category is modelled.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireTrace {
    #[serde(default)]
    pub orchestration_trace: Option<WireOrchestrationTrace>,
}

/// Orchestration trace. Any subset of the keys may be present.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireOrchestrationTrace {
    #[serde(default)]
    pub model_invocation_input: Option<WireText>,

    #[serde(default)]
    pub model_invocation_output: Option<WireModelInvocationOutput>,

    #[serde(default)]
    pub rationale: Option<WireText>,

    #[serde(default)]
    pub invocation_input: Option<WireInvocationInput>,

    #[serde(default)]
    pub observation: Option<WireObservation>,
}

/// Any payload whose interesting part is a `text` field.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WireText {
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireModelInvocationOutput {
    #[serde(default)]
    pub raw_response: Option<WireRawResponse>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WireRawResponse {
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireInvocationInput {
    #[serde(default)]
    pub invocation_type: Option<String>,

    #[serde(default)]
    pub agent_collaborator_invocation_input: Option<WireCollaboratorInput>,

    #[serde(default)]
    pub knowledge_base_lookup_input: Option<WireText>,

    /// Kept as raw JSON; it is only ever displayed.
    #[serde(default)]
    pub action_group_invocation_input: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireCollaboratorInput {
    #[serde(default)]
    pub agent_collaborator_name: Option<String>,

    #[serde(default)]
    pub input: Option<WireText>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireObservation {
    /// `type` is a keyword, hence the rename.
    #[serde(rename = "type", default)]
    pub observation_type: Option<String>,

    #[serde(default)]
    pub knowledge_base_lookup_output: Option<WireKnowledgeBaseOutput>,

    #[serde(default)]
    pub agent_collaborator_invocation_output: Option<WireCollaboratorOutput>,

    #[serde(default)]
    pub action_group_invocation_output: Option<WireText>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireKnowledgeBaseOutput {
    #[serde(default)]
    pub retrieved_references: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireCollaboratorOutput {
    #[serde(default)]
    pub agent_collaborator_name: Option<String>,

    #[serde(default)]
    pub output: Option<WireText>,
}
