//! Decodes JSON completion events into [`AgentEvent`]s.
//!
//! # How This Decoder Works
//!
//! 1. Deserialize the JSON into the loose [`WireEvent`] shape
//! 2. Enforce that exactly one of `trace` / `chunk` is present
//! 3. Translate the orchestration keys, in a fixed order, into
//!    [`OrchestrationStep`]s, dispatching invocation inputs and
//!    observations on their discriminator strings
//!
//! Unknown discriminators become `Unrecognized` variants rather than errors,
//! and missing leaf fields become empty strings.

use super::error::AgentError;
use super::event::{
    invocation_type, AgentEvent, InvocationInput, Observation, OrchestrationStep, Trace,
};
use super::wire::{
    WireEvent, WireInvocationInput, WireObservation, WireOrchestrationTrace, WireText,
    WireTracePart,
};

/// Decode a single JSON line.
pub fn decode_line(line: &str) -> Result<AgentEvent, AgentError> {
    let wire: WireEvent =
        serde_json::from_str(line).map_err(|e| AgentError::Decode(e.to_string()))?;
    decode_wire(wire)
}

/// Decode an already-parsed JSON value.
pub fn decode_value(value: serde_json::Value) -> Result<AgentEvent, AgentError> {
    let wire: WireEvent =
        serde_json::from_value(value).map_err(|e| AgentError::Decode(e.to_string()))?;
    decode_wire(wire)
}

/// Translate the wire shape into a typed event.
pub fn decode_wire(wire: WireEvent) -> Result<AgentEvent, AgentError> {
    match (wire.trace, wire.chunk) {
        (Some(part), None) => Ok(AgentEvent::Trace {
            trace: decode_trace(part),
        }),
        (None, Some(chunk)) => Ok(AgentEvent::Chunk {
            bytes: chunk.bytes.into_bytes(),
        }),
        (Some(_), Some(_)) => Err(AgentError::Decode(
            "event carries both trace and chunk".to_string(),
        )),
        (None, None) => Err(AgentError::Decode(
            "event carries neither trace nor chunk".to_string(),
        )),
    }
}

fn decode_trace(part: WireTracePart) -> Trace {
    match part.trace.and_then(|t| t.orchestration_trace) {
        Some(orchestration) => Trace::Orchestration {
            steps: decode_orchestration(orchestration),
        },
        None => {
            log::debug!(
                "Ignoring non-orchestration trace for session {}",
                part.session_id.as_deref().unwrap_or("-")
            );
            Trace::Other
        }
    }
}

fn decode_orchestration(trace: WireOrchestrationTrace) -> Vec<OrchestrationStep> {
    let mut steps = Vec::new();

    if let Some(input) = trace.model_invocation_input {
        steps.push(OrchestrationStep::ModelInvocationInput {
            text: text_of(Some(input)),
        });
    }

    if let Some(output) = trace.model_invocation_output {
        let content = output
            .raw_response
            .and_then(|r| r.content)
            .unwrap_or_default();
        steps.push(OrchestrationStep::ModelInvocationOutput { content });
    }

    if let Some(rationale) = trace.rationale {
        steps.push(OrchestrationStep::Rationale {
            text: text_of(Some(rationale)),
        });
    }

    if let Some(input) = trace.invocation_input {
        steps.push(OrchestrationStep::InvocationInput {
            input: decode_invocation_input(input),
        });
    }

    if let Some(observation) = trace.observation {
        steps.push(OrchestrationStep::Observation {
            observation: decode_observation(observation),
        });
    }

    steps
}

fn decode_invocation_input(input: WireInvocationInput) -> InvocationInput {
    let kind = input.invocation_type.unwrap_or_default();

    match kind.as_str() {
        invocation_type::AGENT_COLLABORATOR => {
            let collaborator = input.agent_collaborator_invocation_input.unwrap_or_default();
            InvocationInput::AgentCollaborator {
                name: collaborator.agent_collaborator_name.unwrap_or_default(),
                text: text_of(collaborator.input),
            }
        }
        invocation_type::KNOWLEDGE_BASE => InvocationInput::KnowledgeBase {
            text: text_of(input.knowledge_base_lookup_input),
        },
        invocation_type::ACTION_GROUP => InvocationInput::ActionGroup {
            detail: input
                .action_group_invocation_input
                .unwrap_or(serde_json::Value::Null),
        },
        _ => InvocationInput::Unrecognized {
            invocation_type: kind,
        },
    }
}

fn decode_observation(observation: WireObservation) -> Observation {
    let kind = observation.observation_type.unwrap_or_default();

    match kind.as_str() {
        invocation_type::AGENT_COLLABORATOR => {
            let collaborator = observation
                .agent_collaborator_invocation_output
                .unwrap_or_default();
            Observation::AgentCollaborator {
                name: collaborator.agent_collaborator_name.unwrap_or_default(),
                text: text_of(collaborator.output),
            }
        }
        invocation_type::KNOWLEDGE_BASE => Observation::KnowledgeBase {
            references: observation
                .knowledge_base_lookup_output
                .and_then(|o| o.retrieved_references)
                .unwrap_or(serde_json::Value::Array(Vec::new())),
        },
        invocation_type::ACTION_GROUP => Observation::ActionGroup {
            text: text_of(observation.action_group_invocation_output),
        },
        _ => Observation::Unrecognized {
            observation_type: kind,
        },
    }
}

fn text_of(payload: Option<WireText>) -> String {
    payload.and_then(|p| p.text).unwrap_or_default()
}
