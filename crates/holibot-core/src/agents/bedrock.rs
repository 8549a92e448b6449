//! Amazon Bedrock Agents runtime.
//!
//! Calls `InvokeAgent` and converts the SDK's completion stream into
//! [`AgentEvent`]s. SDK types never leave this module.

use async_trait::async_trait;
use aws_sdk_bedrockagentruntime as bedrock;
use bedrock::error::{DisplayErrorContext, ProvideErrorMetadata};
use aws_smithy_types::{Document, Number};
use bedrock::types::{
    ActionGroupInvocationInput, InvocationInput as SdkInvocationInput,
    Observation as SdkObservation, OrchestrationTrace as SdkOrchestrationTrace, ResponseStream,
    RetrievedReference, Trace as SdkTrace,
};
use serde_json::json;

use super::error::AgentError;
use super::event::{
    invocation_type, AgentEvent, InvocationInput, Observation, OrchestrationStep, Trace,
};
use super::runtime::{AgentRuntime, Completion, InvokeRequest};

/// Client handle for the `bedrock-agent-runtime` service.
#[derive(Debug, Clone)]
pub struct BedrockAgentRuntime {
    client: bedrock::Client,
}

impl BedrockAgentRuntime {
    pub fn new(client: bedrock::Client) -> Self {
        Self { client }
    }

    /// Build a client from the default AWS credential/region chain,
    /// optionally pinning the region.
    pub async fn from_env(region: Option<String>) -> Self {
        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest());
        if let Some(region) = region {
            loader = loader.region(aws_config::Region::new(region));
        }
        let config = loader.load().await;
        Self::new(bedrock::Client::new(&config))
    }
}

#[async_trait]
impl AgentRuntime for BedrockAgentRuntime {
    async fn invoke(&self, request: InvokeRequest) -> Result<Completion, AgentError> {
        log::info!(
            "Invoking agent {}/{} for session {}",
            request.agent_id,
            request.agent_alias_id,
            request.session_id
        );

        let output = self
            .client
            .invoke_agent()
            .agent_id(request.agent_id)
            .agent_alias_id(request.agent_alias_id)
            .session_id(request.session_id)
            .enable_trace(request.enable_trace)
            .input_text(request.input_text)
            .send()
            .await
            .map_err(|e| {
                let code = e.as_service_error().and_then(|s| s.code()).map(str::to_string);
                AgentError::Client(describe(code.as_deref(), &e))
            })?;

        // The receiver is moved into the stream state and dropped after the
        // first error, so the completion ends there.
        let events = futures::stream::unfold(Some(output.completion), |state| async move {
            let mut receiver = match state {
                Some(receiver) => receiver,
                None => return None,
            };
            loop {
                match receiver.recv().await {
                    Ok(Some(event)) => {
                        if let Some(event) = convert_event(event) {
                            return Some((Ok(event), Some(receiver)));
                        }
                    }
                    Ok(None) => return None,
                    Err(e) => {
                        let code = e.as_service_error().and_then(|s| s.code()).map(str::to_string);
                        let message = describe(code.as_deref(), &e);
                        return Some((Err(AgentError::EventStream(message)), None));
                    }
                }
            }
        });

        Ok(Completion::new(events))
    }
}

/// Error text used for advisory classification: service code first, then
/// the full SDK error chain.
fn describe<E: std::error::Error>(code: Option<&str>, err: &E) -> String {
    match code {
        Some(code) => format!("{}: {}", code, DisplayErrorContext(err)),
        None => DisplayErrorContext(err).to_string(),
    }
}

// ============================================================================
// SDK -> AgentEvent conversion
// ============================================================================

fn convert_event(event: ResponseStream) -> Option<AgentEvent> {
    match event {
        ResponseStream::Chunk(part) => Some(AgentEvent::Chunk {
            bytes: part
                .bytes()
                .map(|b| b.clone().into_inner())
                .unwrap_or_default(),
        }),
        ResponseStream::Trace(part) => Some(AgentEvent::Trace {
            trace: part.trace().map(convert_trace).unwrap_or(Trace::Other),
        }),
        other => {
            log::debug!("Skipping unsupported completion event: {:?}", other);
            None
        }
    }
}

fn convert_trace(trace: &SdkTrace) -> Trace {
    match trace {
        SdkTrace::OrchestrationTrace(orchestration) => Trace::Orchestration {
            steps: convert_orchestration(orchestration).into_iter().collect(),
        },
        _ => Trace::Other,
    }
}

/// The SDK models an orchestration trace as a union, so each event carries
/// at most one step.
fn convert_orchestration(trace: &SdkOrchestrationTrace) -> Option<OrchestrationStep> {
    match trace {
        SdkOrchestrationTrace::ModelInvocationInput(input) => {
            Some(OrchestrationStep::ModelInvocationInput {
                text: input.text().unwrap_or_default().to_string(),
            })
        }
        SdkOrchestrationTrace::ModelInvocationOutput(output) => {
            Some(OrchestrationStep::ModelInvocationOutput {
                content: output
                    .raw_response()
                    .and_then(|r| r.content())
                    .unwrap_or_default()
                    .to_string(),
            })
        }
        SdkOrchestrationTrace::Rationale(rationale) => Some(OrchestrationStep::Rationale {
            text: rationale.text().unwrap_or_default().to_string(),
        }),
        SdkOrchestrationTrace::InvocationInput(input) => Some(OrchestrationStep::InvocationInput {
            input: convert_invocation_input(input),
        }),
        SdkOrchestrationTrace::Observation(observation) => Some(OrchestrationStep::Observation {
            observation: convert_observation(observation),
        }),
        _ => None,
    }
}

fn convert_invocation_input(input: &SdkInvocationInput) -> InvocationInput {
    let kind = input
        .invocation_type()
        .map(|t| t.as_str())
        .unwrap_or_default();

    match kind {
        invocation_type::AGENT_COLLABORATOR => {
            let collaborator = input.agent_collaborator_invocation_input();
            InvocationInput::AgentCollaborator {
                name: collaborator
                    .and_then(|c| c.agent_collaborator_name())
                    .unwrap_or_default()
                    .to_string(),
                text: collaborator
                    .and_then(|c| c.input())
                    .and_then(|p| p.text())
                    .unwrap_or_default()
                    .to_string(),
            }
        }
        invocation_type::KNOWLEDGE_BASE => InvocationInput::KnowledgeBase {
            text: input
                .knowledge_base_lookup_input()
                .and_then(|k| k.text())
                .unwrap_or_default()
                .to_string(),
        },
        invocation_type::ACTION_GROUP => InvocationInput::ActionGroup {
            detail: input
                .action_group_invocation_input()
                .map(action_group_detail)
                .unwrap_or(serde_json::Value::Null),
        },
        other => InvocationInput::Unrecognized {
            invocation_type: other.to_string(),
        },
    }
}

fn action_group_detail(input: &ActionGroupInvocationInput) -> serde_json::Value {
    let parameters: Vec<serde_json::Value> = input
        .parameters()
        .iter()
        .map(|p| json!({"name": p.name(), "type": p.r#type(), "value": p.value()}))
        .collect();

    json!({
        "actionGroupName": input.action_group_name(),
        "function": input.function(),
        "apiPath": input.api_path(),
        "parameters": parameters,
    })
}

fn convert_observation(observation: &SdkObservation) -> Observation {
    let kind = observation
        .r#type()
        .map(|t| t.as_str())
        .unwrap_or_default();

    match kind {
        invocation_type::AGENT_COLLABORATOR => {
            let collaborator = observation.agent_collaborator_invocation_output();
            Observation::AgentCollaborator {
                name: collaborator
                    .and_then(|c| c.agent_collaborator_name())
                    .unwrap_or_default()
                    .to_string(),
                text: collaborator
                    .and_then(|c| c.output())
                    .and_then(|o| o.text())
                    .unwrap_or_default()
                    .to_string(),
            }
        }
        invocation_type::KNOWLEDGE_BASE => {
            let references = observation
                .knowledge_base_lookup_output()
                .map(|o| {
                    o.retrieved_references()
                        .iter()
                        .map(reference_json)
                        .collect()
                })
                .unwrap_or_default();
            Observation::KnowledgeBase {
                references: serde_json::Value::Array(references),
            }
        }
        invocation_type::ACTION_GROUP => Observation::ActionGroup {
            text: observation
                .action_group_invocation_output()
                .and_then(|o| o.text())
                .unwrap_or_default()
                .to_string(),
        },
        other => Observation::Unrecognized {
            observation_type: other.to_string(),
        },
    }
}

/// One retrieved reference in the same camelCase shape the service uses on
/// the wire. Absent parts are `null`.
fn reference_json(reference: &RetrievedReference) -> serde_json::Value {
    let location = reference.location().map(|l| {
        json!({
            "s3Location": l.s3_location().map(|s| json!({"uri": s.uri()})),
            "webLocation": l.web_location().map(|w| json!({"url": w.url()})),
        })
    });
    let metadata = reference.metadata().map(|m| {
        m.iter()
            .map(|(k, v)| (k.clone(), document_to_json(v)))
            .collect::<serde_json::Map<_, _>>()
    });

    json!({
        "content": reference.content().map(|c| json!({"text": c.text()})),
        "location": location,
        "metadata": metadata,
    })
}

fn document_to_json(document: &Document) -> serde_json::Value {
    match document {
        Document::Object(map) => map
            .iter()
            .map(|(k, v)| (k.clone(), document_to_json(v)))
            .collect::<serde_json::Map<_, _>>()
            .into(),
        Document::Array(items) => items.iter().map(document_to_json).collect(),
        Document::Number(Number::PosInt(n)) => json!(n),
        Document::Number(Number::NegInt(n)) => json!(n),
        Document::Number(Number::Float(f)) => json!(f),
        Document::String(s) => json!(s),
        Document::Bool(b) => json!(b),
        Document::Null => serde_json::Value::Null,
    }
}
