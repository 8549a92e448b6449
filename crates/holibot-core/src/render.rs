//! Turns agent events into display items.
//!
//! Each event is rendered as soon as it is pulled from the completion, in
//! stream order, with no buffering. A trace may yield several collapsible
//! sections; a chunk yields one answer fragment.

use serde::Serialize;

use crate::advisory::Advisory;
use crate::agents::{AgentEvent, InvocationInput, Observation, OrchestrationStep, Trace};

/// Something the chat panel should show, in order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum DisplayItem {
    /// A labeled, collapsible trace section.
    Section(Section),

    /// A fragment of the final answer.
    Answer { text: String },

    /// A friendly message replacing a recognized remote failure.
    Advisory(Advisory),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SectionKind {
    ModelInput,
    ModelOutput,
    Rationale,
    CollaboratorCall,
    KnowledgeBaseQuery,
    ActionGroupCall,
    KnowledgeBaseResult,
    CollaboratorResult,
    ActionGroupResult,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    pub kind: SectionKind,
    pub title: String,
    /// Whether the section starts expanded.
    pub expanded: bool,
    pub body: SectionBody,
}

/// Structured JSON when the payload parsed, raw text otherwise.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "format", content = "value", rename_all = "camelCase")]
pub enum SectionBody {
    Json(serde_json::Value),
    Text(String),
}

impl Section {
    fn new(kind: SectionKind, title: impl Into<String>, expanded: bool, body: SectionBody) -> Self {
        Self {
            kind,
            title: title.into(),
            expanded,
            body,
        }
    }
}

/// Best-effort JSON parse. The `Err` side carries the raw text, not an error.
pub fn parse_payload(text: &str) -> Result<serde_json::Value, &str> {
    serde_json::from_str(text).map_err(|_| text)
}

/// Render one event.
///
/// Returns the display items in order; non-orchestration traces and
/// unrecognized invocation types produce nothing.
pub fn render_event(event: &AgentEvent) -> Vec<DisplayItem> {
    match event {
        AgentEvent::Trace { trace } => match trace {
            Trace::Orchestration { steps } => steps
                .iter()
                .filter_map(render_step)
                .map(DisplayItem::Section)
                .collect(),
            Trace::Other => Vec::new(),
        },
        AgentEvent::Chunk { bytes } => vec![DisplayItem::Answer {
            text: String::from_utf8_lossy(bytes).into_owned(),
        }],
    }
}

fn render_step(step: &OrchestrationStep) -> Option<Section> {
    match step {
        OrchestrationStep::ModelInvocationInput { text } => Some(Section::new(
            SectionKind::ModelInput,
            "🤔 思考中…",
            false,
            match parse_payload(text) {
                Ok(value) => SectionBody::Json(value),
                Err(raw) => SectionBody::Text(raw.to_string()),
            },
        )),
        OrchestrationStep::ModelInvocationOutput { content } => Some(Section::new(
            SectionKind::ModelOutput,
            "💡 思考がまとまりました",
            false,
            model_output_body(content),
        )),
        OrchestrationStep::Rationale { text } => Some(Section::new(
            SectionKind::Rationale,
            "✅ 次のアクションを決定しました",
            true,
            SectionBody::Text(text.clone()),
        )),
        OrchestrationStep::InvocationInput { input } => render_invocation_input(input),
        OrchestrationStep::Observation { observation } => render_observation(observation),
    }
}

/// Model output is usually a Messages-API body. Show the first content
/// block's text when there is some, the block itself when the text is
/// empty or null, and the raw content when it is not that shape at all.
fn model_output_body(content: &str) -> SectionBody {
    let value = match parse_payload(content) {
        Ok(value) => value,
        Err(raw) => return SectionBody::Text(raw.to_string()),
    };

    let Some(first) = value.get("content").and_then(|c| c.get(0)) else {
        return SectionBody::Text(content.to_string());
    };

    match first.get("text") {
        Some(serde_json::Value::String(text)) if !text.is_empty() => {
            SectionBody::Text(text.clone())
        }
        Some(_) => SectionBody::Json(first.clone()),
        None => SectionBody::Text(content.to_string()),
    }
}

fn render_invocation_input(input: &InvocationInput) -> Option<Section> {
    match input {
        InvocationInput::AgentCollaborator { name, text } => Some(Section::new(
            SectionKind::CollaboratorCall,
            format!("🤖 サブエージェント「{}」を呼び出し中…", name),
            true,
            SectionBody::Text(text.clone()),
        )),
        InvocationInput::KnowledgeBase { text } => Some(Section::new(
            SectionKind::KnowledgeBaseQuery,
            "📖 ナレッジベースを検索中…",
            false,
            SectionBody::Text(text.clone()),
        )),
        InvocationInput::ActionGroup { detail } => Some(Section::new(
            SectionKind::ActionGroupCall,
            "💻 Lambdaを実行中…",
            false,
            SectionBody::Json(detail.clone()),
        )),
        InvocationInput::Unrecognized { invocation_type } => {
            log::debug!("No renderer for invocation type {:?}", invocation_type);
            None
        }
    }
}

fn render_observation(observation: &Observation) -> Option<Section> {
    match observation {
        Observation::KnowledgeBase { references } => Some(Section::new(
            SectionKind::KnowledgeBaseResult,
            "🔍 ナレッジベースから検索結果を取得しました",
            false,
            SectionBody::Json(references.clone()),
        )),
        Observation::AgentCollaborator { name, text } => Some(Section::new(
            SectionKind::CollaboratorResult,
            format!("🤖 サブエージェント「{}」から回答を取得しました", name),
            true,
            SectionBody::Text(text.clone()),
        )),
        Observation::ActionGroup { text } => Some(Section::new(
            SectionKind::ActionGroupResult,
            "📦 Lambdaの実行結果を取得しました",
            false,
            SectionBody::Text(text.clone()),
        )),
        Observation::Unrecognized { observation_type } => {
            log::debug!("No renderer for observation type {:?}", observation_type);
            None
        }
    }
}
