//! One chat turn: prompt in, rendered stream out.
//!
//! ```text
//! prompt ─▶ history ─▶ AgentRuntime::invoke ─▶ Completion
//!                                                  │ next()
//!                          emit(DisplayItem) ◀── render_event
//!                          history ◀── chunk text
//! ```
//!
//! Items are emitted the moment their event is pulled, so a front end can
//! show partial results while the agent is still working.

use thiserror::Error;

use crate::advisory::{classify, AdvisoryKind};
use crate::agents::{AgentError, AgentEvent, InvokeRequest};
use crate::logging::{log_line, Direction};
use crate::render::{render_event, DisplayItem};
use crate::session::{lock_session, Message, SessionHandle};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TurnError {
    /// Agent id or alias id is still empty.
    #[error("Agent ID and alias ID must be set before chatting")]
    NotConfigured,

    #[error("Prompt is empty")]
    EmptyPrompt,

    /// A remote failure with no advisory; surface it as-is.
    #[error(transparent)]
    Agent(#[from] AgentError),
}

/// How a turn that did not propagate an error ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnOutcome {
    /// The stream closed normally.
    Completed { chunks: usize },
    /// A recognized failure was replaced by an advisory. `chunks` counts
    /// the answer fragments that arrived before it.
    Advised { kind: AdvisoryKind, chunks: usize },
}

/// Run one turn against the session's agent.
///
/// `emit` receives every display item in stream order. Answer chunks are
/// appended to the session history as assistant messages as they arrive.
/// Recognized remote failures are emitted as an advisory and end the turn
/// with [`TurnOutcome::Advised`]; any other failure is returned unchanged.
pub async fn run_turn<F>(
    session: &SessionHandle,
    prompt: &str,
    mut emit: F,
) -> Result<TurnOutcome, TurnError>
where
    F: FnMut(DisplayItem),
{
    let prompt = prompt.trim();
    if prompt.is_empty() {
        return Err(TurnError::EmptyPrompt);
    }

    let (client, request, log) = {
        let mut session = lock_session(session);
        if !session.config.is_complete() {
            return Err(TurnError::NotConfigured);
        }
        session.messages.push(Message::human(prompt));
        let request = InvokeRequest {
            agent_id: session.config.agent_id.clone(),
            agent_alias_id: session.config.agent_alias_id.clone(),
            session_id: session.id.to_string(),
            input_text: prompt.to_string(),
            enable_trace: true,
        };
        (session.client.clone(), request, session.log.clone())
    };
    log_line(&log, Direction::User, prompt);

    let mut chunks = 0;
    let result = async {
        let mut completion = client.invoke(request).await?;

        while let Some(event) = completion.next().await {
            let event = event?;
            if let AgentEvent::Trace { trace } = &event {
                if let Ok(json) = serde_json::to_string(trace) {
                    log_line(&log, Direction::Trace, &json);
                }
            }

            for item in render_event(&event) {
                if let DisplayItem::Answer { text } = &item {
                    chunks += 1;
                    log_line(&log, Direction::Answer, text);
                    lock_session(session)
                        .messages
                        .push(Message::assistant(text.clone()));
                }
                emit(item);
            }
        }

        Ok::<(), AgentError>(())
    }
    .await;

    match result {
        Ok(()) => Ok(TurnOutcome::Completed { chunks }),
        Err(err) => match classify(err) {
            Ok(advisory) => {
                log::warn!("Agent call failed with {:?}; showing advisory", advisory.kind);
                log_line(&log, Direction::Advisory, advisory.message);
                let kind = advisory.kind;
                emit(DisplayItem::Advisory(advisory));
                Ok(TurnOutcome::Advised { kind, chunks })
            }
            Err(err) => {
                log_line(&log, Direction::Error, &err.to_string());
                Err(TurnError::Agent(err))
            }
        },
    }
}
