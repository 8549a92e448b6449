//! WebSocket handler for streamed chat turns.
//!
//! Clients connect to `/ws/chat/{session_id}` and send `{"prompt": "..."}`.
//! For each prompt the server streams every display item as it is rendered,
//! then exactly one status message (`turnComplete`, `notConfigured` or
//! `error`). Prompts are handled one at a time per connection.

use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Path, State,
    },
    response::IntoResponse,
};
use futures::{Sink, SinkExt, StreamExt};
use holibot_core::session::{SessionHandle, NOT_CONFIGURED_PLACEHOLDER};
use holibot_core::{run_turn, DisplayItem, TurnError, TurnOutcome};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use super::SharedState;

/// Chat request from client.
#[derive(Debug, Deserialize)]
struct ChatRequest {
    prompt: String,
}

/// End-of-turn status.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub(crate) enum TurnStatus {
    /// The stream ended, normally or with an advisory already sent.
    /// `chunks` counts the answer fragments delivered either way.
    #[serde(rename_all = "camelCase")]
    TurnComplete { chunks: usize, advised: bool },

    /// Agent id or alias id not set; show the placeholder.
    NotConfigured { placeholder: String },

    /// Anything the chat panel should show as a plain error.
    Error { message: String },
}

/// Message sent to client: a display item or a status.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub(crate) enum ServerMessage {
    Item(DisplayItem),
    Status(TurnStatus),
}

impl ServerMessage {
    fn error(message: impl Into<String>) -> Self {
        ServerMessage::Status(TurnStatus::Error {
            message: message.into(),
        })
    }
}

/// Handler for GET /ws/chat/{session_id}
pub async fn chat_ws_handler(
    ws: WebSocketUpgrade,
    Path(session_id): Path<String>,
    State(state): State<Arc<SharedState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state, session_id))
}

/// Handle an individual WebSocket connection.
async fn handle_socket(socket: WebSocket, state: Arc<SharedState>, session_id: String) {
    let (mut sender, mut receiver) = socket.split();

    let Some(session) = state.sessions.get(&session_id) else {
        log::warn!("WebSocket opened for unknown session {}", session_id);
        let msg = ServerMessage::error(format!("Session not found: {}", session_id));
        let _ = send_json(&mut sender, &msg).await;
        return;
    };

    log::debug!("WebSocket connected for session {}", session_id);

    while let Some(Ok(msg)) = receiver.next().await {
        let text = match msg {
            Message::Text(text) => text,
            Message::Close(_) => break,
            _ => continue,
        };

        let request = match serde_json::from_str::<ChatRequest>(text.as_str()) {
            Ok(req) => req,
            Err(e) => {
                let msg = ServerMessage::error(format!("Invalid chat request: {}", e));
                if send_json(&mut sender, &msg).await.is_err() {
                    break;
                }
                continue;
            }
        };

        let (tx, mut rx) = mpsc::unbounded_channel();
        let turn = tokio::spawn(drive_turn(Arc::clone(&session), request.prompt, tx));

        let mut disconnected = false;
        while let Some(msg) = rx.recv().await {
            if send_json(&mut sender, &msg).await.is_err() {
                disconnected = true;
                break; // Client disconnected
            }
        }

        if disconnected {
            // Detached; the turn still records its history.
            drop(turn);
            break;
        }
        if let Err(e) = turn.await {
            log::error!("Chat turn task failed: {}", e);
        }
    }

    log::debug!("WebSocket connection closed for session {}", session_id);
}

async fn send_json<S>(sender: &mut S, msg: &ServerMessage) -> Result<(), ()>
where
    S: Sink<Message> + Unpin,
{
    let json = serde_json::to_string(msg).map_err(|_| ())?;
    sender.send(Message::Text(json.into())).await.map_err(|_| ())
}

/// Run one turn, sending every item and then the status to `out`.
///
/// `out` is dropped on return, which ends the receiver's stream.
pub(crate) async fn drive_turn(
    session: SessionHandle,
    prompt: String,
    out: mpsc::UnboundedSender<ServerMessage>,
) {
    let result = run_turn(&session, &prompt, |item| {
        let _ = out.send(ServerMessage::Item(item));
    })
    .await;

    let status = match result {
        Ok(TurnOutcome::Completed { chunks }) => TurnStatus::TurnComplete {
            chunks,
            advised: false,
        },
        Ok(TurnOutcome::Advised { chunks, .. }) => TurnStatus::TurnComplete {
            chunks,
            advised: true,
        },
        Err(TurnError::NotConfigured) => TurnStatus::NotConfigured {
            placeholder: NOT_CONFIGURED_PLACEHOLDER.to_string(),
        },
        Err(e) => {
            log::error!("Chat turn failed: {}", e);
            TurnStatus::Error {
                message: e.to_string(),
            }
        }
    };

    let _ = out.send(ServerMessage::Status(status));
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use holibot_core::agents::ReplayRuntime;
    use holibot_core::session::{lock_session, AgentConfig};
    use holibot_core::SessionStore;

    fn store(fixture: &str) -> SessionStore {
        SessionStore::new(Arc::new(ReplayRuntime::parse(fixture).unwrap()), None)
    }

    fn configure(handle: &SessionHandle) {
        lock_session(handle).config = AgentConfig {
            agent_id: "AGENT".to_string(),
            agent_alias_id: "ALIAS".to_string(),
        };
    }

    async fn collect(session: SessionHandle, prompt: &str) -> Vec<ServerMessage> {
        let (tx, mut rx) = mpsc::unbounded_channel();
        drive_turn(session, prompt.to_string(), tx).await;
        let mut out = Vec::new();
        while let Some(msg) = rx.recv().await {
            out.push(msg);
        }
        out
    }

    #[tokio::test]
    async fn streams_items_then_turn_complete() {
        let store = store(concat!(
            r#"{"trace": {"trace": {"orchestrationTrace": {"rationale": {"text": "look it up"}}}}}"#,
            "\n",
            r#"{"chunk": {"bytes": "元日です"}}"#,
        ));
        let session = store.ensure(None);
        configure(&session);

        let messages = collect(session, "1月1日は？").await;

        assert_eq!(messages.len(), 3);
        assert!(matches!(&messages[0], ServerMessage::Item(DisplayItem::Section(_))));
        assert_eq!(
            messages[1],
            ServerMessage::Item(DisplayItem::Answer {
                text: "元日です".to_string()
            })
        );
        assert_eq!(
            messages[2],
            ServerMessage::Status(TurnStatus::TurnComplete {
                chunks: 1,
                advised: false
            })
        );
    }

    #[tokio::test]
    async fn advisory_turn_completes_as_advised() {
        let store = store(r#"{"error": "throttlingException: Rate exceeded"}"#);
        let session = store.ensure(None);
        configure(&session);

        let messages = collect(session, "hi").await;

        assert!(matches!(&messages[0], ServerMessage::Item(DisplayItem::Advisory(_))));
        assert_eq!(
            messages[1],
            ServerMessage::Status(TurnStatus::TurnComplete {
                chunks: 0,
                advised: true
            })
        );
    }

    #[tokio::test]
    async fn advisory_after_chunks_keeps_chunk_count() {
        let store = store(concat!(
            r#"{"chunk": {"bytes": "2025年の祝日は"}}"#,
            "\n",
            r#"{"chunk": {"bytes": "16日"}}"#,
            "\n",
            r#"{"error": "dependencyFailedException: Aurora is resuming"}"#,
        ));
        let session = store.ensure(None);
        configure(&session);

        let messages = collect(session, "hi").await;

        assert_eq!(messages.len(), 4);
        assert!(matches!(&messages[2], ServerMessage::Item(DisplayItem::Advisory(_))));
        assert_eq!(
            messages[3],
            ServerMessage::Status(TurnStatus::TurnComplete {
                chunks: 2,
                advised: true
            })
        );
    }

    #[tokio::test]
    async fn unconfigured_session_gets_placeholder() {
        let store = store("");
        let messages = collect(store.ensure(None), "hi").await;
        assert_eq!(
            messages,
            vec![ServerMessage::Status(TurnStatus::NotConfigured {
                placeholder: NOT_CONFIGURED_PLACEHOLDER.to_string()
            })]
        );
    }

    #[tokio::test]
    async fn unrecognized_failure_is_error_status() {
        let store = store(r#"{"error": "accessDeniedException: not allowed"}"#);
        let session = store.ensure(None);
        configure(&session);

        let messages = collect(session, "hi").await;

        match &messages[0] {
            ServerMessage::Status(TurnStatus::Error { message }) => {
                assert!(message.contains("accessDeniedException"))
            }
            other => panic!("Expected error status, got {:?}", other),
        }
    }

    #[test]
    fn status_serialization() {
        let json = serde_json::to_value(ServerMessage::Status(TurnStatus::TurnComplete {
            chunks: 2,
            advised: false,
        }))
        .unwrap();
        assert_eq!(json["type"], "turnComplete");
        assert_eq!(json["chunks"], 2);

        let json = serde_json::to_value(ServerMessage::error("boom")).unwrap();
        assert_eq!(json["type"], "error");
        assert_eq!(json["message"], "boom");
    }

    #[test]
    fn item_serialization_is_untagged() {
        let json = serde_json::to_value(ServerMessage::Item(DisplayItem::Answer {
            text: "hi".to_string(),
        }))
        .unwrap();
        assert_eq!(json, serde_json::json!({"type": "answer", "text": "hi"}));
    }

    #[test]
    fn chat_request_deserialization() {
        let req: ChatRequest = serde_json::from_str(r#"{"prompt": "2025年の祝日"}"#).unwrap();
        assert_eq!(req.prompt, "2025年の祝日");
    }
}
