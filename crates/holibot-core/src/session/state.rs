//! Per-session state.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::agents::AgentRuntime;
use crate::logging::LogHandle;

/// Shown instead of the chat input until the agent is configured.
pub const NOT_CONFIGURED_PLACEHOLDER: &str =
    "最初にサイドバーでエージェントIDとエイリアスIDを設定してください";

/// Unique identifier for a browser session.
///
/// Also sent to the agent service as its session id, so the remote side
/// keeps multi-turn context.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub String);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Human,
    Assistant,
}

/// One entry in the chat history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub text: String,
}

impl Message {
    pub fn human(text: impl Into<String>) -> Self {
        Self {
            role: Role::Human,
            text: text.into(),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            text: text.into(),
        }
    }
}

/// Which remote agent to talk to. Both fields start empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentConfig {
    pub agent_id: String,
    pub agent_alias_id: String,
}

impl AgentConfig {
    /// Chat input is only accepted once both fields are non-empty.
    pub fn is_complete(&self) -> bool {
        !self.agent_id.trim().is_empty() && !self.agent_alias_id.trim().is_empty()
    }
}

/// A single browser session.
pub struct Session {
    pub id: SessionId,

    /// Client handle to the agent service.
    pub client: Arc<dyn AgentRuntime>,

    /// Ordered chat history.
    pub messages: Vec<Message>,

    pub config: AgentConfig,

    /// Transcript log (possibly disabled).
    pub log: LogHandle,
}

impl Session {
    pub fn new(id: SessionId, client: Arc<dyn AgentRuntime>, log: LogHandle) -> Self {
        Self {
            id,
            client,
            messages: Vec::new(),
            config: AgentConfig::default(),
            log,
        }
    }

    /// Serializable snapshot for the front end.
    pub fn view(&self) -> SessionView {
        let can_chat = self.config.is_complete();
        SessionView {
            session_id: self.id.clone(),
            messages: self.messages.clone(),
            agent_id: self.config.agent_id.clone(),
            agent_alias_id: self.config.agent_alias_id.clone(),
            can_chat,
            placeholder: (!can_chat).then(|| NOT_CONFIGURED_PLACEHOLDER.to_string()),
        }
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("messages", &self.messages.len())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Shared, lockable session. The lock is never held across an `.await`.
pub type SessionHandle = Arc<Mutex<Session>>;

/// Lock a session, recovering the data if a previous holder panicked.
pub fn lock_session(handle: &SessionHandle) -> MutexGuard<'_, Session> {
    handle.lock().unwrap_or_else(PoisonError::into_inner)
}

/// What the front end needs to draw the sidebar and chat panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub session_id: SessionId,
    pub messages: Vec<Message>,
    pub agent_id: String,
    pub agent_alias_id: String,
    pub can_chat: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
}
