//! SessionStore - owns every live browser session.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use thiserror::Error;

use super::state::{lock_session, AgentConfig, Session, SessionHandle, SessionId, SessionView};
use crate::agents::AgentRuntime;
use crate::logging;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("Session not found: {0}")]
    NotFound(String),
}

/// Creates sessions on demand and hands out shared handles.
///
/// Every session receives a clone of the same agent client.
pub struct SessionStore {
    client: Arc<dyn AgentRuntime>,
    log_dir: Option<PathBuf>,
    sessions: Mutex<HashMap<SessionId, SessionHandle>>,
}

impl SessionStore {
    pub fn new(client: Arc<dyn AgentRuntime>, log_dir: Option<PathBuf>) -> Self {
        Self {
            client,
            log_dir,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    fn sessions(&self) -> MutexGuard<'_, HashMap<SessionId, SessionHandle>> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Idempotent initializer.
    ///
    /// If `id` names a live session it is returned as-is, history and
    /// configuration untouched. Otherwise a fresh session is created with a
    /// new random id, empty history and empty agent configuration.
    pub fn ensure(&self, id: Option<&str>) -> SessionHandle {
        let mut sessions = self.sessions();

        if let Some(id) = id {
            if let Some(existing) = sessions.get(&SessionId(id.to_string())) {
                return Arc::clone(existing);
            }
            log::debug!("Unknown session {}, starting a new one", id);
        }

        let id = SessionId::new();
        let log = logging::open_log_file(self.log_dir.as_deref(), id.as_str());
        let handle = Arc::new(Mutex::new(Session::new(
            id.clone(),
            Arc::clone(&self.client),
            log,
        )));
        sessions.insert(id.clone(), Arc::clone(&handle));
        log::info!("Created session {}", id);
        handle
    }

    /// Look up a live session.
    pub fn get(&self, id: &str) -> Option<SessionHandle> {
        self.sessions().get(&SessionId(id.to_string())).cloned()
    }

    /// Replace a session's agent configuration (the sidebar fields).
    pub fn configure(&self, id: &str, config: AgentConfig) -> Result<SessionView, SessionError> {
        let handle = self
            .get(id)
            .ok_or_else(|| SessionError::NotFound(id.to_string()))?;
        let mut session = lock_session(&handle);
        session.config = AgentConfig {
            agent_id: config.agent_id.trim().to_string(),
            agent_alias_id: config.agent_alias_id.trim().to_string(),
        };
        Ok(session.view())
    }

    /// Drop a session entirely.
    pub fn remove(&self, id: &str) -> Option<SessionHandle> {
        self.sessions().remove(&SessionId(id.to_string()))
    }

    pub fn len(&self) -> usize {
        self.sessions().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions().is_empty()
    }
}
