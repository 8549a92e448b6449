//! Browser-session state.
//!
//! A session is created on first page load and lives until the process
//! exits. Nothing is persisted.

mod manager;
mod state;

pub use manager::{SessionError, SessionStore};
pub use state::{
    lock_session, AgentConfig, Message, Role, Session, SessionHandle, SessionId, SessionView,
    NOT_CONFIGURED_PLACEHOLDER,
};
