//! Errors raised while invoking an agent or consuming its stream.

use thiserror::Error;

/// Failure while talking to the agent runtime.
///
/// `Client` and `EventStream` are the two classes the chat front end knows
/// how to turn into advisories (see [`crate::advisory::classify`]).
/// Everything else always propagates.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AgentError {
    /// The invocation request itself failed.
    #[error("Agent invocation failed: {0}")]
    Client(String),

    /// The completion stream failed mid-turn.
    #[error("Agent event stream failed: {0}")]
    EventStream(String),

    /// An event could not be decoded into an [`AgentEvent`](super::AgentEvent).
    #[error("Failed to decode agent event: {0}")]
    Decode(String),

    /// A replay fixture could not be read.
    #[error("Failed to read replay fixture: {0}")]
    Fixture(String),
}

impl AgentError {
    /// The error text inspected by the advisory classifier.
    pub fn message(&self) -> &str {
        match self {
            AgentError::Client(m)
            | AgentError::EventStream(m)
            | AgentError::Decode(m)
            | AgentError::Fixture(m) => m,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_message() {
        let err = AgentError::Client("throttlingException: slow down".to_string());
        assert_eq!(
            err.to_string(),
            "Agent invocation failed: throttlingException: slow down"
        );
    }

    #[test]
    fn message_returns_inner_text() {
        let err = AgentError::EventStream("boom".to_string());
        assert_eq!(err.message(), "boom");
    }
}
