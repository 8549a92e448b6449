//! The agent runtime seam.
//!
//! A runtime takes one user turn and hands back a [`Completion`]: a lazy,
//! finite, single-consumption stream of events. The chat loop never knows
//! whether it is talking to Bedrock or replaying a fixture.

use async_trait::async_trait;
use futures::stream::{self, BoxStream, Stream, StreamExt};

use super::error::AgentError;
use super::event::AgentEvent;

/// Everything needed to invoke an agent for one turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvokeRequest {
    pub agent_id: String,
    pub agent_alias_id: String,
    /// Lets the remote service keep multi-turn context.
    pub session_id: String,
    pub input_text: String,
    /// Ask the service to interleave trace events with answer chunks.
    pub enable_trace: bool,
}

/// A client handle to a remote agent service.
#[async_trait]
pub trait AgentRuntime: Send + Sync {
    /// Issue one invocation. Errors here are `AgentError::Client`.
    async fn invoke(&self, request: InvokeRequest) -> Result<Completion, AgentError>;
}

/// The streamed response of one invocation.
///
/// Events can be pulled exactly once, in order. A `Completion` is neither
/// `Clone` nor restartable; once [`next`](Self::next) returns `None` the
/// remote stream is closed.
pub struct Completion {
    events: BoxStream<'static, Result<AgentEvent, AgentError>>,
}

impl Completion {
    /// Wrap any stream of events.
    pub fn new<S>(events: S) -> Self
    where
        S: Stream<Item = Result<AgentEvent, AgentError>> + Send + 'static,
    {
        Self {
            events: events.boxed(),
        }
    }

    /// A completion over an already-materialized list of events.
    pub fn from_events(events: Vec<Result<AgentEvent, AgentError>>) -> Self {
        Self::new(stream::iter(events))
    }

    /// Pull the next event, or `None` when the stream has closed.
    pub async fn next(&mut self) -> Option<Result<AgentEvent, AgentError>> {
        self.events.next().await
    }
}

impl std::fmt::Debug for Completion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Completion").finish_non_exhaustive()
    }
}
