//! Fixture-backed runtime for offline demos and tests.
//!
//! A fixture is a JSON-lines file. Each line is either a completion event in
//! wire shape or an injected failure:
//!
//! ```text
//! {"trace": {"trace": {"orchestrationTrace": {"rationale": {"text": "..."}}}}}
//! {"chunk": {"bytes": "2025年の祝日は16日あります。"}}
//! {"error": "throttlingException: Rate exceeded"}
//! ```
//!
//! Every invocation replays the whole fixture from the top.

use std::path::Path;

use async_trait::async_trait;

use super::decoder::decode_value;
use super::error::AgentError;
use super::event::AgentEvent;
use super::runtime::{AgentRuntime, Completion, InvokeRequest};

/// Replays a recorded stream for every turn.
#[derive(Debug, Clone)]
pub struct ReplayRuntime {
    lines: Vec<serde_json::Value>,
}

impl ReplayRuntime {
    /// Load a fixture from disk.
    pub fn load(path: &Path) -> Result<Self, AgentError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| AgentError::Fixture(format!("{}: {}", path.display(), e)))?;
        Self::parse(&contents)
    }

    /// Parse fixture contents. Blank lines are skipped.
    pub fn parse(contents: &str) -> Result<Self, AgentError> {
        let mut lines = Vec::new();

        for (number, line) in contents.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            let value = serde_json::from_str(trimmed)
                .map_err(|e| AgentError::Fixture(format!("line {}: {}", number + 1, e)))?;
            lines.push(value);
        }

        Ok(Self { lines })
    }

    /// Number of recorded lines.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    fn replay_line(value: &serde_json::Value) -> Result<AgentEvent, AgentError> {
        if let Some(message) = value.get("error").and_then(|e| e.as_str()) {
            return Err(AgentError::EventStream(message.to_string()));
        }
        decode_value(value.clone())
    }
}

#[async_trait]
impl AgentRuntime for ReplayRuntime {
    async fn invoke(&self, request: InvokeRequest) -> Result<Completion, AgentError> {
        log::debug!(
            "Replaying {} fixture events for agent {}/{} (session {})",
            self.lines.len(),
            request.agent_id,
            request.agent_alias_id,
            request.session_id
        );

        let events = self.lines.iter().map(Self::replay_line).collect();
        Ok(Completion::from_events(events))
    }
}
