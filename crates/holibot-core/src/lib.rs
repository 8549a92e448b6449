//! # holibot-core
//!
//! Core logic for holibot, a chat front end for a hosted conversational
//! agent plus the holiday-lookup function that agent calls.
//!
//! This crate is framework-agnostic and is used by:
//! - the HTTP/WebSocket server (`holibot-http`)
//! - the `holibot` binary (`holibot-daemon`)
//!
//! ## Key Concepts
//!
//! - **AgentEvent**: a decoded trace or answer chunk from the agent stream
//! - **Completion**: the one-shot event stream of a single invocation
//! - **DisplayItem**: what the chat panel shows for an event
//! - **Session**: one browser session's history and agent configuration
//! - **Advisory**: a fixed message replacing a recognized remote failure

pub mod advisory;
pub mod agents;
pub mod holidays;
pub mod logging;
pub mod render;
pub mod session;
pub mod turn;

// Re-export commonly used types
pub use advisory::{classify, Advisory, AdvisoryKind};
pub use agents::{AgentError, AgentEvent, AgentRuntime, Completion, InvokeRequest};
pub use render::{render_event, DisplayItem};
pub use session::{SessionHandle, SessionId, SessionStore};
pub use turn::{run_turn, TurnError, TurnOutcome};
