//! Shared state for the HTTP server.

use std::sync::Arc;

use holibot_core::holidays::HolidaySource;
use holibot_core::SessionStore;

/// Shared state available to all HTTP handlers.
pub struct SharedState {
    /// Live browser sessions.
    pub sessions: SessionStore,
    /// Backing data for `POST /api/functions/holidays`.
    pub holidays: Arc<dyn HolidaySource>,
}

impl SharedState {
    pub fn new(sessions: SessionStore, holidays: Arc<dyn HolidaySource>) -> Self {
        Self { sessions, holidays }
    }
}
