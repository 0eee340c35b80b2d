//! Application state shared across routes

use crate::game::{GameSession, SessionHandle};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub session: SessionHandle,
}

impl AppState {
    /// Create the application state and the game session task. The
    /// caller spawns the returned session.
    pub fn new() -> (Self, GameSession) {
        let (session, handle) = GameSession::new();
        (Self { session: handle }, session)
    }
}
