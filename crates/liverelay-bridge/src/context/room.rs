use std::sync::Arc;

/// Immutable metadata for one upstream ingest connection.
///
/// Cheap to clone; handlers receive it by reference for every event.
#[derive(Debug, Clone)]
pub struct RoomCtx {
    room_id: u64,
    session_id: Arc<str>,
}

impl RoomCtx {
    pub fn new(room_id: u64, session_id: impl Into<Arc<str>>) -> Self {
        Self {
            room_id,
            session_id: session_id.into(),
        }
    }

    /// Live room the events belong to.
    pub fn room_id(&self) -> u64 {
        self.room_id
    }

    /// Ingest connection identifier (for correlating log lines).
    pub fn session_id(&self) -> &str {
        &self.session_id
    }
}
