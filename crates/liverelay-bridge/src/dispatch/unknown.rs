//! Tags already reported as unknown.
//!
//! Lives for the whole process and is shared by every ingest connection so a
//! new upstream tag is reported once, not once per room. Never shrinks and is
//! not persisted across restarts.

use dashmap::DashSet;

#[derive(Debug, Default)]
pub struct SeenUnknownCmds {
    seen: DashSet<String>,
}

impl SeenUnknownCmds {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `cmd`; returns `true` only for the call that first inserted it.
    pub fn first_sight(&self, cmd: &str) -> bool {
        if self.seen.contains(cmd) {
            return false;
        }
        self.seen.insert(cmd.to_string())
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}
