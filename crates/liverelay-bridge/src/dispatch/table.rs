//! Tag -> route table.
//!
//! Assembled once at startup from two literal lists (plus operator-supplied
//! ignore entries) and never mutated afterwards, so lookups need no locking.

use std::collections::HashMap;

use liverelay_core::error::{RelayError, Result};
use liverelay_core::protocol::models::EventKind;

/// Tags with a typed handler.
pub const HANDLED_CMDS: &[(&str, EventKind)] = &[
    // synthesized by the upstream client from the popularity reply
    ("_HEARTBEAT", EventKind::Heartbeat),
    ("DANMU_MSG", EventKind::Danmaku),
    ("SEND_GIFT", EventKind::Gift),
    ("GUARD_BUY", EventKind::GuardBuy),
    ("SUPER_CHAT_MESSAGE", EventKind::SuperChat),
    ("SUPER_CHAT_MESSAGE_DELETE", EventKind::SuperChatDelete),
];

/// High-frequency tags that are dropped without logging.
pub const IGNORED_CMDS: &[&str] = &[
    "INTERACT_WORD",
    "ROOM_BANNER",
    "ROOM_REAL_TIME_MESSAGE_UPDATE",
    "NOTICE_MSG",
    "COMBO_SEND",
    "COMBO_END",
    "ENTRY_EFFECT",
    "WELCOME_GUARD",
    "WELCOME",
    "ROOM_RANK",
    "ACTIVITY_BANNER_UPDATE_V2",
    "PANEL",
    "SUPER_CHAT_MESSAGE_JPN",
    "USER_TOAST_MSG",
    "ROOM_BLOCK_MSG",
    "LIVE",
    "PREPARING",
    "room_admin_entrance",
    "ROOM_ADMINS",
    "ROOM_CHANGE",
];

/// What to do with a canonical tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Adapt into the given model and hand it to the event handler.
    Handle(EventKind),
    /// Known but uninteresting; drop silently.
    Ignore,
}

#[derive(Debug)]
pub struct DispatchTable {
    routes: HashMap<String, Route>,
}

impl DispatchTable {
    /// Built-in handlers and ignore list.
    pub fn builtin() -> Result<Self> {
        Self::build(HANDLED_CMDS, IGNORED_CMDS, &[])
    }

    /// Built-in table plus operator-configured ignore entries.
    pub fn with_extra_ignored(extra: &[String]) -> Result<Self> {
        Self::build(HANDLED_CMDS, IGNORED_CMDS, extra)
    }

    /// Any tag listed twice, in any combination of lists, is rejected.
    pub fn build(
        handled: &[(&str, EventKind)],
        ignored: &[&str],
        extra_ignored: &[String],
    ) -> Result<Self> {
        let mut routes = HashMap::with_capacity(handled.len() + ignored.len() + extra_ignored.len());

        let entries = handled
            .iter()
            .map(|(cmd, kind)| (*cmd, Route::Handle(*kind)))
            .chain(ignored.iter().map(|cmd| (*cmd, Route::Ignore)))
            .chain(extra_ignored.iter().map(|cmd| (cmd.as_str(), Route::Ignore)));

        for (cmd, route) in entries {
            if cmd.is_empty() || cmd.contains(':') {
                return Err(RelayError::DispatchTable(format!(
                    "tag {cmd:?} is not a canonical tag"
                )));
            }
            if let Some(prev) = routes.insert(cmd.to_string(), route) {
                return Err(RelayError::DispatchTable(format!(
                    "tag {cmd} listed twice ({prev:?} and {route:?})"
                )));
            }
        }

        Ok(Self { routes })
    }

    /// Look up an already-canonicalized tag.
    pub fn lookup(&self, cmd: &str) -> Option<Route> {
        self.routes.get(cmd).copied()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}
