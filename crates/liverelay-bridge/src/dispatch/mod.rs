//! Dispatcher module exports.
//!
//! Re-exports the dispatcher, the handler trait, and the table types so
//! downstream consumers can depend on this module directly.

pub mod dispatcher;
pub mod table;
pub mod unknown;

pub use dispatcher::{DispatchOutcome, Dispatcher, EventHandler};
pub use table::{DispatchTable, Route, HANDLED_CMDS, IGNORED_CMDS};
pub use unknown::SeenUnknownCmds;
