//! Per-connection context passed to dispatch and handlers.

pub mod room;

pub use room::RoomCtx;
