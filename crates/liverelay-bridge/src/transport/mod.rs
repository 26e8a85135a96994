//! Transport layer (WebSocket ingest).
//!
//! Exposes the upgrade handler and the codec that turns each frame into a
//! raw event once, before it reaches the dispatcher.

pub mod codec;
pub mod ws;
