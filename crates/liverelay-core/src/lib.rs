//! liveRelay core: transport-agnostic event records, typed models, the relay
//! frame codec, and the shared error type.
//!
//! This crate carries no runtime or network dependencies so the models and
//! the downstream wire format can be reused by consumers of the relay.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here. Malformed event
//! payloads and truncated frames surface as `RelayError` so a single bad
//! record never takes the pipeline down.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod protocol;

/// Shared result type.
pub use error::{ErrorCode, RelayError, Result};
