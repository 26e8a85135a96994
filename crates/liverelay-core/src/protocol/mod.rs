//! Protocol modules: inbound event records and the downstream relay frame.
//!
//! - `event`: untyped records from the live-room client plus tag handling.
//! - `models`: typed messages built from those records.
//! - `frame`: length-prefixed JSON frames written to the relay consumer.
//!
//! All parsers are panic-free: malformed input is reported as `RelayError`
//! instead of panicking or indexing raw buffers.

pub mod event;
pub mod frame;
pub mod models;
