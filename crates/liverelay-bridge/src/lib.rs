//! liverelay bridge library entry.
//!
//! This crate wires WS ingest, the dispatch table, the event handler, the
//! avatar cache and the downstream relay into one pipeline. It is consumed by
//! the binary (`main.rs`) and by integration tests.

pub mod app_state;
pub mod avatar;
pub mod config;
pub mod context;
pub mod dispatch;
pub mod obs;
pub mod ops;
pub mod relay;
pub mod router;
pub mod services;
pub mod transport;
