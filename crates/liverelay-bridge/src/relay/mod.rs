//! Downstream relay.
//!
//! `sender` owns the single outbound connection and its reconnect rule;
//! `worker` feeds it from a bounded queue so ingest never waits on the
//! downstream consumer and frames leave in enqueue order.

pub mod sender;
pub mod worker;

pub use sender::{ConnState, Connector, RelaySender, TcpConnector};
pub use worker::{relay_channel, spawn_relay, RelayHandle, RelayJob, RelayRuntime, RelayWorker};
