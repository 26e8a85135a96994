//! Built-in event handlers.

pub mod relay_handler;

pub use relay_handler::RelayHandler;
