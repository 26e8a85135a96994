//! Decode-once codec for the ingest socket.
//!
//! - Text frames => one `RawEvent` each (size checked before parsing)
//! - Binary frames are not part of the ingest protocol and are surfaced as-is
//! - Ping/Pong/Close are surfaced for lifecycle management

use axum::extract::ws::Message;
use liverelay_core::{
    error::{RelayError, Result},
    protocol::event::RawEvent,
};

#[derive(Debug)]
pub enum Inbound {
    Event { raw: RawEvent, bytes_len: usize },
    Binary { bytes_len: usize },
    Ping(Vec<u8>),
    Pong(Vec<u8>),
    Close,
}

/// Decode one socket message. Text frames larger than `max_frame_bytes` are
/// rejected without being parsed.
pub fn decode(msg: Message, max_frame_bytes: usize) -> Result<Inbound> {
    match msg {
        Message::Text(s) => {
            let bytes_len = s.len();
            if bytes_len > max_frame_bytes {
                return Err(RelayError::FrameTooLarge {
                    len: bytes_len,
                    max: max_frame_bytes,
                });
            }
            let raw = RawEvent::from_json(&s)?;
            Ok(Inbound::Event { raw, bytes_len })
        }
        Message::Binary(b) => Ok(Inbound::Binary { bytes_len: b.len() }),
        Message::Ping(v) => Ok(Inbound::Ping(v)),
        Message::Pong(v) => Ok(Inbound::Pong(v)),
        Message::Close(_) => Ok(Inbound::Close),
    }
}
