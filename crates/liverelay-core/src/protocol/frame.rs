//! Downstream relay frame (panic-free).
//!
//! Wire layout, one frame per forwarded chat message:
//!
//! ```text
//! [len: u32 little-endian][payload: `len` bytes of UTF-8 JSON]
//! ```
//!
//! The payload is `{"uid":..,"uname":..,"msg":..,"face_path":..}` with the
//! keys in that order. External consumers depend on this layout bit-exactly.
//!
//! Parsing rules:
//! - Never index (`buf[0]`); always use `Buf` and `remaining()` checks.
//! - Never `unwrap()` / `expect()` / `panic!()` in production paths.

use bytes::{Buf, BufMut, Bytes, BytesMut};
use serde::{Deserialize, Serialize};

use crate::error::{RelayError, Result};

/// Size of the length header.
pub const FRAME_HEADER_LEN: usize = 4;

/// Default maximum payload size.
pub const DEFAULT_MAX_FRAME_BYTES: usize = 1024 * 1024;

/// Record forwarded to the relay consumer for each chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayPayload {
    pub uid: i64,
    pub uname: String,
    pub msg: String,
    /// Absolute path of the sender's avatar on local disk.
    pub face_path: String,
}

/// Encode one frame: compact JSON prefixed by its byte length.
pub fn encode_frame(payload: &RelayPayload, max_frame_bytes: usize) -> Result<Bytes> {
    let body = serde_json::to_vec(payload)
        .map_err(|e| RelayError::Internal(format!("json encode failed: {e}")))?;

    let len = body.len();
    if len > max_frame_bytes || u32::try_from(len).is_err() {
        return Err(RelayError::FrameTooLarge {
            len,
            max: max_frame_bytes,
        });
    }

    let mut out = BytesMut::with_capacity(FRAME_HEADER_LEN + len);
    out.put_u32_le(len as u32);
    out.put_slice(&body);
    Ok(out.freeze())
}

/// Try to decode one frame from the front of a growable buffer.
///
/// Returns `Ok(None)` until a whole frame is buffered; consumed bytes are
/// split off `buf`.
pub fn try_decode_frame(buf: &mut BytesMut, max_frame_bytes: usize) -> Result<Option<RelayPayload>> {
    if buf.remaining() < FRAME_HEADER_LEN {
        return Ok(None);
    }

    let mut header: &[u8] = buf.as_ref();
    let len = header.get_u32_le() as usize;
    if len > max_frame_bytes {
        return Err(RelayError::FrameTooLarge {
            len,
            max: max_frame_bytes,
        });
    }

    if buf.remaining() < FRAME_HEADER_LEN + len {
        return Ok(None);
    }

    buf.advance(FRAME_HEADER_LEN);
    let body = buf.split_to(len);
    let payload = serde_json::from_slice(&body)
        .map_err(|e| RelayError::malformed(format!("invalid frame json: {e}")))?;
    Ok(Some(payload))
}
