//! Shared error type across liveRelay crates.

use thiserror::Error;

/// Stable error codes (used as metric labels and in logs).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// Event payload missing a required key or of the wrong shape.
    MalformedPayload,
    /// Remote profile lookup failed.
    ProfileLookup,
    /// Remote avatar image fetch failed.
    ImageFetch,
    /// Could not open the downstream relay connection.
    RelayConnect,
    /// Writing a frame to the downstream relay connection failed.
    RelayWrite,
    /// Encoded frame exceeds the configured maximum.
    FrameTooLarge,
    /// Relay queue full or shut down.
    RelayUnavailable,
    /// Invalid configuration.
    BadConfig,
    /// Invalid dispatch table at startup.
    DispatchTable,
    /// Internal error.
    Internal,
}

impl ErrorCode {
    /// String representation used in metric labels.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::MalformedPayload => "MALFORMED_PAYLOAD",
            ErrorCode::ProfileLookup => "PROFILE_LOOKUP",
            ErrorCode::ImageFetch => "IMAGE_FETCH",
            ErrorCode::RelayConnect => "RELAY_CONNECT",
            ErrorCode::RelayWrite => "RELAY_WRITE",
            ErrorCode::FrameTooLarge => "FRAME_TOO_LARGE",
            ErrorCode::RelayUnavailable => "RELAY_UNAVAILABLE",
            ErrorCode::BadConfig => "BAD_CONFIG",
            ErrorCode::DispatchTable => "DISPATCH_TABLE",
            ErrorCode::Internal => "INTERNAL",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, RelayError>;

/// Unified error type used by core and bridge.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("malformed payload: {0}")]
    MalformedPayload(String),
    #[error("profile lookup failed: {0}")]
    ProfileLookup(String),
    #[error("image fetch failed: {0}")]
    ImageFetch(String),
    #[error("relay connect failed: {0}")]
    RelayConnect(String),
    #[error("relay write failed: {0}")]
    RelayWrite(String),
    #[error("frame exceeds maximum size: len={len} max={max}")]
    FrameTooLarge { len: usize, max: usize },
    #[error("relay unavailable: {0}")]
    RelayUnavailable(String),
    #[error("bad config: {0}")]
    BadConfig(String),
    #[error("invalid dispatch table: {0}")]
    DispatchTable(String),
    #[error("internal: {0}")]
    Internal(String),
}

impl RelayError {
    /// Map an error to its stable code.
    pub fn code(&self) -> ErrorCode {
        match self {
            RelayError::MalformedPayload(_) => ErrorCode::MalformedPayload,
            RelayError::ProfileLookup(_) => ErrorCode::ProfileLookup,
            RelayError::ImageFetch(_) => ErrorCode::ImageFetch,
            RelayError::RelayConnect(_) => ErrorCode::RelayConnect,
            RelayError::RelayWrite(_) => ErrorCode::RelayWrite,
            RelayError::FrameTooLarge { .. } => ErrorCode::FrameTooLarge,
            RelayError::RelayUnavailable(_) => ErrorCode::RelayUnavailable,
            RelayError::BadConfig(_) => ErrorCode::BadConfig,
            RelayError::DispatchTable(_) => ErrorCode::DispatchTable,
            RelayError::Internal(_) => ErrorCode::Internal,
        }
    }

    pub(crate) fn malformed(what: impl Into<String>) -> Self {
        RelayError::MalformedPayload(what.into())
    }
}
