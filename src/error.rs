//! Error types for the stream frame pump.
//!
//! The pump funnels every failure through a single taxonomy so the unified
//! error exit in [`StreamConnection`](crate::connection::StreamConnection) can
//! pick the HTTP/3 error code used to close the stream and notify the
//! listener exactly once.
//!
//! # Error Categories
//!
//! - [`PumpError::Io`]: the transport read primitive failed.
//! - [`StateError`]: an internal invariant of the pump was violated (a second pending action, a
//!   missing action, a mode switch in the wrong mode).
//! - [`ProtocolError`]: the parser or header decoder rejected the bytes on the stream. These carry
//!   their own [`ErrorCode`].

use std::{fmt, io};

use thiserror::Error;

/// HTTP/3 and QPACK application error codes carried on stream resets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ErrorCode {
    /// `H3_NO_ERROR`: graceful shutdown, used when half-closing input.
    NoError,
    /// `H3_GENERAL_PROTOCOL_ERROR`.
    GeneralProtocolError,
    /// `H3_INTERNAL_ERROR`.
    InternalError,
    /// `H3_STREAM_CREATION_ERROR`.
    StreamCreationError,
    /// `H3_CLOSED_CRITICAL_STREAM`.
    ClosedCriticalStream,
    /// `H3_FRAME_UNEXPECTED`: a frame type not permitted on this stream.
    FrameUnexpected,
    /// `H3_FRAME_ERROR`: a frame violated layout or size constraints.
    FrameError,
    /// `H3_EXCESSIVE_LOAD`.
    ExcessiveLoad,
    /// `H3_ID_ERROR`.
    IdError,
    /// `H3_SETTINGS_ERROR`.
    SettingsError,
    /// `H3_MISSING_SETTINGS`.
    MissingSettings,
    /// `H3_REQUEST_REJECTED`.
    RequestRejected,
    /// `H3_REQUEST_CANCELLED`: used for every failure the pump itself raises.
    RequestCancelled,
    /// `H3_REQUEST_INCOMPLETE`: the stream ended in the middle of a frame.
    RequestIncomplete,
    /// `H3_MESSAGE_ERROR`.
    MessageError,
    /// `H3_CONNECT_ERROR`.
    ConnectError,
    /// `H3_VERSION_FALLBACK`.
    VersionFallback,
    /// `QPACK_DECOMPRESSION_FAILED`.
    QpackDecompressionFailed,
    /// `QPACK_ENCODER_STREAM_ERROR`.
    QpackEncoderStreamError,
    /// `QPACK_DECODER_STREAM_ERROR`.
    QpackDecoderStreamError,
}

impl ErrorCode {
    /// Wire value of the error code.
    #[must_use]
    pub const fn code(self) -> u64 {
        match self {
            Self::NoError => 0x100,
            Self::GeneralProtocolError => 0x101,
            Self::InternalError => 0x102,
            Self::StreamCreationError => 0x103,
            Self::ClosedCriticalStream => 0x104,
            Self::FrameUnexpected => 0x105,
            Self::FrameError => 0x106,
            Self::ExcessiveLoad => 0x107,
            Self::IdError => 0x108,
            Self::SettingsError => 0x109,
            Self::MissingSettings => 0x10a,
            Self::RequestRejected => 0x10b,
            Self::RequestCancelled => 0x10c,
            Self::RequestIncomplete => 0x10d,
            Self::MessageError => 0x10e,
            Self::ConnectError => 0x10f,
            Self::VersionFallback => 0x110,
            Self::QpackDecompressionFailed => 0x200,
            Self::QpackEncoderStreamError => 0x201,
            Self::QpackDecoderStreamError => 0x202,
        }
    }

    /// Look up an error code by its wire value.
    ///
    /// Returns `None` for values outside the registered ranges, including the
    /// reserved `0x1f * N + 0x21` codes.
    #[must_use]
    pub const fn from_code(code: u64) -> Option<Self> {
        let value = match code {
            0x100 => Self::NoError,
            0x101 => Self::GeneralProtocolError,
            0x102 => Self::InternalError,
            0x103 => Self::StreamCreationError,
            0x104 => Self::ClosedCriticalStream,
            0x105 => Self::FrameUnexpected,
            0x106 => Self::FrameError,
            0x107 => Self::ExcessiveLoad,
            0x108 => Self::IdError,
            0x109 => Self::SettingsError,
            0x10a => Self::MissingSettings,
            0x10b => Self::RequestRejected,
            0x10c => Self::RequestCancelled,
            0x10d => Self::RequestIncomplete,
            0x10e => Self::MessageError,
            0x10f => Self::ConnectError,
            0x110 => Self::VersionFallback,
            0x200 => Self::QpackDecompressionFailed,
            0x201 => Self::QpackEncoderStreamError,
            0x202 => Self::QpackDecoderStreamError,
            _ => return None,
        };
        Some(value)
    }
}

impl From<ErrorCode> for u64 {
    fn from(code: ErrorCode) -> Self { code.code() }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}({:#x})", self.code())
    }
}

/// Violations of the pump's own invariants.
///
/// These indicate a bug in the pump or in a parser implementation rather than
/// a misbehaving peer, and are never retried.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum StateError {
    /// The parser produced a frame while the previous one was still waiting
    /// to be delivered.
    #[error("a frame action is already pending")]
    ActionPending,
    /// The parser reported a frame in control mode without producing one.
    #[error("frame reported without a pending action")]
    MissingAction,
    /// The parser reported a mode switch while already in control mode.
    #[error("mode switch reported outside data mode")]
    UnexpectedSwitchMode,
}

/// Protocol violations detected while parsing or decoding a stream.
///
/// # Examples
///
/// ```
/// use h3pump::error::{ErrorCode, ProtocolError};
///
/// let err = ProtocolError::new(ErrorCode::FrameUnexpected, "settings frame on request stream");
/// assert_eq!(err.code(), ErrorCode::FrameUnexpected);
/// ```
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("{code}: {reason}")]
pub struct ProtocolError {
    code: ErrorCode,
    reason: String,
}

impl ProtocolError {
    /// Create a protocol error with the code used to reset the stream.
    #[must_use]
    pub fn new(code: ErrorCode, reason: impl Into<String>) -> Self {
        Self {
            code,
            reason: reason.into(),
        }
    }

    /// Error code the stream is closed with.
    #[must_use]
    pub const fn code(&self) -> ErrorCode { self.code }

    /// Human-readable reason.
    #[must_use]
    pub fn reason(&self) -> &str { &self.reason }
}

/// Top-level error produced by the pump.
///
/// Every variant reaches the same exit path: the network buffer is force
/// released, the transport is closed with [`PumpError::error_code`], and the
/// listener receives a single failure notification.
#[derive(Debug, Error)]
pub enum PumpError {
    /// Transport read failure.
    #[error("transport I/O error: {0}")]
    Io(#[from] io::Error),

    /// Internal invariant violation.
    #[error("invalid pump state: {0}")]
    State(#[from] StateError),

    /// Peer protocol violation or undecodable header block.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),
}

impl PumpError {
    /// Code used to close the stream when this error ends it.
    ///
    /// Protocol errors keep their own code; every other failure cancels the
    /// request.
    ///
    /// # Examples
    ///
    /// ```
    /// use h3pump::error::{ErrorCode, PumpError, StateError};
    ///
    /// let err = PumpError::from(StateError::ActionPending);
    /// assert_eq!(err.error_code(), ErrorCode::RequestCancelled);
    /// ```
    #[must_use]
    pub fn error_code(&self) -> ErrorCode {
        match self {
            Self::Protocol(error) => error.code(),
            Self::Io(_) | Self::State(_) => ErrorCode::RequestCancelled,
        }
    }

    /// Returns the error category as a string for logging and metrics.
    ///
    /// One of: `"io"`, `"state"`, or `"protocol"`.
    #[must_use]
    pub fn error_type(&self) -> &'static str {
        match self {
            Self::Io(_) => "io",
            Self::State(_) => "state",
            Self::Protocol(_) => "protocol",
        }
    }
}

/// Result alias used across the pump.
pub type Result<T> = std::result::Result<T, PumpError>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
