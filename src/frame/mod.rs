//! HTTP/3 request-stream frames (RFC 9114 §7).
//!
//! Every frame starts with a variable-length integer type followed by a
//! variable-length integer payload length. Only DATA and HEADERS carry
//! message content on a request stream; the remaining registered types are
//! either control-stream frames or HTTP/2 leftovers that a request stream
//! must reject. Reserved types (`0x1f * N + 0x21`) and unregistered types are
//! ignored.

mod metadata;

use bytes::BufMut;
pub use metadata::{Fields, MetaData};

use crate::{buffer::BufferSlice, varint};

/// Wire form of a zero-length DATA frame.
///
/// Fed to the parser to synthesise end-of-stream when the transport reports
/// the stream finished without a final frame.
pub const EMPTY_DATA_FRAME: [u8; 2] = [0x00, 0x00];

/// Frame type identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FrameType {
    /// `DATA` (0x00).
    Data,
    /// `HEADERS` (0x01).
    Headers,
    /// `CANCEL_PUSH` (0x03).
    CancelPush,
    /// `SETTINGS` (0x04).
    Settings,
    /// `PUSH_PROMISE` (0x05).
    PushPromise,
    /// `GOAWAY` (0x07).
    Goaway,
    /// `MAX_PUSH_ID` (0x0d).
    MaxPushId,
    /// HTTP/2 frame type with no HTTP/3 meaning (0x02, 0x06, 0x08, 0x09).
    Http2(u64),
    /// Reserved grease type.
    Reserved(u64),
    /// Any other unregistered type.
    Unknown(u64),
}

impl FrameType {
    /// Classify a wire value.
    #[must_use]
    pub const fn from_code(code: u64) -> Self {
        match code {
            0x00 => Self::Data,
            0x01 => Self::Headers,
            0x03 => Self::CancelPush,
            0x04 => Self::Settings,
            0x05 => Self::PushPromise,
            0x07 => Self::Goaway,
            0x0d => Self::MaxPushId,
            0x02 | 0x06 | 0x08 | 0x09 => Self::Http2(code),
            _ if is_reserved(code) => Self::Reserved(code),
            _ => Self::Unknown(code),
        }
    }

    /// Wire value of the type.
    #[must_use]
    pub const fn code(self) -> u64 {
        match self {
            Self::Data => 0x00,
            Self::Headers => 0x01,
            Self::CancelPush => 0x03,
            Self::Settings => 0x04,
            Self::PushPromise => 0x05,
            Self::Goaway => 0x07,
            Self::MaxPushId => 0x0d,
            Self::Http2(code) | Self::Reserved(code) | Self::Unknown(code) => code,
        }
    }

    /// Whether receivers must act on this type rather than skip it.
    #[must_use]
    pub const fn is_known(self) -> bool { !matches!(self, Self::Reserved(_) | Self::Unknown(_)) }
}

/// Whether `code` is a reserved frame type of the form `0x1f * N + 0x21`.
#[must_use]
pub const fn is_reserved(code: u64) -> bool { code >= 0x21 && (code - 0x21) % 0x1f == 0 }

/// Decoded HEADERS frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HeadersFrame {
    /// Decoded header block.
    pub metadata: MetaData,
    /// Whether the stream ends after this frame.
    pub last: bool,
}

impl HeadersFrame {
    /// Create a HEADERS frame.
    #[must_use]
    pub fn new(metadata: MetaData, last: bool) -> Self { Self { metadata, last } }
}

/// DATA frame payload, or the part of it available so far.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DataFrame {
    /// Payload bytes, sliced from the network buffer without copying.
    pub data: BufferSlice,
    /// Whether the stream ends after this payload.
    pub last: bool,
}

impl DataFrame {
    /// Create a DATA frame.
    #[must_use]
    pub fn new(data: BufferSlice, last: bool) -> Self { Self { data, last } }

    /// Payload length.
    #[must_use]
    pub fn len(&self) -> usize { self.data.len() }

    /// Whether the payload is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool { self.data.is_empty() }
}

/// Append a frame header for a payload of `length` bytes.
///
/// Returns `false` without writing if either value exceeds [`varint::MAX`].
pub fn encode_frame_header(frame_type: u64, length: u64, dst: &mut impl BufMut) -> bool {
    if varint::encoded_len(frame_type).is_none() || varint::encoded_len(length).is_none() {
        return false;
    }
    varint::encode(frame_type, dst) && varint::encode(length, dst)
}

/// Append a complete frame.
///
/// # Examples
///
/// ```
/// use h3pump::frame::{FrameType, encode_frame};
///
/// let mut wire = Vec::new();
/// assert!(encode_frame(FrameType::Data.code(), b"hi", &mut wire));
/// assert_eq!(wire, [0x00, 0x02, b'h', b'i']);
/// ```
pub fn encode_frame(frame_type: u64, payload: &[u8], dst: &mut impl BufMut) -> bool {
    if !encode_frame_header(frame_type, payload.len() as u64, dst) {
        return false;
    }
    dst.put_slice(payload);
    true
}

#[cfg(test)]
mod tests;
