//! Builders for encoded HTTP/3 frames.

use h3pump::{FrameType, frame::encode_frame, varint};

/// Encode one frame of `frame_type` carrying `payload`.
///
/// # Panics
///
/// Panics if the payload length cannot be encoded as a varint.
#[must_use]
pub fn frame(frame_type: FrameType, payload: &[u8]) -> Vec<u8> { raw_frame(frame_type.code(), payload) }

/// Encode one frame with an arbitrary type code, such as a reserved type.
///
/// # Panics
///
/// Panics if the payload length cannot be encoded as a varint.
#[must_use]
pub fn raw_frame(frame_type: u64, payload: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(payload.len() + 16);
    assert!(
        encode_frame(frame_type, payload, &mut out),
        "frame of {} bytes is not encodable",
        payload.len()
    );
    out
}

/// Encode a HEADERS frame whose block is `text` in the
/// [`TextDecoder`](crate::TextDecoder) format.
#[must_use]
pub fn headers_frame(text: &str) -> Vec<u8> { frame(FrameType::Headers, text.as_bytes()) }

/// Encode a DATA frame.
#[must_use]
pub fn data_frame(payload: &[u8]) -> Vec<u8> { frame(FrameType::Data, payload) }

/// Encode only the header of a frame announcing `length` payload bytes.
///
/// # Panics
///
/// Panics if either value exceeds [`varint::MAX`].
#[must_use]
pub fn frame_header(frame_type: FrameType, length: u64) -> Vec<u8> {
    let mut out = Vec::with_capacity(16);
    assert!(
        varint::encode(frame_type.code(), &mut out) && varint::encode(length, &mut out),
        "frame header not encodable"
    );
    out
}
