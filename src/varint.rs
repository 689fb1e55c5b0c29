//! QUIC variable-length integers (RFC 9000 §16).
//!
//! HTTP/3 frame types and lengths use this encoding. The decoder is
//! incremental: it accepts one byte at a time so a frame header split across
//! any number of reads is reassembled without buffering the whole header.

use bytes::{Buf, BufMut};

/// Largest encodable value, `2^62 - 1`.
pub const MAX: u64 = (1 << 62) - 1;

/// Number of bytes needed to encode `value`, or `None` if it exceeds [`MAX`].
#[must_use]
pub const fn encoded_len(value: u64) -> Option<usize> {
    match value {
        0..=63 => Some(1),
        64..=16_383 => Some(2),
        16_384..=1_073_741_823 => Some(4),
        1_073_741_824..=MAX => Some(8),
        _ => None,
    }
}

/// Append `value` to `dst` in its shortest encoding.
///
/// Returns `false` without writing when `value` exceeds [`MAX`].
#[expect(
    clippy::cast_possible_truncation,
    reason = "each arm only truncates values already bounded by encoded_len"
)]
pub fn encode(value: u64, dst: &mut impl BufMut) -> bool {
    match encoded_len(value) {
        Some(1) => dst.put_u8(value as u8),
        Some(2) => dst.put_u16(value as u16 | 0x4000),
        Some(4) => dst.put_u32(value as u32 | 0x8000_0000),
        Some(_) => dst.put_u64(value | 0xc000_0000_0000_0000),
        None => return false,
    }
    true
}

/// Incremental varint decoder.
///
/// # Examples
///
/// ```
/// use h3pump::varint::VarIntDecoder;
///
/// let mut decoder = VarIntDecoder::default();
/// let mut first: &[u8] = &[0x40];
/// assert_eq!(decoder.decode(&mut first), None);
/// let mut second: &[u8] = &[0x25];
/// assert_eq!(decoder.decode(&mut second), Some(37));
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct VarIntDecoder {
    value: u64,
    needed: u8,
}

impl VarIntDecoder {
    /// Consume bytes from `src` until a value completes or `src` runs dry.
    ///
    /// Returns the decoded value once complete and resets for the next one.
    pub fn decode(&mut self, src: &mut impl Buf) -> Option<u64> {
        while src.has_remaining() {
            let byte = src.get_u8();
            if self.needed == 0 {
                let len = 1u8 << (byte >> 6);
                self.value = u64::from(byte & 0x3f);
                self.needed = len - 1;
            } else {
                self.value = (self.value << 8) | u64::from(byte);
                self.needed -= 1;
            }
            if self.needed == 0 {
                let value = self.value;
                self.value = 0;
                return Some(value);
            }
        }
        None
    }

    /// Whether a value is partially decoded.
    #[must_use]
    pub fn is_partial(&self) -> bool { self.needed != 0 }
}
