//! Frame header (type and length) parsing.

use bytes::Buf;

use crate::varint::VarIntDecoder;

/// Reassembles a frame header split across any number of reads.
#[derive(Debug, Default)]
pub(super) struct FrameHeaderParser {
    decoder: VarIntDecoder,
    frame_type: Option<u64>,
}

impl FrameHeaderParser {
    /// Returns `(type, length)` once both varints are complete.
    pub(super) fn parse(&mut self, src: &mut impl Buf) -> Option<(u64, u64)> {
        if self.frame_type.is_none() {
            self.frame_type = Some(self.decoder.decode(src)?);
        }
        let length = self.decoder.decode(src)?;
        self.frame_type.take().map(|frame_type| (frame_type, length))
    }

    pub(super) fn is_partial(&self) -> bool { self.frame_type.is_some() || self.decoder.is_partial() }
}
