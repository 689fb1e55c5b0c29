//! Human-readable header block decoder.
//!
//! Blocks are UTF-8 text. The first line selects the message kind:
//!
//! - `METHOD target` decodes to a request,
//! - a three-digit status decodes to a response,
//! - `trailers` decodes to a trailer section,
//! - `blocked` reports the block as blocked on dynamic table state,
//! - `!reason` fails with `QPACK_DECOMPRESSION_FAILED`.
//!
//! Remaining lines are `name: value` fields.

use h3pump::{
    BufferSlice,
    Decoded,
    Fields,
    HeaderDecoder,
    MetaData,
    ProtocolError,
    error::ErrorCode,
};

/// [`HeaderDecoder`] for the text format above.
#[derive(Debug, Default)]
pub struct TextDecoder {
    blocks: Vec<BufferSlice>,
}

impl TextDecoder {
    /// Header blocks handed to the decoder, in order.
    ///
    /// The slices are kept, so the network buffers they came from stay
    /// retained.
    #[must_use]
    pub fn blocks(&self) -> &[BufferSlice] { &self.blocks }

    /// Drop the kept blocks.
    pub fn forget_blocks(&mut self) { self.blocks.clear(); }
}

impl HeaderDecoder for TextDecoder {
    fn decode(
        &mut self,
        _stream_id: u64,
        block: BufferSlice,
        _last: bool,
    ) -> Result<Decoded, ProtocolError> {
        let decoded = decode_text(&block);
        self.blocks.push(block);
        decoded
    }
}

fn decode_text(block: &[u8]) -> Result<Decoded, ProtocolError> {
    let text = std::str::from_utf8(block)
        .map_err(|_| ProtocolError::new(ErrorCode::QpackDecompressionFailed, "not utf-8"))?;
    let mut lines = text.lines();
    let first = lines.next().unwrap_or_default();

    if first == "blocked" {
        return Ok(Decoded::Blocked);
    }
    if let Some(reason) = first.strip_prefix('!') {
        return Err(ProtocolError::new(
            ErrorCode::QpackDecompressionFailed,
            reason.to_owned(),
        ));
    }

    let fields = lines
        .filter_map(|line| line.split_once(':'))
        .map(|(name, value)| (name.trim(), value.trim()))
        .collect::<Fields>();

    let metadata = if first == "trailers" {
        MetaData::Trailers { fields }
    } else if let Ok(status) = first.parse::<u16>() {
        MetaData::Response { status, fields }
    } else if let Some((method, target)) = first.split_once(' ') {
        MetaData::Request {
            method: method.to_owned(),
            target: target.to_owned(),
            fields,
        }
    } else {
        return Err(ProtocolError::new(
            ErrorCode::QpackDecompressionFailed,
            format!("unrecognised header block {first:?}"),
        ));
    };
    Ok(Decoded::Ready(metadata))
}
