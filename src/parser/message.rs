//! HTTP/3 request-stream parser.

use bytes::Buf;
use tracing::trace;

use super::{
    Decoded,
    FrameParser,
    FrameSink,
    HeaderDecoder,
    Mode,
    ParseResult,
    fragments::HeaderBlock,
    header::FrameHeaderParser,
};
use crate::{
    buffer::{BufferSlice, NetworkBuffer},
    config::StreamConfig,
    error::{ErrorCode, ProtocolError, Result},
    frame::{DataFrame, FrameType, HeadersFrame},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum State {
    Header,
    Body { frame_type: FrameType, remaining: u64 },
    Skip { remaining: u64 },
}

/// Parser for the frames of one HTTP/3 request stream.
///
/// DATA payloads are handed out as zero-copy slices of the network buffer
/// as soon as any part of them is available. HEADERS payloads are sliced
/// when they arrive whole and reassembled in a [`HeaderBlock`] otherwise,
/// then passed to the [`HeaderDecoder`].
///
/// # Examples
///
/// ```
/// use h3pump::{
///     buffer::{BufferSlice, NetworkBuffer},
///     error::ProtocolError,
///     frame::{DataFrame, HeadersFrame, MetaData},
///     parser::{Decoded, FrameParser, FrameSink, HeaderDecoder, MessageParser, Mode, ParseResult},
/// };
///
/// struct AlwaysGet;
///
/// impl HeaderDecoder for AlwaysGet {
///     fn decode(&mut self, _: u64, _: BufferSlice, _: bool) -> Result<Decoded, ProtocolError> {
///         Ok(Decoded::Ready(MetaData::request("GET", "/")))
///     }
/// }
///
/// #[derive(Default)]
/// struct Collect(Vec<HeadersFrame>);
///
/// impl FrameSink for Collect {
///     fn on_headers(&mut self, frame: HeadersFrame) -> h3pump::error::Result<()> {
///         self.0.push(frame);
///         Ok(())
///     }
///
///     fn on_data(&mut self, _: DataFrame) -> h3pump::error::Result<()> { Ok(()) }
/// }
///
/// let mut parser = MessageParser::new(0, AlwaysGet);
/// let mut buffer = NetworkBuffer::unpooled(&[0x01, 0x01, 0xd1]);
/// let mut sink = Collect::default();
/// let result = parser.parse(&mut buffer, false, &mut sink).unwrap();
/// assert_eq!(result, ParseResult::Frame);
/// assert_eq!(sink.0.len(), 1);
/// assert_eq!(parser.mode(), Mode::Control);
/// ```
#[derive(Debug)]
pub struct MessageParser<D> {
    stream_id: u64,
    decoder: D,
    mode: Mode,
    header: FrameHeaderParser,
    state: State,
    block: HeaderBlock,
    max_header_block_size: usize,
}

impl<D: HeaderDecoder> MessageParser<D> {
    /// Create a parser for `stream_id` in control mode.
    #[must_use]
    pub fn new(stream_id: u64, decoder: D) -> Self {
        Self {
            stream_id,
            decoder,
            mode: Mode::Control,
            header: FrameHeaderParser::default(),
            state: State::Header,
            block: HeaderBlock::default(),
            max_header_block_size: StreamConfig::default().max_header_block_size,
        }
    }

    /// Set the largest header block accepted.
    #[must_use]
    pub fn max_header_block_size(mut self, size: usize) -> Self {
        self.max_header_block_size = size;
        self
    }

    /// Stream the parser was created for.
    #[must_use]
    pub fn stream_id(&self) -> u64 { self.stream_id }

    /// Borrow the header decoder.
    #[must_use]
    pub fn decoder(&self) -> &D { &self.decoder }

    /// Mutably borrow the header decoder.
    pub fn decoder_mut(&mut self) -> &mut D { &mut self.decoder }

    fn on_frame_header(&mut self, code: u64, length: u64) -> Result<Option<ParseResult>> {
        let frame_type = FrameType::from_code(code);
        trace!(stream_id = self.stream_id, frame_type = ?frame_type, length, "frame header");
        if !frame_type.is_known() {
            self.state = State::Skip { remaining: length };
            return Ok(None);
        }
        if frame_type == FrameType::Headers && length > self.max_header_block_size as u64 {
            return Err(ProtocolError::new(
                ErrorCode::FrameError,
                format!(
                    "header block of {length} bytes exceeds limit of {}",
                    self.max_header_block_size
                ),
            )
            .into());
        }
        self.state = State::Body {
            frame_type,
            remaining: length,
        };
        if self.mode == Mode::Data && frame_type != FrameType::Data {
            return Ok(Some(ParseResult::SwitchMode));
        }
        Ok(None)
    }

    fn parse_data(
        &mut self,
        buffer: &mut NetworkBuffer,
        remaining: u64,
        finished: bool,
        sink: &mut dyn FrameSink,
    ) -> Result<ParseResult> {
        let available = take_len(remaining, buffer.len());
        if available == 0 && remaining > 0 {
            return Ok(ParseResult::NoFrame);
        }
        let data = if available == 0 {
            BufferSlice::empty()
        } else {
            buffer.split_slice(available)
        };
        let remaining = remaining - available as u64;
        self.state = if remaining == 0 {
            State::Header
        } else {
            State::Body {
                frame_type: FrameType::Data,
                remaining,
            }
        };
        let last = remaining == 0 && !buffer.has_remaining() && finished;
        sink.on_data(DataFrame::new(data, last))?;
        Ok(ParseResult::Frame)
    }

    fn parse_headers(
        &mut self,
        buffer: &mut NetworkBuffer,
        remaining: u64,
        finished: bool,
        sink: &mut dyn FrameSink,
    ) -> Result<ParseResult> {
        let available = take_len(remaining, buffer.len());
        let complete = available as u64 == remaining;
        let block = if self.block.is_empty() && complete {
            if available == 0 {
                BufferSlice::empty()
            } else {
                buffer.split_slice(available)
            }
        } else {
            if available == 0 {
                return Ok(ParseResult::NoFrame);
            }
            self.block.append(&buffer.chunk()[..available], complete);
            buffer.advance(available);
            if !complete {
                self.state = State::Body {
                    frame_type: FrameType::Headers,
                    remaining: remaining - available as u64,
                };
                return Ok(ParseResult::NoFrame);
            }
            BufferSlice::detached(self.block.take())
        };
        self.state = State::Header;

        let last = !buffer.has_remaining() && finished;
        match self.decoder.decode(self.stream_id, block, last)? {
            Decoded::Ready(metadata) => {
                sink.on_headers(HeadersFrame::new(metadata, last))?;
                Ok(ParseResult::Frame)
            }
            Decoded::Blocked => {
                trace!(stream_id = self.stream_id, "header block blocked");
                Ok(ParseResult::BlockedFrame)
            }
        }
    }

    fn skip(&mut self, buffer: &mut NetworkBuffer, remaining: u64) -> bool {
        let available = take_len(remaining, buffer.len());
        buffer.advance(available);
        let remaining = remaining - available as u64;
        if remaining == 0 {
            self.state = State::Header;
            true
        } else {
            self.state = State::Skip { remaining };
            false
        }
    }

    fn unexpected(&self, frame_type: FrameType) -> crate::error::PumpError {
        ProtocolError::new(
            ErrorCode::FrameUnexpected,
            format!(
                "frame type {:#x} not allowed on request stream {} in {:?} mode",
                frame_type.code(),
                self.stream_id,
                self.mode
            ),
        )
        .into()
    }
}

impl<D: HeaderDecoder> FrameParser for MessageParser<D> {
    fn parse(
        &mut self,
        buffer: &mut NetworkBuffer,
        finished: bool,
        sink: &mut dyn FrameSink,
    ) -> Result<ParseResult> {
        loop {
            match self.state {
                State::Header => {
                    let Some((code, length)) = self.header.parse(buffer) else {
                        return Ok(ParseResult::NoFrame);
                    };
                    if let Some(result) = self.on_frame_header(code, length)? {
                        return Ok(result);
                    }
                }
                State::Skip { remaining } => {
                    if !self.skip(buffer, remaining) {
                        return Ok(ParseResult::NoFrame);
                    }
                }
                State::Body {
                    frame_type,
                    remaining,
                } => {
                    return match (frame_type, self.mode) {
                        (FrameType::Data, Mode::Data) => {
                            self.parse_data(buffer, remaining, finished, sink)
                        }
                        (_, Mode::Data) => Ok(ParseResult::SwitchMode),
                        (FrameType::Headers, Mode::Control) => {
                            self.parse_headers(buffer, remaining, finished, sink)
                        }
                        (_, Mode::Control) => Err(self.unexpected(frame_type)),
                    };
                }
            }
        }
    }

    fn mode(&self) -> Mode { self.mode }

    fn set_mode(&mut self, mode: Mode) {
        if self.mode != mode {
            trace!(stream_id = self.stream_id, mode = ?mode, "parser mode changed");
        }
        self.mode = mode;
    }

    fn at_frame_boundary(&self) -> bool {
        self.state == State::Header && !self.header.is_partial() && self.block.is_empty()
    }

    fn configure(&mut self, config: &StreamConfig) {
        self.max_header_block_size = config.max_header_block_size;
    }
}

fn take_len(remaining: u64, available: usize) -> usize {
    usize::try_from(remaining).map_or(available, |remaining| remaining.min(available))
}
