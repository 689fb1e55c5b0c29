//! Frame parsing contract between the pump and a request-stream parser.
//!
//! The pump owns a [`FrameParser`] and repeatedly hands it the unconsumed
//! bytes of its network buffer. A completed frame is not returned directly:
//! the parser offers it to a [`FrameSink`] and reports
//! [`ParseResult::Frame`], and the pump delivers the stored frame before
//! parsing again. [`MessageParser`] is the HTTP/3 implementation.

mod fragments;
mod header;
mod message;

pub use fragments::HeaderBlock;
pub use message::MessageParser;

use crate::{
    buffer::{BufferSlice, NetworkBuffer},
    config::StreamConfig,
    error::{ProtocolError, Result},
    frame::{DataFrame, HeadersFrame, MetaData},
};

/// Outcome of one parse call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParseResult {
    /// Every available byte was consumed without completing a frame.
    NoFrame,
    /// A header block cannot be decoded yet; the frame arrives later through
    /// the unblock path.
    BlockedFrame,
    /// A non-DATA frame header was seen in data mode. The header is kept and
    /// parsing resumes once the caller leaves data mode.
    SwitchMode,
    /// A frame was offered to the sink.
    Frame,
}

/// Grammar the parser currently expects.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Mode {
    /// HEADERS and other non-DATA frames.
    #[default]
    Control,
    /// DATA frames of a message body.
    Data,
}

/// Receiver for frames completed during a parse call.
pub trait FrameSink {
    /// Accept a decoded HEADERS frame.
    ///
    /// # Errors
    ///
    /// Implementations reject a frame when one is already waiting.
    fn on_headers(&mut self, frame: HeadersFrame) -> Result<()>;

    /// Accept a DATA frame.
    ///
    /// # Errors
    ///
    /// Implementations reject a frame when one is already waiting.
    fn on_data(&mut self, frame: DataFrame) -> Result<()>;
}

/// Incremental parser for the frames of one stream.
pub trait FrameParser: Send {
    /// Consume bytes from `buffer`, offering at most one frame to `sink`.
    ///
    /// `finished` tells the parser the transport has no bytes beyond those
    /// in `buffer`, so a frame that drains the buffer is the stream's last.
    ///
    /// # Errors
    ///
    /// Returns a [`PumpError`](crate::error::PumpError) when the bytes violate
    /// the protocol or the sink rejects the frame.
    fn parse(
        &mut self,
        buffer: &mut NetworkBuffer,
        finished: bool,
        sink: &mut dyn FrameSink,
    ) -> Result<ParseResult>;

    /// Current mode.
    fn mode(&self) -> Mode;

    /// Change the mode. Only the pump calls this.
    fn set_mode(&mut self, mode: Mode);

    /// Whether the parser expects DATA frames.
    fn is_data_mode(&self) -> bool { self.mode() == Mode::Data }

    /// Whether no frame is partially parsed.
    fn at_frame_boundary(&self) -> bool;

    /// Apply the stream settings. Called once when the pump is created.
    fn configure(&mut self, _config: &StreamConfig) {}
}

/// Result of decoding a header block.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Decoded {
    /// The block decoded to metadata.
    Ready(MetaData),
    /// The block references dynamic table state that has not arrived yet.
    Blocked,
}

/// Field-section decoder plugged into [`MessageParser`].
pub trait HeaderDecoder: Send {
    /// Decode the encoded block of a HEADERS frame.
    ///
    /// `last` is true when the stream ends with this frame.
    ///
    /// # Errors
    ///
    /// Returns a [`ProtocolError`], typically with
    /// [`ErrorCode::QpackDecompressionFailed`](crate::error::ErrorCode::QpackDecompressionFailed),
    /// when the block cannot be decoded.
    fn decode(
        &mut self,
        stream_id: u64,
        block: BufferSlice,
        last: bool,
    ) -> std::result::Result<Decoded, ProtocolError>;
}
