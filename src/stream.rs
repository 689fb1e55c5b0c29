//! Application-side receivers of decoded frames.

use bytes::Bytes;

use crate::{
    buffer::BufferSlice,
    error::{ErrorCode, PumpError},
    frame::{DataFrame, HeadersFrame},
};

/// Body bytes handed to the application.
///
/// The bytes are a zero-copy slice of the network buffer. Holding on to a
/// `StreamData` keeps that buffer out of the pool; call
/// [`into_bytes`](Self::into_bytes) to keep the bytes without the lease.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StreamData {
    frame: DataFrame,
}

impl StreamData {
    /// Wrap a DATA frame.
    #[must_use]
    pub fn new(frame: DataFrame) -> Self { Self { frame } }

    /// Payload bytes.
    #[must_use]
    pub fn data(&self) -> &BufferSlice { &self.frame.data }

    /// Whether this chunk ends the stream.
    #[must_use]
    pub fn is_last(&self) -> bool { self.frame.last }

    /// Payload length.
    #[must_use]
    pub fn len(&self) -> usize { self.frame.len() }

    /// Whether the payload is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool { self.frame.is_empty() }

    /// Consume the chunk, releasing its hold on the network buffer.
    #[must_use]
    pub fn into_bytes(self) -> Bytes { self.frame.data.into_bytes() }
}

/// Unit of body delivery.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Data {
    /// The stream ended with no further bytes.
    Eof,
    /// Body bytes, possibly the last.
    Chunk(StreamData),
}

impl Data {
    /// Whether no more data follows.
    #[must_use]
    pub fn is_last(&self) -> bool {
        match self {
            Self::Eof => true,
            Self::Chunk(chunk) => chunk.is_last(),
        }
    }

    /// Payload bytes; empty for [`Data::Eof`].
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        match self {
            Self::Eof => &[],
            Self::Chunk(chunk) => chunk.data(),
        }
    }
}

/// The HTTP/3 stream object that consumes body data.
pub trait ApplicationStream: Send {
    /// Whether the application wants more data, or has stalled in a way that
    /// requires the pump to keep reading.
    fn has_demand_or_stall(&self) -> bool;

    /// Receive the next body chunk.
    fn on_data(&mut self, data: Data);
}

/// Observer of frames and failures on a stream.
///
/// All methods default to no-ops.
pub trait StreamListener: Send {
    /// A HEADERS frame was processed.
    fn on_headers(&mut self, _stream_id: u64, _frame: &HeadersFrame) {}

    /// A DATA frame is about to be handed to the application stream.
    fn on_data(&mut self, _stream_id: u64, _frame: &DataFrame) {}

    /// The stream failed and has been closed with `code`.
    fn on_stream_failure(&mut self, _stream_id: u64, _code: ErrorCode, _error: &PumpError) {}
}
