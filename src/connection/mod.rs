//! Frame pump for a single HTTP/3 request stream.
//!
//! A [`StreamConnection`] sits between a QUIC stream and the application.
//! Each readability notification parses buffered bytes, filling the buffer
//! from the transport as needed, and delivers decoded frames one at a time.
//! HEADERS frames are processed eagerly; once the message body starts the
//! pump delivers a DATA frame only when the application asks for one,
//! either directly through [`receive`](StreamConnection::receive) or by
//! reporting demand when the stream becomes readable.
//!
//! All entry points take `&mut self`. Callers on other threads go through a
//! [`StreamHandle`](crate::driver::StreamHandle) so the pump is only ever
//! run by its driver task.

mod action;
mod buffer_slot;
mod dispatch;
mod fill;

use std::{fmt, sync::Arc};

use action::{Action, ActionSlot};
use buffer_slot::BufferSlot;
use dispatch::Next;
use tracing::{debug, warn};

use crate::{
    buffer::BufferPool,
    config::StreamConfig,
    error::PumpError,
    frame::HeadersFrame,
    metrics,
    parser::FrameParser,
    stream::{ApplicationStream, StreamListener},
    transport::StreamTransport,
};

/// Whether processing a frame requires the pump to run again.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flow {
    /// Nothing further to do.
    Done,
    /// A previously blocked frame was delivered; parsing must resume.
    Resume,
}

/// The pump for one stream.
///
/// Generic over the transport `T`, the frame parser `P`, the application
/// stream `S` receiving body data, and the listener `L` observing frames and
/// failures.
pub struct StreamConnection<T, P, S, L> {
    transport: T,
    parser: P,
    stream: S,
    listener: L,
    buffer: BufferSlot,
    action: ActionSlot,
    remotely_closed: bool,
    failed: bool,
}

impl<T, P, S, L> StreamConnection<T, P, S, L>
where
    T: StreamTransport,
    P: FrameParser,
    S: ApplicationStream,
    L: StreamListener,
{
    /// Create the pump for a newly accepted stream.
    ///
    /// The parser is configured from `config` before use.
    #[must_use]
    pub fn new(
        transport: T,
        mut parser: P,
        stream: S,
        listener: L,
        pool: Arc<dyn BufferPool>,
        config: StreamConfig,
    ) -> Self {
        let stream_id = transport.stream_id();
        parser.configure(&config);
        Self {
            transport,
            parser,
            stream,
            listener,
            buffer: BufferSlot::new(
                pool,
                config.input_buffer_size,
                config.use_input_direct_buffers,
            ),
            action: ActionSlot::new(stream_id),
            remotely_closed: false,
            failed: false,
        }
    }

    /// Arm read interest for the first bytes of the stream.
    pub fn on_open(&mut self) {
        debug!(stream_id = self.stream_id(), "stream opened");
        self.transport.fill_interested();
    }

    /// Handle a readability notification.
    pub fn on_fillable(&mut self) {
        if self.failed {
            return;
        }
        let data_mode = self.parser.is_data_mode();
        debug!(stream_id = self.stream_id(), data_mode, "fillable");
        let next = if data_mode {
            Next::Data {
                fill_interest: true,
            }
        } else {
            Next::Control
        };
        self.run(next);
    }

    /// Deliver the next DATA frame on behalf of the application.
    ///
    /// Read interest is not armed when no bytes are available: the
    /// application decides when to ask again.
    pub fn receive(&mut self) {
        if self.failed {
            return;
        }
        debug!(stream_id = self.stream_id(), "receiving");
        self.run(Next::Data {
            fill_interest: false,
        });
    }

    /// Deliver a HEADERS frame whose decoding was blocked, then resume
    /// parsing the bytes that followed it.
    pub fn on_headers_unblocked(&mut self, frame: HeadersFrame) {
        if self.failed {
            return;
        }
        debug!(
            stream_id = self.stream_id(),
            metadata = %frame.metadata,
            "received unblocked headers"
        );
        if self.process_headers(frame, true) == Flow::Resume {
            self.on_fillable();
        }
    }

    /// Idle timeouts belong to the stream object; the pump never handles them.
    #[must_use]
    pub fn on_read_timeout(&mut self) -> bool { false }

    /// Stream identifier of the transport.
    #[must_use]
    pub fn stream_id(&self) -> u64 { self.transport.stream_id() }

    /// Whether the parser expects DATA frames.
    #[must_use]
    pub fn is_data_mode(&self) -> bool { self.parser.is_data_mode() }

    /// Whether a frame marked last has been processed.
    #[must_use]
    pub fn is_remotely_closed(&self) -> bool { self.remotely_closed }

    /// Whether the stream failed and was closed.
    #[must_use]
    pub fn is_failed(&self) -> bool { self.failed }

    /// Whether a decoded frame awaits delivery.
    #[must_use]
    pub fn has_pending_action(&self) -> bool { self.action.is_pending() }

    /// Whether a network buffer is currently held.
    #[must_use]
    pub fn holds_buffer(&self) -> bool { self.buffer.is_held() }

    /// Borrow the transport.
    #[must_use]
    pub fn transport(&self) -> &T { &self.transport }

    /// Borrow the parser.
    #[must_use]
    pub fn parser(&self) -> &P { &self.parser }

    /// Borrow the application stream.
    #[must_use]
    pub fn stream(&self) -> &S { &self.stream }

    /// Mutably borrow the application stream.
    pub fn stream_mut(&mut self) -> &mut S { &mut self.stream }

    /// Borrow the listener.
    #[must_use]
    pub fn listener(&self) -> &L { &self.listener }

    fn fail(&mut self, error: PumpError) {
        self.buffer.release(true);
        self.action.clear();
        self.failed = true;

        let stream_id = self.stream_id();
        let code = error.error_code();
        warn!(
            stream_id,
            error_type = error.error_type(),
            code = %code,
            error = %error,
            "stream failed"
        );
        metrics::inc_stream_failures(error.error_type());
        self.transport.close(code, &error);
        self.listener.on_stream_failure(stream_id, code, &error);
    }
}

impl<T, P, S, L> fmt::Display for StreamConnection<T, P, S, L>
where
    T: StreamTransport,
    P: FrameParser,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "StreamConnection[id={},dataMode={},remotelyClosed={}]",
            self.transport.stream_id(),
            self.parser.is_data_mode(),
            self.remotely_closed
        )
    }
}

impl<T, P, S, L> fmt::Debug for StreamConnection<T, P, S, L>
where
    T: StreamTransport,
    P: FrameParser,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamConnection")
            .field("stream_id", &self.transport.stream_id())
            .field("mode", &self.parser.mode())
            .field("remotely_closed", &self.remotely_closed)
            .field("failed", &self.failed)
            .field("holds_buffer", &self.buffer.is_held())
            .field("pending_action", &self.action.is_pending())
            .finish()
    }
}
