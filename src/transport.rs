//! The QUIC stream endpoint as seen by the pump.

use std::io;

use crate::{
    buffer::NetworkBuffer,
    error::{ErrorCode, PumpError},
};

/// Outcome of a non-blocking read.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Fill {
    /// This many bytes were appended to the buffer.
    Read(usize),
    /// No bytes are available right now.
    Empty,
    /// The input side has ended and will never yield bytes again.
    Finished,
}

/// Capabilities the pump needs from the stream it reads.
///
/// Every method is non-blocking. Implementations are driven from a single
/// task per stream, see [`StreamDriver`](crate::driver::StreamDriver).
pub trait StreamTransport: Send {
    /// QUIC stream identifier.
    fn stream_id(&self) -> u64;

    /// Append available bytes to `buffer` without exceeding its free space.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error when the read primitive fails.
    fn fill(&mut self, buffer: &mut NetworkBuffer) -> io::Result<Fill>;

    /// Whether the peer has finished the stream.
    ///
    /// May become true only after a read that returned no bytes.
    fn is_stream_finished(&self) -> bool;

    /// Ask to be notified, through
    /// [`StreamConnection::on_fillable`](crate::connection::StreamConnection::on_fillable),
    /// when bytes become readable.
    fn fill_interested(&mut self);

    /// Stop reading; later readiness notifications are suppressed.
    fn shutdown_input(&mut self, code: ErrorCode);

    /// Flush writes produced while delivering the last frame.
    fn flush(&mut self);

    /// Reset the stream after a failure.
    fn close(&mut self, code: ErrorCode, cause: &PumpError);
}
