//! Parse and fill loop.

use tracing::{debug, trace};

use super::StreamConnection;
use crate::{
    buffer::NetworkBuffer,
    error::{ErrorCode, ProtocolError, Result},
    frame::EMPTY_DATA_FRAME,
    parser::{FrameParser, ParseResult},
    stream::{ApplicationStream, StreamListener},
    transport::{Fill, StreamTransport},
};

impl<T, P, S, L> StreamConnection<T, P, S, L>
where
    T: StreamTransport,
    P: FrameParser,
    S: ApplicationStream,
    L: StreamListener,
{
    /// Parse the held buffer, filling it from the transport until the parser
    /// reports something other than [`ParseResult::NoFrame`] or the transport
    /// runs dry.
    ///
    /// With `fill_interest` set, a dry transport gets read interest armed
    /// before `NoFrame` is returned.
    pub(super) fn parse_and_fill(&mut self, fill_interest: bool) -> Result<ParseResult> {
        trace!(
            stream_id = self.stream_id(),
            fill_interest,
            "parse and fill"
        );
        loop {
            let finished = self.transport.is_stream_finished();
            let result = self
                .parser
                .parse(self.buffer.held(), finished, &mut self.action)?;
            trace!(stream_id = self.stream_id(), result = ?result, "parsed");
            if result != ParseResult::NoFrame {
                return Ok(result);
            }

            self.buffer.replace_if_retained();

            let filled = self.transport.fill(self.buffer.held())?;
            trace!(stream_id = self.stream_id(), filled = ?filled, "filled");
            if matches!(filled, Fill::Read(count) if count > 0) {
                continue;
            }

            if !self.remotely_closed
                && (filled == Fill::Finished || self.transport.is_stream_finished())
            {
                return self.synthesize_end_of_stream();
            }

            if fill_interest && filled != Fill::Finished {
                self.transport.fill_interested();
            }
            return Ok(ParseResult::NoFrame);
        }
    }

    /// Feed a zero-length DATA frame so the application sees end-of-stream
    /// when the peer finished the stream without a frame marked last.
    fn synthesize_end_of_stream(&mut self) -> Result<ParseResult> {
        if !self.parser.is_data_mode() || !self.parser.at_frame_boundary() {
            return Err(ProtocolError::new(
                ErrorCode::RequestIncomplete,
                "stream finished before the message was complete",
            )
            .into());
        }
        debug!(stream_id = self.stream_id(), "detected end of stream");
        let mut terminal = NetworkBuffer::unpooled(&EMPTY_DATA_FRAME);
        self.parser.parse(&mut terminal, true, &mut self.action)?;
        Ok(ParseResult::Frame)
    }
}
