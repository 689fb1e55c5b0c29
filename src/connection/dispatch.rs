//! Mode-aware frame dispatch.
//!
//! The control procedure loops over HEADERS frames until the message body
//! starts; the data procedure delivers at most one DATA frame per call and
//! leaves further reads to application demand. The two hand over to each
//! other through [`Next`] instead of calling each other.

use tracing::debug;

use super::{Action, Flow, StreamConnection};
use crate::{
    error::{ErrorCode, Result, StateError},
    frame::{DataFrame, HeadersFrame, MetaData},
    metrics::{self, FrameKind},
    parser::{FrameParser, Mode, ParseResult},
    stream::{ApplicationStream, Data, StreamData, StreamListener},
    transport::StreamTransport,
};

/// Procedure to run next.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum Next {
    Stop,
    Control,
    Data { fill_interest: bool },
}

impl<T, P, S, L> StreamConnection<T, P, S, L>
where
    T: StreamTransport,
    P: FrameParser,
    S: ApplicationStream,
    L: StreamListener,
{
    pub(super) fn run(&mut self, mut next: Next) {
        loop {
            let step = match next {
                Next::Stop => return,
                Next::Control => self.process_control_frames(),
                Next::Data { fill_interest } => self.process_data_frames(fill_interest),
            };
            match step {
                Ok(following) => next = following,
                Err(error) => {
                    self.fail(error);
                    return;
                }
            }
        }
    }

    fn process_data_frames(&mut self, fill_interest: bool) -> Result<Next> {
        self.buffer.acquire();
        match self.parse_and_fill(fill_interest)? {
            ParseResult::NoFrame | ParseResult::BlockedFrame => {
                self.buffer.release(false);
                Ok(Next::Stop)
            }
            ParseResult::SwitchMode => {
                debug!(stream_id = self.stream_id(), "leaving data mode");
                self.parser.set_mode(Mode::Control);
                Ok(Next::Control)
            }
            ParseResult::Frame => {
                if let Some(action) = self.action.take() {
                    self.run_action(action);
                }
                // Application reads continue from the held buffer until the
                // stream closes.
                if self.remotely_closed {
                    self.transport.flush();
                    self.buffer.release(false);
                }
                Ok(Next::Stop)
            }
        }
    }

    fn process_control_frames(&mut self) -> Result<Next> {
        self.buffer.acquire();
        loop {
            match self.parse_and_fill(true)? {
                ParseResult::NoFrame | ParseResult::BlockedFrame => {
                    self.buffer.release(false);
                    return Ok(Next::Stop);
                }
                ParseResult::SwitchMode => return Err(StateError::UnexpectedSwitchMode.into()),
                ParseResult::Frame => {
                    let action = self.action.take().ok_or(StateError::MissingAction)?;
                    self.run_action(action);

                    if self.remotely_closed {
                        self.transport.flush();
                        self.buffer.release(false);
                        return Ok(Next::Stop);
                    }
                    if !self.parser.is_data_mode() {
                        continue;
                    }
                    if self.stream.has_demand_or_stall() {
                        if self.buffer.has_remaining() {
                            return Ok(Next::Data {
                                fill_interest: true,
                            });
                        }
                        self.buffer.release(false);
                        self.transport.fill_interested();
                    }
                    return Ok(Next::Stop);
                }
            }
        }
    }

    fn run_action(&mut self, action: Action) {
        match action {
            Action::Headers(frame) => {
                self.process_headers(frame, false);
            }
            Action::Data(frame) => self.process_data(frame),
        }
    }

    pub(super) fn process_headers(&mut self, mut frame: HeadersFrame, was_blocked: bool) -> Flow {
        let stream_id = self.stream_id();
        match &frame.metadata {
            MetaData::Request { .. } => {
                self.parser.set_mode(Mode::Data);
                debug!(
                    stream_id,
                    metadata = %frame.metadata,
                    "switching to data mode for request"
                );
            }
            MetaData::Response { .. } if frame.metadata.is_informational() => {
                debug!(
                    stream_id,
                    metadata = %frame.metadata,
                    "staying in control mode for informational response"
                );
            }
            MetaData::Response { .. } => {
                self.parser.set_mode(Mode::Data);
                debug!(
                    stream_id,
                    metadata = %frame.metadata,
                    "switching to data mode for response"
                );
            }
            MetaData::Trailers { .. } => frame.last = true,
        }

        if frame.last {
            self.shutdown_input();
        }
        metrics::inc_frames(FrameKind::Headers);
        self.listener.on_headers(stream_id, &frame);

        if was_blocked {
            Flow::Resume
        } else {
            Flow::Done
        }
    }

    fn process_data(&mut self, frame: DataFrame) {
        if frame.last {
            self.shutdown_input();
        }
        self.listener.on_data(self.stream_id(), &frame);
        let data = if frame.is_empty() && frame.last {
            Data::Eof
        } else {
            Data::Chunk(StreamData::new(frame))
        };
        metrics::inc_frames(FrameKind::Data);
        self.stream.on_data(data);
    }

    fn shutdown_input(&mut self) {
        self.remotely_closed = true;
        self.transport.shutdown_input(ErrorCode::NoError);
    }
}
