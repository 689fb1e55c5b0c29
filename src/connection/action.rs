//! One-shot slot holding the frame the parser just completed.

use tracing::debug;

use crate::{
    error::{Result, StateError},
    frame::{DataFrame, HeadersFrame},
    parser::FrameSink,
};

/// Deferred delivery of a decoded frame.
#[derive(Debug)]
pub(super) enum Action {
    Headers(HeadersFrame),
    Data(DataFrame),
}

/// Holds at most one [`Action`] between a parse call and its delivery.
#[derive(Debug)]
pub(super) struct ActionSlot {
    stream_id: u64,
    pending: Option<Action>,
}

impl ActionSlot {
    pub(super) fn new(stream_id: u64) -> Self {
        Self {
            stream_id,
            pending: None,
        }
    }

    fn set(&mut self, action: Action) -> Result<()> {
        if self.pending.is_some() {
            return Err(StateError::ActionPending.into());
        }
        self.pending = Some(action);
        Ok(())
    }

    pub(super) fn take(&mut self) -> Option<Action> { self.pending.take() }

    pub(super) fn clear(&mut self) { self.pending = None; }

    pub(super) fn is_pending(&self) -> bool { self.pending.is_some() }
}

impl FrameSink for ActionSlot {
    fn on_headers(&mut self, frame: HeadersFrame) -> Result<()> {
        debug!(
            stream_id = self.stream_id,
            metadata = %frame.metadata,
            last = frame.last,
            "received headers"
        );
        self.set(Action::Headers(frame))
    }

    fn on_data(&mut self, frame: DataFrame) -> Result<()> {
        debug!(
            stream_id = self.stream_id,
            len = frame.len(),
            last = frame.last,
            "received data"
        );
        self.set(Action::Data(frame))
    }
}
