//! Application-side doubles that record deliveries.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use h3pump::{
    ApplicationStream,
    Data,
    DataFrame,
    HeadersFrame,
    MetaData,
    PumpError,
    StreamListener,
    error::ErrorCode,
};

/// [`ApplicationStream`] that keeps every chunk it receives.
#[derive(Debug, Default)]
pub struct RecordingStream {
    demand: bool,
    received: Vec<Data>,
}

impl RecordingStream {
    /// Create a stream with the given read demand.
    #[must_use]
    pub fn new(demand: bool) -> Self {
        Self {
            demand,
            received: Vec::new(),
        }
    }

    /// Change the read demand.
    pub fn set_demand(&mut self, demand: bool) { self.demand = demand; }

    /// Deliveries in order.
    #[must_use]
    pub fn received(&self) -> &[Data] { &self.received }

    /// Concatenated body bytes.
    #[must_use]
    pub fn body(&self) -> Vec<u8> {
        self.received
            .iter()
            .flat_map(|data| data.bytes().iter().copied())
            .collect()
    }

    /// Whether the last delivery ended the stream.
    #[must_use]
    pub fn ended(&self) -> bool { self.received.last().is_some_and(Data::is_last) }

    /// Release every received chunk, and with it any buffer it retains.
    pub fn drain(&mut self) -> Vec<Data> { std::mem::take(&mut self.received) }
}

impl ApplicationStream for RecordingStream {
    fn has_demand_or_stall(&self) -> bool { self.demand }

    fn on_data(&mut self, data: Data) { self.received.push(data); }
}

/// Shared record of listener notifications.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ListenerLog {
    /// Metadata of each HEADERS frame, with its `last` flag.
    pub headers: Vec<(MetaData, bool)>,
    /// Length and `last` flag of each DATA frame.
    pub data: Vec<(usize, bool)>,
    /// Stream id and code of each failure.
    pub failures: Vec<(u64, ErrorCode)>,
    /// Display form of each failure.
    pub errors: Vec<String>,
}

/// [`StreamListener`] writing into a [`ListenerLog`] that survives the pump.
#[derive(Clone, Debug, Default)]
pub struct RecordingListener {
    log: Arc<Mutex<ListenerLog>>,
}

impl RecordingListener {
    /// Snapshot of the notifications so far.
    #[must_use]
    pub fn log(&self) -> ListenerLog { self.lock().clone() }

    fn lock(&self) -> MutexGuard<'_, ListenerLog> {
        self.log.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl StreamListener for RecordingListener {
    fn on_headers(&mut self, _stream_id: u64, frame: &HeadersFrame) {
        self.lock()
            .headers
            .push((frame.metadata.clone(), frame.last));
    }

    fn on_data(&mut self, _stream_id: u64, frame: &DataFrame) {
        self.lock().data.push((frame.len(), frame.last));
    }

    fn on_stream_failure(&mut self, stream_id: u64, code: ErrorCode, error: &PumpError) {
        let mut log = self.lock();
        log.failures.push((stream_id, code));
        log.errors.push(error.to_string());
    }
}
