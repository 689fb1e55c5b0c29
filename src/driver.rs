//! Task that owns a stream's pump and serialises every call into it.
//!
//! Readiness notifications from the QUIC layer, demand from the application
//! and unblocked header blocks from the QPACK decoder may originate on any
//! thread. They are sent as [`StreamEvent`]s through a [`StreamHandle`] and
//! applied one at a time by [`StreamDriver::run`], so the pump is never
//! entered concurrently.

use log::info;
use thiserror::Error;
use tokio::{sync::mpsc, task::JoinHandle};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::{
    connection::StreamConnection,
    frame::HeadersFrame,
    parser::FrameParser,
    stream::{ApplicationStream, StreamListener},
    transport::StreamTransport,
};

/// Notification applied to a pump.
#[derive(Debug)]
pub enum StreamEvent {
    /// The transport has bytes to read.
    Readable,
    /// The application wants the next DATA frame.
    Demand,
    /// A blocked header block finished decoding.
    Unblocked(HeadersFrame),
    /// The stream has been idle for its read timeout.
    ReadTimeout,
}

/// Errors returned by [`StreamHandle`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DriverError {
    /// The driver task has stopped.
    #[error("stream driver closed")]
    Closed,
    /// The event queue is full.
    #[error("stream driver queue full")]
    Full,
}

/// Cloneable sender of [`StreamEvent`]s.
#[derive(Clone, Debug)]
pub struct StreamHandle {
    stream_id: u64,
    tx: mpsc::Sender<StreamEvent>,
}

impl StreamHandle {
    /// Stream the handle feeds.
    #[must_use]
    pub fn stream_id(&self) -> u64 { self.stream_id }

    /// Queue an event, waiting for room.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError::Closed`] once the driver has stopped.
    pub async fn send(&self, event: StreamEvent) -> Result<(), DriverError> {
        self.tx.send(event).await.map_err(|_| DriverError::Closed)
    }

    /// Queue an event without waiting.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError::Full`] when the queue has no room and
    /// [`DriverError::Closed`] once the driver has stopped.
    pub fn try_send(&self, event: StreamEvent) -> Result<(), DriverError> {
        self.tx.try_send(event).map_err(|error| match error {
            mpsc::error::TrySendError::Full(_) => DriverError::Full,
            mpsc::error::TrySendError::Closed(_) => DriverError::Closed,
        })
    }

    /// Signal that the transport is readable.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError::Closed`] once the driver has stopped.
    pub async fn readable(&self) -> Result<(), DriverError> { self.send(StreamEvent::Readable).await }

    /// Ask for the next DATA frame.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError::Closed`] once the driver has stopped.
    pub async fn demand(&self) -> Result<(), DriverError> { self.send(StreamEvent::Demand).await }

    /// Deliver a HEADERS frame that was blocked on QPACK state.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError::Closed`] once the driver has stopped.
    pub async fn unblocked(&self, frame: HeadersFrame) -> Result<(), DriverError> {
        self.send(StreamEvent::Unblocked(frame)).await
    }

    /// Whether the driver has stopped.
    #[must_use]
    pub fn is_closed(&self) -> bool { self.tx.is_closed() }
}

/// Owner of one [`StreamConnection`] inside a tokio task.
pub struct StreamDriver<T, P, S, L> {
    connection: StreamConnection<T, P, S, L>,
    rx: mpsc::Receiver<StreamEvent>,
    shutdown: CancellationToken,
}

impl<T, P, S, L> StreamDriver<T, P, S, L>
where
    T: StreamTransport,
    P: FrameParser,
    S: ApplicationStream,
    L: StreamListener,
{
    /// Create a driver with an event queue of `capacity` entries, at least
    /// one.
    #[must_use]
    pub fn new(
        connection: StreamConnection<T, P, S, L>,
        capacity: usize,
        shutdown: CancellationToken,
    ) -> (Self, StreamHandle) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let handle = StreamHandle {
            stream_id: connection.stream_id(),
            tx,
        };
        (
            Self {
                connection,
                rx,
                shutdown,
            },
            handle,
        )
    }

    /// Get a clone of the shutdown token used by the driver.
    #[must_use]
    pub fn shutdown_token(&self) -> CancellationToken { self.shutdown.clone() }

    /// Apply events until shutdown, until every handle is dropped, or until
    /// the stream fails.
    ///
    /// Returns the pump so callers can inspect its final state.
    pub async fn run(mut self) -> StreamConnection<T, P, S, L> {
        let stream_id = self.connection.stream_id();
        if self.shutdown.is_cancelled() {
            info!("stream driver aborted before start: stream_id={stream_id}");
            return self.connection;
        }
        info!("stream driver started: stream_id={stream_id}");
        self.connection.on_open();

        while let Some(event) = self.next_event().await {
            self.apply(event);
            if self.connection.is_failed() {
                break;
            }
        }

        info!(
            "stream driver stopped: stream_id={stream_id}, failed={}, remotely_closed={}",
            self.connection.is_failed(),
            self.connection.is_remotely_closed()
        );
        self.connection
    }

    /// Await the next event, observing shutdown first.
    #[expect(
        clippy::integer_division_remainder_used,
        reason = "tokio::select! expands to modulus operations internally"
    )]
    async fn next_event(&mut self) -> Option<StreamEvent> {
        tokio::select! {
            biased;

            () = self.shutdown.cancelled() => None,
            event = self.rx.recv() => event,
        }
    }

    fn apply(&mut self, event: StreamEvent) {
        debug!(stream_id = self.connection.stream_id(), event = ?event, "stream event");
        match event {
            StreamEvent::Readable => self.connection.on_fillable(),
            StreamEvent::Demand => self.connection.receive(),
            StreamEvent::Unblocked(frame) => self.connection.on_headers_unblocked(frame),
            StreamEvent::ReadTimeout => {
                if !self.connection.on_read_timeout() {
                    debug!(
                        stream_id = self.connection.stream_id(),
                        "read timeout left to the stream"
                    );
                }
            }
        }
    }
}

impl<T, P, S, L> StreamDriver<T, P, S, L>
where
    T: StreamTransport + 'static,
    P: FrameParser + 'static,
    S: ApplicationStream + 'static,
    L: StreamListener + 'static,
{
    /// Run the driver on the current tokio runtime.
    #[must_use]
    pub fn spawn(self) -> JoinHandle<StreamConnection<T, P, S, L>> { tokio::spawn(self.run()) }
}
