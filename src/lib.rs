#![doc(html_root_url = "https://docs.rs/h3pump/latest")]
//! Public API for the `h3pump` library.
//!
//! This crate reads HTTP/3 frames from a QUIC request stream and delivers
//! them to the application: header blocks eagerly, body data on demand.
//! It provides the per-stream pump, pooled network buffers with zero-copy
//! body slices, an incremental frame parser, and a task driver that
//! serialises readiness notifications.

pub mod buffer;
pub mod config;
pub mod connection;
pub mod driver;
pub mod error;
pub mod frame;
pub mod metrics;
pub mod parser;
pub mod stream;
pub mod transport;
pub mod varint;

pub use buffer::{BufferPool, BufferSlice, DefaultBufferPool, NetworkBuffer, PoolStats};
pub use config::StreamConfig;
pub use connection::StreamConnection;
pub use driver::{DriverError, StreamDriver, StreamEvent, StreamHandle};
pub use error::{ErrorCode, ProtocolError, PumpError, Result, StateError};
pub use frame::{DataFrame, Fields, FrameType, HeadersFrame, MetaData};
pub use metrics::{FRAMES_TOTAL, FrameKind, NETWORK_BUFFERS_HELD, STREAM_FAILURES_TOTAL};
pub use parser::{
    Decoded,
    FrameParser,
    FrameSink,
    HeaderDecoder,
    MessageParser,
    Mode,
    ParseResult,
};
pub use stream::{ApplicationStream, Data, StreamData, StreamListener};
pub use transport::{Fill, StreamTransport};
