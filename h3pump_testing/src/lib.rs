//! Utilities for driving an [`h3pump::StreamConnection`] in tests.
//!
//! The helpers replace every collaborator of the pump with an in-memory
//! double: a [`ScriptedTransport`] replays byte chunks, a [`TextDecoder`]
//! decodes readable header blocks, and [`RecordingStream`] /
//! [`RecordingListener`] capture what the pump delivers.
//!
//! ```rust
//! use h3pump_testing::{ScriptedTransport, data_frame, headers_frame, pump};
//!
//! let transport = ScriptedTransport::new(0);
//! transport.push([headers_frame("GET /"), data_frame(b"hi")].concat());
//! transport.finish();
//!
//! let mut pump = pump(transport.clone(), true);
//! pump.on_fillable();
//! assert_eq!(pump.stream().body(), b"hi");
//! ```

pub mod decoder;
pub mod frames;
pub mod logging;
pub mod metrics;
pub mod recorder;
pub mod transport;

use std::sync::Arc;

pub use decoder::TextDecoder;
pub use frames::{data_frame, frame, frame_header, headers_frame, raw_frame};
use h3pump::{DefaultBufferPool, MessageParser, StreamConfig, StreamConnection};
pub use logging::{LoggerHandle, logger};
pub use metrics::{counter_value, gauge_value};
pub use recorder::{ListenerLog, RecordingListener, RecordingStream};
pub use transport::{FinishMode, ScriptedTransport, TransportLog};

/// Pump type assembled from the test doubles.
pub type TestPump =
    StreamConnection<ScriptedTransport, MessageParser<TextDecoder>, RecordingStream, RecordingListener>;

/// Build a pump over `transport` with the default configuration and a fresh
/// pool. `demand` sets the stream's initial read demand.
#[must_use]
pub fn pump(transport: ScriptedTransport, demand: bool) -> TestPump {
    pump_with(
        transport,
        demand,
        Arc::new(DefaultBufferPool::default()),
        StreamConfig::default(),
    )
}

/// Build a pump over `transport` sharing `pool` and using `config`.
#[must_use]
pub fn pump_with(
    transport: ScriptedTransport,
    demand: bool,
    pool: Arc<DefaultBufferPool>,
    config: StreamConfig,
) -> TestPump {
    let parser = MessageParser::new(transport.id(), TextDecoder::default());
    StreamConnection::new(
        transport,
        parser,
        RecordingStream::new(demand),
        RecordingListener::default(),
        pool,
        config,
    )
}
