//! Metric helpers for `h3pump`.
//!
//! This module defines metric names and simple helper functions wrapping the
//! [`metrics`](https://docs.rs/metrics) crate. Without the `metrics` feature
//! the helpers compile to no-ops.

#[cfg(feature = "metrics")]
use metrics::{counter, gauge};

/// Name of the counter tracking frames delivered to the application.
pub const FRAMES_TOTAL: &str = "h3pump_frames_total";
/// Name of the counter tracking failed streams.
pub const STREAM_FAILURES_TOTAL: &str = "h3pump_stream_failures_total";
/// Name of the gauge tracking network buffers held by pumps.
pub const NETWORK_BUFFERS_HELD: &str = "h3pump_network_buffers_held";

/// Kind of delivered frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameKind {
    /// HEADERS frames, including trailers.
    Headers,
    /// DATA frames, including synthesised end-of-stream.
    Data,
}

impl FrameKind {
    #[cfg_attr(not(feature = "metrics"), expect(dead_code, reason = "only used as a label"))]
    fn as_str(self) -> &'static str {
        match self {
            FrameKind::Headers => "headers",
            FrameKind::Data => "data",
        }
    }
}

/// Record a frame delivered to the application.
pub fn inc_frames(kind: FrameKind) {
    #[cfg(feature = "metrics")]
    counter!(FRAMES_TOTAL, "kind" => kind.as_str()).increment(1);
    #[cfg(not(feature = "metrics"))]
    let _ = kind;
}

/// Record a stream failure by its [`PumpError::error_type`](crate::error::PumpError::error_type).
pub fn inc_stream_failures(error_type: &'static str) {
    #[cfg(feature = "metrics")]
    counter!(STREAM_FAILURES_TOTAL, "error_type" => error_type).increment(1);
    #[cfg(not(feature = "metrics"))]
    let _ = error_type;
}

/// Record that a pump acquired a network buffer.
pub fn inc_buffers_held() {
    #[cfg(feature = "metrics")]
    gauge!(NETWORK_BUFFERS_HELD).increment(1.0);
}

/// Record that a pump gave its network buffer back.
pub fn dec_buffers_held() {
    #[cfg(feature = "metrics")]
    gauge!(NETWORK_BUFFERS_HELD).decrement(1.0);
}
