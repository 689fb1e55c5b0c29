#![cfg(not(loom))]
//! Tests for the task that serialises events into a pump.

use h3pump::{
    Data,
    DriverError,
    HeadersFrame,
    MetaData,
    StreamDriver,
    StreamEvent,
    error::ErrorCode,
};
use h3pump_testing::{ScriptedTransport, TestPump, data_frame, frame, headers_frame, pump};
use rstest::{fixture, rstest};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing_test::traced_test;

#[allow(
    unused_braces,
    reason = "rustc false positive for single line rstest fixtures"
)]
#[fixture]
fn transport() -> ScriptedTransport { ScriptedTransport::new(40) }

fn spawn(
    transport: &ScriptedTransport,
    demand: bool,
) -> (JoinHandle<TestPump>, h3pump::StreamHandle, CancellationToken) {
    let shutdown = CancellationToken::new();
    let (driver, handle) = StreamDriver::new(pump(transport.clone(), demand), 8, shutdown.clone());
    (driver.spawn(), handle, shutdown)
}

#[rstest]
#[tokio::test]
async fn events_are_applied_in_order(transport: ScriptedTransport) {
    transport.push([headers_frame("GET /stream"), data_frame(b"one"), data_frame(b"two")].concat());
    transport.finish();
    let (task, handle, _shutdown) = spawn(&transport, false);

    handle.readable().await.expect("driver running");
    for _ in 0..3 {
        handle.demand().await.expect("driver running");
    }
    drop(handle);

    let pump = task.await.expect("driver task panicked");
    assert_eq!(pump.listener().log().headers.len(), 1);
    assert_eq!(pump.stream().body(), b"onetwo");
    assert_eq!(pump.stream().received().len(), 2);
    assert!(pump.stream().ended());
    assert!(matches!(pump.stream().received()[0], Data::Chunk(ref chunk) if !chunk.is_last()));
    assert_eq!(transport.log().interest, 1, "only on_open arms interest");
}

#[rstest]
#[tokio::test]
async fn cancellation_stops_a_driver_with_live_handles(transport: ScriptedTransport) {
    let (task, handle, shutdown) = spawn(&transport, true);

    shutdown.cancel();
    let pump = task.await.expect("driver task panicked");

    assert!(!pump.is_failed());
    assert!(handle.is_closed());
    assert_eq!(handle.readable().await, Err(DriverError::Closed));
}

#[rstest]
#[tokio::test]
async fn failure_stops_the_driver(transport: ScriptedTransport) {
    transport.push(frame(h3pump::FrameType::Goaway, &[0]));
    let (task, handle, _shutdown) = spawn(&transport, true);

    handle.readable().await.expect("driver running");
    let pump = task.await.expect("driver task panicked");

    assert!(pump.is_failed());
    assert_eq!(
        pump.listener().log().failures,
        vec![(40, ErrorCode::FrameUnexpected)]
    );
    assert_eq!(handle.readable().await, Err(DriverError::Closed));
}

#[rstest]
#[tokio::test]
async fn unblocked_headers_resume_the_stream(transport: ScriptedTransport) {
    transport.push([headers_frame("blocked"), data_frame(b"x")].concat());
    let (task, handle, _shutdown) = spawn(&transport, true);

    handle.readable().await.expect("driver running");
    handle
        .unblocked(HeadersFrame::new(MetaData::request("GET", "/resumed"), false))
        .await
        .expect("driver running");
    drop(handle);

    let pump = task.await.expect("driver task panicked");
    assert_eq!(
        pump.listener().log().headers,
        vec![(MetaData::request("GET", "/resumed"), false)]
    );
    assert_eq!(pump.stream().body(), b"x");
}

#[rstest]
fn try_send_reports_full_and_closed_queues(transport: ScriptedTransport) {
    let (driver, handle) = StreamDriver::new(pump(transport, true), 1, CancellationToken::new());

    assert_eq!(handle.try_send(StreamEvent::Readable), Ok(()));
    assert_eq!(handle.try_send(StreamEvent::Demand), Err(DriverError::Full));

    drop(driver);
    assert_eq!(handle.try_send(StreamEvent::Demand), Err(DriverError::Closed));
}

#[rstest]
fn zero_capacity_queue_holds_one_event(transport: ScriptedTransport) {
    let (_driver, handle) = StreamDriver::new(pump(transport, true), 0, CancellationToken::new());

    assert_eq!(handle.try_send(StreamEvent::Readable), Ok(()));
    assert_eq!(handle.try_send(StreamEvent::Demand), Err(DriverError::Full));
}

#[rstest]
#[traced_test]
#[tokio::test]
async fn read_timeouts_are_left_to_the_stream(transport: ScriptedTransport) {
    let (task, handle, _shutdown) = spawn(&transport, true);

    handle.send(StreamEvent::ReadTimeout).await.expect("driver running");
    drop(handle);

    let pump = task.await.expect("driver task panicked");
    assert!(!pump.is_failed());
    assert!(!pump.is_remotely_closed());
    assert!(logs_contain("read timeout left to the stream"));
}
