#![cfg(not(loom))]
//! Log output of the pump and its driver.
//!
//! `tracing` events are forwarded to the `log` facade, where `logtest`
//! captures them.

use std::io;

use h3pump::{StreamDriver, error::ErrorCode};
use h3pump_testing::{LoggerHandle, ScriptedTransport, headers_frame, logger, pump};
use rstest::rstest;
use serial_test::serial;
use tokio_util::sync::CancellationToken;

#[derive(Clone, Copy, Debug)]
enum Fault {
    Protocol,
    Io,
}

#[rstest]
#[case::protocol(Fault::Protocol, "\"protocol\"")]
#[case::io(Fault::Io, "\"io\"")]
#[serial(logging)]
fn stream_failure_is_logged_as_a_warning(
    mut logger: LoggerHandle,
    #[case] fault: Fault,
    #[case] error_type: &str,
) {
    let transport = ScriptedTransport::new(16);
    match fault {
        Fault::Protocol => transport.push(headers_frame("!broken")),
        Fault::Io => transport.fail_next(io::ErrorKind::BrokenPipe),
    }
    let mut pump = pump(transport.clone(), true);

    pump.on_fillable();
    assert!(pump.is_failed());

    let warnings = logger.messages_at(log::Level::Warn);
    assert_eq!(warnings.len(), 1, "one warning per failed stream: {warnings:?}");
    let warning = &warnings[0];
    assert!(warning.contains("stream failed"), "unexpected warning: {warning}");
    assert!(warning.contains("stream_id=16"), "missing stream id: {warning}");
    assert!(warning.contains(error_type), "missing error type: {warning}");
    assert!(transport.log().closed.is_some_and(|code| code != ErrorCode::NoError));
}

#[rstest]
#[serial(logging)]
fn healthy_stream_logs_no_warnings(mut logger: LoggerHandle) {
    let transport = ScriptedTransport::new(20);
    transport.push(headers_frame("GET /"));
    transport.finish();
    let mut pump = pump(transport, true);

    pump.on_open();
    pump.on_fillable();

    assert!(pump.is_remotely_closed());
    assert!(logger.messages_at(log::Level::Warn).is_empty());
}

#[rstest]
#[tokio::test]
#[serial(logging)]
async fn driver_logs_start_and_stop(mut logger: LoggerHandle) {
    let transport = ScriptedTransport::new(24);
    let shutdown = CancellationToken::new();
    let (driver, _handle) = StreamDriver::new(pump(transport, true), 4, shutdown.clone());
    shutdown.cancel();
    let aborted = driver.spawn().await.expect("driver task panicked");
    assert!(!aborted.is_failed());

    let mut found_abort = false;
    while let Some(record) = logger.pop() {
        if record.level() == log::Level::Info
            && record.args().contains("stream driver aborted before start: stream_id=24")
        {
            found_abort = true;
        }
    }
    assert!(found_abort, "driver abort not logged");

    let transport = ScriptedTransport::new(28);
    let (driver, handle) = StreamDriver::new(pump(transport, true), 4, CancellationToken::new());
    let task = driver.spawn();
    drop(handle);
    let stopped = task.await.expect("driver task panicked");
    assert!(!stopped.is_failed());

    let infos = logger.messages_at(log::Level::Info);
    assert!(
        infos.iter().any(|m| m.contains("stream driver started: stream_id=28")),
        "start not logged: {infos:?}"
    );
    assert!(
        infos.iter().any(|m| m.contains("stream driver stopped: stream_id=28")),
        "stop not logged: {infos:?}"
    );
}
