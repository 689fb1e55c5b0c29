#![cfg(not(loom))]
//! End-to-end scenarios for the stream frame pump.
//!
//! Each test scripts the bytes a peer sends on a request stream and checks
//! what reaches the application, the listener and the transport.

use std::{io, sync::Arc};

use h3pump::{
    Data,
    DefaultBufferPool,
    FrameType,
    HeadersFrame,
    MessageParser,
    MetaData,
    StreamConfig,
    StreamConnection,
    error::ErrorCode,
};
use h3pump_testing::{
    FinishMode,
    RecordingListener,
    RecordingStream,
    ScriptedTransport,
    TestPump,
    TextDecoder,
    data_frame,
    frame,
    frame_header,
    headers_frame,
    pump,
    pump_with,
    raw_frame,
};
use rstest::rstest;

const STREAM_ID: u64 = 8;

/// Signal readiness until the stream half-closes or fails.
fn drive(pump: &mut TestPump, budget: usize) {
    for _ in 0..budget {
        if pump.is_remotely_closed() || pump.is_failed() {
            return;
        }
        pump.on_fillable();
    }
}

#[test]
fn request_body_is_delivered_one_frame_per_demand() {
    let transport = ScriptedTransport::new(STREAM_ID);
    transport.push([headers_frame("POST /upload"), data_frame(b"hello"), data_frame(b" world")].concat());
    transport.finish();
    let pool = Arc::new(DefaultBufferPool::default());
    let mut pump = pump_with(transport.clone(), true, Arc::clone(&pool), StreamConfig::default());

    pump.on_fillable();
    let log = pump.listener().log();
    assert_eq!(log.headers, vec![(MetaData::request("POST", "/upload"), false)]);
    assert_eq!(pump.stream().body(), b"hello");
    assert!(pump.is_data_mode());
    assert!(!pump.is_remotely_closed());

    pump.receive();
    assert_eq!(pump.stream().body(), b"hello world");
    assert!(pump.stream().ended());
    assert_eq!(pump.listener().log().data, vec![(5, false), (6, true)]);

    let wire = transport.log();
    assert_eq!(wire.input_shutdown, vec![ErrorCode::NoError]);
    assert_eq!(wire.flushes, 1);
    assert!(!pump.holds_buffer());

    let stats = pool.stats();
    assert_eq!(stats.outstanding(), 0);
    assert_eq!(stats.discarded, 1, "body slices keep the buffer out of the pool");
}

#[rstest]
#[case::reported(FinishMode::Report)]
#[case::silent(FinishMode::Silent)]
fn finished_stream_ends_with_one_synthesised_eof(#[case] mode: FinishMode) {
    let transport = ScriptedTransport::new(STREAM_ID).finish_mode(mode);
    transport.push([headers_frame("GET /"), data_frame(b"abc")].concat());
    let mut pump = pump(transport.clone(), true);

    pump.on_fillable();
    assert_eq!(pump.stream().body(), b"abc");
    assert!(!pump.stream().ended());

    transport.finish();
    pump.receive();
    assert_eq!(pump.stream().received().last(), Some(&Data::Eof));
    assert!(pump.is_remotely_closed());

    pump.receive();
    pump.on_fillable();
    assert_eq!(pump.stream().received().len(), 2);
    assert_eq!(transport.log().input_shutdown, vec![ErrorCode::NoError]);
    assert!(pump.listener().log().failures.is_empty());
}

#[test]
fn single_byte_fills_deliver_every_frame_in_order() {
    let transport = ScriptedTransport::new(STREAM_ID).fill_limit(1);
    let wire = [
        headers_frame("POST /form\ncontent-type: text/plain"),
        raw_frame(0x21, b"grease"),
        data_frame(b"ab"),
        data_frame(b""),
        raw_frame(0x10, b"??"),
        data_frame(b"cd"),
        headers_frame("trailers\nx-checksum: 1"),
    ]
    .concat();
    let budget = wire.len() * 4;
    transport.push(wire);
    transport.finish();
    let mut pump = pump(transport.clone(), true);

    drive(&mut pump, budget);

    let log = pump.listener().log();
    assert!(log.failures.is_empty(), "unexpected failures: {:?}", log.errors);
    assert_eq!(log.headers.len(), 2);
    assert_eq!(log.headers[0].0.fields().get("Content-Type"), Some("text/plain"));
    assert!(log.headers[1].0.is_trailers());
    assert!(log.headers[1].1, "trailers end the stream");
    assert_eq!(pump.stream().body(), b"abcd");
    assert_eq!(transport.pending(), 0);
}

#[test]
fn informational_responses_precede_the_final_response() {
    let transport = ScriptedTransport::new(STREAM_ID);
    transport.push(
        [
            headers_frame("103\nlink: </style.css>"),
            headers_frame("200"),
            data_frame(b"ok"),
        ]
        .concat(),
    );
    transport.finish();
    let mut pump = pump(transport.clone(), true);

    pump.on_fillable();

    let statuses: Vec<_> = pump
        .listener()
        .log()
        .headers
        .iter()
        .filter_map(|(metadata, _)| metadata.status())
        .collect();
    assert_eq!(statuses, vec![103, 200]);
    assert_eq!(pump.stream().body(), b"ok");
    assert!(pump.stream().ended());
}

#[test]
fn without_demand_body_waits_for_receive() {
    let transport = ScriptedTransport::new(STREAM_ID);
    transport.push([headers_frame("GET /lazy"), data_frame(b"later")].concat());
    let mut pump = pump(transport.clone(), false);

    pump.on_fillable();
    assert!(pump.stream().received().is_empty());
    assert!(pump.holds_buffer(), "unparsed body bytes stay buffered");

    pump.receive();
    assert_eq!(pump.stream().body(), b"later");
}

#[test]
fn blocked_headers_resume_parsing_once_unblocked() {
    let transport = ScriptedTransport::new(STREAM_ID);
    transport.push([headers_frame("blocked"), data_frame(b"xyz")].concat());
    let mut pump = pump(transport.clone(), true);

    pump.on_fillable();
    assert!(pump.listener().log().headers.is_empty());
    assert_eq!(transport.log().interest, 0, "blocked frames do not arm interest");
    assert!(pump.holds_buffer());

    pump.on_headers_unblocked(HeadersFrame::new(MetaData::request("GET", "/late"), false));
    assert_eq!(pump.listener().log().headers.len(), 1);
    assert_eq!(pump.stream().body(), b"xyz");

    transport.finish();
    pump.on_fillable();
    assert!(pump.stream().ended());
}

#[test]
fn finishing_mid_frame_is_an_incomplete_request() {
    let transport = ScriptedTransport::new(STREAM_ID);
    transport.push([headers_frame("GET /"), frame_header(FrameType::Data, 10), b"abc".to_vec()].concat());
    transport.finish();
    let mut pump = pump(transport.clone(), true);

    drive(&mut pump, 8);

    assert_eq!(pump.stream().body(), b"abc");
    assert_eq!(
        pump.listener().log().failures,
        vec![(STREAM_ID, ErrorCode::RequestIncomplete)]
    );
    assert_eq!(transport.log().closed, Some(ErrorCode::RequestIncomplete));
}

enum Fault {
    Settings,
    Undecodable,
    Oversized,
    Reset,
}

#[rstest]
#[case::control_frame(Fault::Settings, ErrorCode::FrameUnexpected)]
#[case::bad_block(Fault::Undecodable, ErrorCode::QpackDecompressionFailed)]
#[case::oversized_block(Fault::Oversized, ErrorCode::FrameError)]
#[case::read_failure(Fault::Reset, ErrorCode::RequestCancelled)]
fn failures_close_the_stream_once(#[case] fault: Fault, #[case] expected: ErrorCode) {
    let transport = ScriptedTransport::new(STREAM_ID);
    let mut config = StreamConfig::default();
    match fault {
        Fault::Settings => transport.push(frame(FrameType::Settings, &[])),
        Fault::Undecodable => transport.push(headers_frame("!unknown table index")),
        Fault::Oversized => {
            config = config.max_header_block_size(8);
            transport.push(headers_frame("GET /a/rather/long/path"));
        }
        Fault::Reset => transport.fail_next(io::ErrorKind::ConnectionReset),
    }
    let pool = Arc::new(DefaultBufferPool::default());
    let mut pump = pump_with(transport.clone(), true, Arc::clone(&pool), config);

    pump.on_fillable();
    assert!(pump.is_failed());
    assert!(!pump.holds_buffer());
    assert_eq!(pool.stats().outstanding(), 0);

    let log = pump.listener().log();
    assert_eq!(log.failures, vec![(STREAM_ID, expected)]);
    assert_eq!(transport.log().closed, Some(expected));

    let fills = transport.log().fills;
    transport.push(data_frame(b"ignored"));
    pump.on_fillable();
    pump.receive();
    assert_eq!(transport.log().fills, fills, "a failed stream is never read again");
    assert_eq!(pump.listener().log().failures.len(), 1);
}

#[test]
fn header_limit_comes_from_the_stream_config() {
    let transport = ScriptedTransport::new(STREAM_ID);
    transport.push(headers_frame("GET /a/rather/long/path"));
    let mut pump = StreamConnection::new(
        transport.clone(),
        MessageParser::new(STREAM_ID, TextDecoder::default()),
        RecordingStream::new(true),
        RecordingListener::default(),
        Arc::new(DefaultBufferPool::default()),
        StreamConfig::default().max_header_block_size(8),
    );

    pump.on_fillable();

    assert!(pump.is_failed());
    assert!(pump.listener().log().headers.is_empty());
    assert_eq!(transport.log().closed, Some(ErrorCode::FrameError));
}

#[test]
fn dropped_pump_returns_its_buffer() {
    let transport = ScriptedTransport::new(STREAM_ID);
    transport.push([headers_frame("POST /idle"), data_frame(b"unread")].concat());
    let pool = Arc::new(DefaultBufferPool::default());
    let mut pump = pump_with(transport, false, Arc::clone(&pool), StreamConfig::default());

    pump.on_fillable();
    assert!(pump.holds_buffer(), "body bytes wait for demand");
    assert_eq!(pool.stats().outstanding(), 1);

    drop(pump);

    let stats = pool.stats();
    assert_eq!(stats.acquired, 1);
    assert_eq!(stats.outstanding(), 0);
}
