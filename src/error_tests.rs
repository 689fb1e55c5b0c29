//! Unit tests for pump error codes and categories.

use std::io;

use rstest::rstest;

use super::{ErrorCode, ProtocolError, PumpError, StateError};

#[rstest]
#[case(ErrorCode::NoError, 0x100)]
#[case(ErrorCode::FrameUnexpected, 0x105)]
#[case(ErrorCode::FrameError, 0x106)]
#[case(ErrorCode::RequestCancelled, 0x10c)]
#[case(ErrorCode::RequestIncomplete, 0x10d)]
#[case(ErrorCode::QpackDecompressionFailed, 0x200)]
fn error_codes_match_registry(#[case] code: ErrorCode, #[case] wire: u64) {
    assert_eq!(code.code(), wire);
    assert_eq!(u64::from(code), wire);
    assert_eq!(ErrorCode::from_code(wire), Some(code));
}

#[test]
fn reserved_error_codes_are_not_recognised() {
    // 0x1f * 2 + 0x21
    assert_eq!(ErrorCode::from_code(0x5d), None);
    assert_eq!(ErrorCode::from_code(0), None);
}

#[test]
fn io_error_cancels_request() {
    let err = PumpError::from(io::Error::other("reset"));
    assert_eq!(err.error_code(), ErrorCode::RequestCancelled);
    assert_eq!(err.error_type(), "io");
}

#[rstest]
#[case(StateError::ActionPending)]
#[case(StateError::MissingAction)]
#[case(StateError::UnexpectedSwitchMode)]
fn state_errors_cancel_request(#[case] state: StateError) {
    let err = PumpError::from(state);
    assert_eq!(err.error_code(), ErrorCode::RequestCancelled);
    assert_eq!(err.error_type(), "state");
}

#[test]
fn protocol_error_keeps_its_code() {
    let err = PumpError::from(ProtocolError::new(ErrorCode::FrameError, "oversized"));
    assert_eq!(err.error_code(), ErrorCode::FrameError);
    assert_eq!(err.error_type(), "protocol");
}

#[test]
fn protocol_error_display_includes_code_and_reason() {
    let err = ProtocolError::new(ErrorCode::FrameUnexpected, "settings on request stream");
    let rendered = err.to_string();
    assert!(rendered.contains("FrameUnexpected(0x105)"), "{rendered}");
    assert!(rendered.contains("settings on request stream"), "{rendered}");
}
