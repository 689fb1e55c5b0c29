use rstest::rstest;

use super::*;

#[rstest]
#[case(0x00, FrameType::Data)]
#[case(0x01, FrameType::Headers)]
#[case(0x03, FrameType::CancelPush)]
#[case(0x04, FrameType::Settings)]
#[case(0x05, FrameType::PushPromise)]
#[case(0x07, FrameType::Goaway)]
#[case(0x0d, FrameType::MaxPushId)]
#[case(0x02, FrameType::Http2(0x02))]
#[case(0x09, FrameType::Http2(0x09))]
#[case(0x21, FrameType::Reserved(0x21))]
#[case(0x40, FrameType::Reserved(0x40))]
#[case(0x0e, FrameType::Unknown(0x0e))]
fn classifies_wire_types(#[case] code: u64, #[case] expected: FrameType) {
    let frame_type = FrameType::from_code(code);
    assert_eq!(frame_type, expected);
    assert_eq!(frame_type.code(), code);
}

#[rstest]
#[case(0x21, true)]
#[case(0x21 + 0x1f * 7, true)]
#[case(0x20, false)]
#[case(0x22, false)]
#[case(0x00, false)]
fn reserved_types_follow_grease_pattern(#[case] code: u64, #[case] reserved: bool) {
    assert_eq!(is_reserved(code), reserved);
    assert_eq!(FrameType::from_code(code).is_known(), !reserved);
}

#[test]
fn empty_data_frame_is_zero_length_data() {
    let mut wire = Vec::new();
    assert!(encode_frame(FrameType::Data.code(), &[], &mut wire));
    assert_eq!(wire, EMPTY_DATA_FRAME);
}

#[test]
fn frame_header_uses_shortest_varints() {
    let mut wire = Vec::new();
    assert!(encode_frame_header(FrameType::Headers.code(), 300, &mut wire));
    assert_eq!(wire, [0x01, 0x41, 0x2c]);
}

#[test]
fn oversized_frame_header_writes_nothing() {
    let mut wire = Vec::new();
    assert!(!encode_frame_header(0x00, varint::MAX + 1, &mut wire));
    assert!(wire.is_empty());
}

#[rstest]
#[case(MetaData::response(103), true)]
#[case(MetaData::response(199), true)]
#[case(MetaData::response(200), false)]
#[case(MetaData::request("GET", "/"), false)]
fn informational_responses(#[case] metadata: MetaData, #[case] informational: bool) {
    assert_eq!(metadata.is_informational(), informational);
}

#[test]
fn field_lookup_ignores_case() {
    let fields = Fields::new().with("Content-Type", "text/plain").with("x-id", "7");
    let metadata = MetaData::Request {
        method: "POST".into(),
        target: "/upload".into(),
        fields,
    };
    assert_eq!(metadata.fields().get("content-type"), Some("text/plain"));
    assert_eq!(metadata.fields().len(), 2);
    assert_eq!(metadata.to_string(), "POST /upload");
}
