//! Codec behaviour beyond the vectors: byte-exact re-encoding, fallback
//! envelopes, and id recovery.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use rpchub_core::error::{ErrorCode, HubError};
use rpchub_core::protocol::codec::{
    decode_event, decode_request, decode_response, encode_event, encode_request, encode_response,
    rejection,
};
use rpchub_core::protocol::{Event, Id, Request, Response};

#[test]
fn canonical_envelopes_reencode_byte_for_byte() {
    let req = r#"{"jsonrpc":"2.0","id":"1","method":"add","params":{"a":2,"b":3}}"#;
    assert_eq!(encode_request(&decode_request(req.as_bytes()).unwrap()).unwrap(), req);

    let ok = r#"{"jsonrpc":"2.0","id":"1","result":{"result":5}}"#;
    assert_eq!(encode_response(&decode_response(ok.as_bytes()).unwrap()), ok);

    let err = r#"{"jsonrpc":"2.0","id":null,"error":{"code":-32700,"message":"parse error: x"}}"#;
    assert_eq!(encode_response(&decode_response(err.as_bytes()).unwrap()), err);

    let ev = r#"{"event":"ping","data":{"n":1}}"#;
    assert_eq!(encode_event(&decode_event(ev.as_bytes()).unwrap()).unwrap(), ev);
}

#[test]
fn encoding_does_not_html_escape() {
    let ev = Event::new("html", &serde_json::json!({"s": "<b>&</b>"})).unwrap();
    let s = encode_event(&ev).unwrap();
    assert_eq!(s, r#"{"event":"html","data":{"s":"<b>&</b>"}}"#);
}

#[test]
fn trailing_whitespace_is_allowed() {
    let req = "{\"jsonrpc\":\"2.0\",\"id\":\"1\",\"method\":\"add\"}\n\t ";
    let req = decode_request(req.as_bytes()).unwrap();
    assert_eq!(req.method, "add");
}

#[test]
fn parse_rejection_has_null_id() {
    let body = br#"{"jsonrpc":"2.0","id":"1","method":"add"} junk"#;
    let err = decode_request(body).unwrap_err();
    let resp = rejection(body, &err);
    assert!(resp.id.is_none());
    assert_eq!(resp.error_object().unwrap().code, -32700);
    let wire = encode_response(&resp);
    assert!(wire.starts_with(r#"{"jsonrpc":"2.0","id":null,"error":{"code":-32700"#));
}

#[test]
fn invalid_request_rejection_keeps_recoverable_id() {
    let body = br#"{"jsonrpc":"2.0","id":"abc","method":"add","bogus":1}"#;
    let err = decode_request(body).unwrap_err();
    assert_eq!(err.code(), ErrorCode::InvalidRequest);
    let resp = rejection(body, &err);
    assert_eq!(resp.id, Some(Id::from("abc")));
}

#[test]
fn missing_method_is_invalid_request() {
    let err = decode_request(br#"{"jsonrpc":"2.0","id":"1"}"#).unwrap_err();
    assert_eq!(err.code().as_i64(), -32600);
}

#[test]
fn domain_error_keeps_code_message_and_data() {
    let err = HubError::domain(4001, "insufficient funds").with_data(serde_json::json!({"need": 3}));
    let obj = err.to_error_object();
    assert_eq!(obj.code, 4001);
    assert_eq!(obj.message, "insufficient funds");
    assert_eq!(obj.data, Some(serde_json::json!({"need": 3})));
    assert_eq!(ErrorCode::from_i64(4001), ErrorCode::Domain(4001));
}

#[test]
fn reserved_codes_roundtrip_through_error_code() {
    for code in [-32700, -32600, -32601, -32602, -32603, -32000, -32001, -32002, -32003, -32004] {
        assert_eq!(ErrorCode::from_i64(code).as_i64(), code);
        assert_ne!(ErrorCode::from_i64(code), ErrorCode::Domain(code));
    }
}

#[test]
fn request_builder_serializes_params() {
    let req = Request::new("r-1", "add", &serde_json::json!({"a": 1, "b": 2})).unwrap();
    assert_eq!(
        encode_request(&req).unwrap(),
        r#"{"jsonrpc":"2.0","id":"r-1","method":"add","params":{"a":1,"b":2}}"#
    );
}

#[test]
fn response_result_constructor_sets_id() {
    let raw = serde_json::value::to_raw_value(&5).unwrap();
    let resp = Response::result(Id::Num(3), raw);
    assert_eq!(encode_response(&resp), r#"{"jsonrpc":"2.0","id":3,"result":5}"#);
    assert!(!resp.is_error());
}
