//! Envelope vector tests.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use rpchub_core::protocol::codec::{decode_event, decode_request, decode_response};
use rpchub_core::protocol::Id;

use vector_loader::load;

fn id_matches(id: Option<&Id>, ex: &serde_json::Value) -> bool {
    match (id, ex) {
        (None, serde_json::Value::Null) => true,
        (Some(Id::Str(s)), serde_json::Value::String(e)) => s == e,
        (Some(Id::Num(n)), serde_json::Value::Number(e)) => Some(*n) == e.as_i64(),
        _ => false,
    }
}

#[test]
fn request_vectors() {
    let files = [
        "request_add.json",
        "request_no_params.json",
        "request_trailing_garbage.json",
        "request_concatenated.json",
        "request_unknown_field.json",
        "request_bad_version.json",
        "request_not_json.json",
    ];

    for f in files {
        let v = load(f);
        assert_eq!(v.kind, "request", "vector={}", v.description);
        let res = decode_request(v.payload.as_bytes());

        if let Some(err) = v.expect_error {
            let e = res.expect_err("expected error");
            assert_eq!(e.code().as_i64(), err.code, "vector={}", v.description);
            continue;
        }

        let req = res.expect("expected ok request");
        let ex = v.expect.expect("missing expect block");
        assert!(id_matches(Some(&req.id), &ex["id"]), "vector={}", v.description);
        assert_eq!(req.method, ex["method"].as_str().unwrap(), "vector={}", v.description);
        match ex["params"].as_str() {
            Some(p) => assert_eq!(req.params.unwrap().get(), p, "vector={}", v.description),
            None => assert!(req.params.is_none(), "vector={}", v.description),
        }
    }
}

#[test]
fn response_vectors() {
    let files = [
        "response_result.json",
        "response_null_result.json",
        "response_error.json",
        "response_both.json",
        "response_neither.json",
    ];

    for f in files {
        let v = load(f);
        let res = decode_response(v.payload.as_bytes());

        if let Some(err) = v.expect_error {
            let e = res.expect_err("expected error");
            assert_eq!(e.code().as_i64(), err.code, "vector={}", v.description);
            continue;
        }

        let resp = res.expect("expected ok response");
        let ex = v.expect.expect("missing expect block");
        assert!(id_matches(resp.id.as_ref(), &ex["id"]), "vector={}", v.description);
        if let Some(result) = ex.get("result").and_then(|r| r.as_str()) {
            assert_eq!(resp.result_raw().unwrap().get(), result, "vector={}", v.description);
        }
        if let Some(code) = ex.get("error_code").and_then(|c| c.as_i64()) {
            assert_eq!(resp.error_object().unwrap().code, code, "vector={}", v.description);
        }
    }
}

#[test]
fn event_vectors() {
    for f in ["event_ping.json", "event_with_id.json"] {
        let v = load(f);
        let res = decode_event(v.payload.as_bytes());

        if let Some(err) = v.expect_error {
            let e = res.expect_err("expected error");
            assert_eq!(e.code().as_i64(), err.code, "vector={}", v.description);
            continue;
        }

        let ev = res.expect("expected ok event");
        let ex = v.expect.expect("missing expect block");
        assert_eq!(ev.event, ex["event"].as_str().unwrap());
        assert_eq!(ev.data.get(), ex["data"].as_str().unwrap());
    }
}
