//! Property: serializing a request/response and re-parsing it recovers the
//! same method/URI/status/headers/body, modulo the auto-generated `Date`
//! and `Content-Length` headers.

use flog_codec_http::{HttpRequest, HttpResponse};
use proptest::prelude::*;

fn token() -> impl Strategy<Value = String> {
    "[A-Za-z][A-Za-z0-9]{0,7}"
}

fn uri_path() -> impl Strategy<Value = String> {
    "/[a-z0-9/]{0,40}"
}

fn body_bytes() -> impl Strategy<Value = Vec<u8>> {
    proptest::collection::vec(any::<u8>(), 0..64)
}

proptest! {
    #[test]
    fn request_round_trips_through_serialize_and_feed(method in token(), uri in uri_path(), body in body_bytes()) {
        let mut req = HttpRequest::with_body(&method, &uri, body.clone());
        req.set_header("Host", "example.com");
        let slices = req.serialize();
        let bytes: Vec<u8> = slices.iter().flat_map(|s| s.to_vec()).collect();

        let mut parsed = HttpRequest::new();
        let (outcome, consumed) = parsed.feed(&bytes).unwrap();
        prop_assert_eq!(outcome, flog_codec_http::RequestDecodeOutcome::Done);
        prop_assert_eq!(consumed, bytes.len());
        prop_assert_eq!(parsed.method(), method.as_str());
        prop_assert_eq!(parsed.uri().unwrap(), uri.as_str());
        prop_assert_eq!(parsed.get_header("Host", ""), "example.com");
        prop_assert_eq!(parsed.body(), Some(body.as_slice()));
    }

    #[test]
    fn response_round_trips_through_serialize_and_feed(body in body_bytes()) {
        let mut resp = HttpResponse::with_status_and_body(200, body.clone());
        resp.set_header("X-Trace", "abc123");
        let slices = resp.serialize();
        let bytes: Vec<u8> = slices.iter().flat_map(|s| s.to_vec()).collect();

        let mut parsed = HttpResponse::new();
        let (outcome, consumed) = parsed.feed(&bytes).unwrap();
        prop_assert_eq!(outcome, flog_codec_http::ResponseDecodeOutcome::Done);
        prop_assert_eq!(consumed, bytes.len());
        prop_assert_eq!(parsed.status_code(), 200);
        prop_assert_eq!(parsed.get_header("X-Trace", ""), "abc123");
        prop_assert_eq!(parsed.body(), Some(body.as_slice()));
    }
}

#[test]
fn request_with_empty_body_omits_content_length_body_bytes() {
    let mut req = HttpRequest::build("GET", "/");
    let slices = req.serialize();
    let bytes: Vec<u8> = slices.iter().flat_map(|s| s.to_vec()).collect();
    let mut parsed = HttpRequest::new();
    let (outcome, consumed) = parsed.feed(&bytes).unwrap();
    assert_eq!(outcome, flog_codec_http::RequestDecodeOutcome::Done);
    assert_eq!(consumed, bytes.len());
    assert!(parsed.body().is_none());
}

#[test]
fn uri_longer_than_two_bytes_triggers_scratch_growth_end_to_end() {
    let mut req = HttpRequest::new();
    let input = b"GET /abcdefghijklmnop HTTP/1.1\r\n\r\n";
    let (outcome, consumed) = req.feed(input).unwrap();
    assert_eq!(outcome, flog_codec_http::RequestDecodeOutcome::Done);
    assert_eq!(consumed, input.len());
    assert_eq!(req.uri().unwrap(), "/abcdefghijklmnop");
}
