//! End-to-end record framing + call/reply round trips.

use flog_codec_rpc::{FrameDecodeOutcome, RecordDecoder, RpcCallRequest, RpcReplyResponse, accept_stat};
use proptest::prelude::*;

fn opaque_bytes() -> impl Strategy<Value = Vec<u8>> {
    proptest::collection::vec(any::<u8>(), 0..256)
}

proptest! {
    #[test]
    fn call_survives_framing_and_xdr_round_trip(
        xid in any::<u32>(),
        proc_ in any::<u32>(),
        call_body in opaque_bytes(),
    ) {
        let call = RpcCallRequest::new(xid, flog_codec_rpc::program_id(1), flog_codec_rpc::version_id(1), proc_, call_body.clone());
        let record = RecordDecoder::encode_record(&call.to_xdr_bytes()).unwrap();

        let mut dec = RecordDecoder::new();
        let (outcome, consumed) = dec.feed(&record).unwrap();
        prop_assert_eq!(consumed, record.len());
        let payload = match outcome {
            FrameDecodeOutcome::Done(p) => p,
            FrameDecodeOutcome::NeedMore => panic!("expected a complete record"),
        };
        let parsed = RpcCallRequest::from_xdr_bytes(payload).unwrap();
        prop_assert_eq!(parsed.xid, xid);
        prop_assert_eq!(parsed.proc_, proc_);
        prop_assert_eq!(parsed.call_body, call_body);
    }

    #[test]
    fn reply_survives_framing_and_xdr_round_trip(xid in any::<u32>(), result in opaque_bytes()) {
        let reply = RpcReplyResponse::success(xid, result.clone());
        let record = RecordDecoder::encode_record(&reply.to_xdr_bytes()).unwrap();

        let mut dec = RecordDecoder::new();
        let (outcome, _) = dec.feed(&record).unwrap();
        let payload = match outcome {
            FrameDecodeOutcome::Done(p) => p,
            FrameDecodeOutcome::NeedMore => panic!("expected a complete record"),
        };
        let parsed = RpcReplyResponse::from_xdr_bytes(payload).unwrap();
        prop_assert_eq!(parsed.xid, xid);
        match parsed.body {
            flog_codec_rpc::RpcBody::Success(bytes) => prop_assert_eq!(bytes, result),
            _ => prop_assert!(false, "expected a success body"),
        }
    }
}

#[test]
fn a_fragment_over_the_cap_is_rejected_before_any_payload_is_buffered() {
    let marker: u32 = 0x8000_0000 | (flog_codec_rpc::FRAGMENT_LENGTH_CAP as u32 + 1);
    let mut dec = RecordDecoder::new();
    let err = dec.feed(&marker.to_be_bytes()).unwrap_err();
    assert_eq!(err.code(), "codec.rpc_fragment_too_large");
}

#[test]
fn a_non_final_fragment_marker_is_rejected_outright() {
    let marker: u32 = 128; // high bit clear: "more fragments follow"
    let mut dec = RecordDecoder::new();
    let err = dec.feed(&marker.to_be_bytes()).unwrap_err();
    assert_eq!(err.code(), "codec.rpc_multi_fragment_unsupported");
}

#[test]
fn exception_reply_for_an_unavailable_procedure_round_trips() {
    let reply = RpcReplyResponse::exception(3, accept_stat::PROC_UNAVAIL);
    let bytes = reply.to_xdr_bytes();
    let parsed = RpcReplyResponse::from_xdr_bytes(bytes).unwrap();
    match parsed.body {
        flog_codec_rpc::RpcBody::Exception { message, .. } => assert_eq!(message, "procedure unavailable"),
        _ => panic!("expected an exception body"),
    }
}
