//! The ONC-RPC call message shape, ported from
//! `ONCRPCRequest::marshal`/`unmarshal`.

use crate::constants::{AUTH_NONE, MSG_CALL, RPC_VERSION};
use crate::xdr::{XdrCursor, XdrReader, XdrWriter};
use flog_core::error::CoreError;

/// `(xid, prog, vers, proc, cred_flavor, cred_body, verf_flavor, verf_body,
/// call_body)`. `call_body` is the already-XDR-encoded
/// application payload; this codec treats it as opaque.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RpcCallRequest {
    pub xid: u32,
    pub prog: u32,
    pub vers: u32,
    pub proc_: u32,
    pub cred_flavor: u32,
    pub cred_body: Vec<u8>,
    pub verf_flavor: u32,
    pub verf_body: Vec<u8>,
    pub call_body: Vec<u8>,
}

impl RpcCallRequest {
    /// A call with `AUTH_NONE` credentials and verifier, as emitted by
    /// the client façades.
    pub fn new(xid: u32, prog: u32, vers: u32, proc_: u32, call_body: Vec<u8>) -> Self {
        Self {
            xid,
            prog,
            vers,
            proc_,
            cred_flavor: AUTH_NONE,
            cred_body: Vec::new(),
            verf_flavor: AUTH_NONE,
            verf_body: Vec::new(),
            call_body,
        }
    }

    /// Marshals into the bytes that go inside one ONC-RPC record
    /// fragment.
    pub fn to_xdr_bytes(&self) -> Vec<u8> {
        let mut w = XdrCursor::new();
        w.write_u32(self.xid);
        w.write_u32(MSG_CALL);
        w.write_u32(RPC_VERSION);
        w.write_u32(self.prog);
        w.write_u32(self.vers);
        w.write_u32(self.proc_);
        w.write_u32(self.cred_flavor);
        w.write_opaque(&self.cred_body);
        w.write_u32(self.verf_flavor);
        w.write_opaque(&self.verf_body);
        let mut bytes = w.into_bytes();
        bytes.extend_from_slice(&self.call_body);
        bytes
    }

    /// Unmarshals a record fragment's payload into a call.
    pub fn from_xdr_bytes(payload: Vec<u8>) -> Result<Self, CoreError> {
        let mut r = XdrCursor::from_bytes(payload);
        let xid = r.read_u32()?;
        let msg_type = r.read_u32()?;
        if msg_type != MSG_CALL {
            return Err(crate::reply::malformed("expected an ONC-RPC call message"));
        }
        let rpcvers = r.read_u32()?;
        if rpcvers != RPC_VERSION {
            return Err(crate::reply::malformed("unsupported ONC-RPC version"));
        }
        let prog = r.read_u32()?;
        let vers = r.read_u32()?;
        let proc_ = r.read_u32()?;
        let cred_flavor = r.read_u32()?;
        let cred_body = r.read_opaque()?;
        let verf_flavor = r.read_u32()?;
        let verf_body = r.read_opaque()?;
        let call_body = r.read_remaining();
        Ok(Self { xid, prog, vers, proc_, cred_flavor, cred_body, verf_flavor, verf_body, call_body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn call_round_trips_through_xdr() {
        let call = RpcCallRequest::new(7, 0x2000_0001, 1, 3, b"args".to_vec());
        let bytes = call.to_xdr_bytes();
        let parsed = RpcCallRequest::from_xdr_bytes(bytes).unwrap();
        assert_eq!(parsed, call);
    }

    #[test]
    fn rejects_a_reply_message_fed_as_a_call() {
        let mut w = XdrCursor::new();
        w.write_u32(1);
        w.write_u32(1); // MSG_REPLY, not MSG_CALL
        let err = RpcCallRequest::from_xdr_bytes(w.into_bytes()).unwrap_err();
        assert_eq!(err.code(), flog_core::error::codes::RPC_MALFORMED);
    }
}
