//! The ONC-RPC reply message shape, ported from
//! `ONCRPCResponse::marshal`/`unmarshal` and the `accept_stat` switch in
//! `ONCRPCRequest::respond`.

use crate::constants::{self, AUTH_NONE, MSG_ACCEPTED, MSG_REJECTED, MSG_REPLY, accept_stat};
use crate::xdr::{XdrCursor, XdrReader, XdrWriter};
use flog_core::error::{CoreError, ErrorCategory, codes};

pub(crate) fn malformed(msg: &'static str) -> CoreError {
    CoreError::new(codes::RPC_MALFORMED, ErrorCategory::Malformed, msg)
}

/// The accepted-call body: either the application's successful result
/// bytes, or one of the fixed `accept_stat` exceptions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RpcBody {
    Success(Vec<u8>),
    Exception { accept_stat: u32, message: String },
}

impl RpcBody {
    /// Builds the fixed exception body for a non-success `accept_stat`,
    /// falling back to `"ONC-RPC exception"` for a custom, interface-defined
    /// status this codec does not know the text for.
    pub fn exception(stat: u32) -> Self {
        let message = constants::exception_message(stat).unwrap_or("ONC-RPC exception").to_string();
        RpcBody::Exception { accept_stat: stat, message }
    }
}

/// `(xid, reply_stat, verf, accept_stat, reply_body)`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RpcReplyResponse {
    pub xid: u32,
    pub verf_flavor: u32,
    pub verf_body: Vec<u8>,
    pub body: RpcBody,
}

impl RpcReplyResponse {
    pub fn success(xid: u32, result: Vec<u8>) -> Self {
        Self { xid, verf_flavor: AUTH_NONE, verf_body: Vec::new(), body: RpcBody::Success(result) }
    }

    pub fn exception(xid: u32, stat: u32) -> Self {
        Self { xid, verf_flavor: AUTH_NONE, verf_body: Vec::new(), body: RpcBody::exception(stat) }
    }

    pub fn to_xdr_bytes(&self) -> Vec<u8> {
        let mut w = XdrCursor::new();
        w.write_u32(self.xid);
        w.write_u32(MSG_REPLY);
        w.write_u32(MSG_ACCEPTED);
        w.write_u32(self.verf_flavor);
        w.write_opaque(&self.verf_body);
        match &self.body {
            RpcBody::Success(result) => {
                w.write_u32(accept_stat::SUCCESS);
                let mut bytes = w.into_bytes();
                bytes.extend_from_slice(result);
                return bytes;
            }
            RpcBody::Exception { accept_stat, message } => {
                w.write_u32(*accept_stat);
                w.write_string(message);
            }
        }
        w.into_bytes()
    }

    /// Unmarshals a reply, applying the `reply_stat`/`verf` validation from
    /// `ONCRPCResponse::unmarshal`: a rejected call, or an accepted call
    /// whose verifier is not the expected `AUTH_NONE` empty verifier, is
    /// turned into a synthesized system-error exception rather than
    /// propagated as a parse failure.
    pub fn from_xdr_bytes(payload: Vec<u8>) -> Result<Self, CoreError> {
        let mut r = XdrCursor::from_bytes(payload);
        let xid = r.read_u32()?;
        let msg_type = r.read_u32()?;
        if msg_type != MSG_REPLY {
            return Err(malformed("expected an ONC-RPC reply message"));
        }
        let reply_stat = r.read_u32()?;
        if reply_stat == MSG_REJECTED {
            return Ok(Self { xid, verf_flavor: AUTH_NONE, verf_body: Vec::new(), body: RpcBody::exception(accept_stat::SYSTEM_ERR) });
        }
        if reply_stat != MSG_ACCEPTED {
            return Err(malformed("unrecognized ONC-RPC reply_stat"));
        }
        let verf_flavor = r.read_u32()?;
        let verf_body = r.read_opaque()?;
        if verf_flavor != AUTH_NONE || !verf_body.is_empty() {
            return Ok(Self {
                xid,
                verf_flavor,
                verf_body,
                body: RpcBody::exception(accept_stat::SYSTEM_ERR),
            });
        }
        let stat = r.read_u32()?;
        let body = match stat {
            accept_stat::SUCCESS => RpcBody::Success(r.read_remaining()),
            1..=5 => RpcBody::exception(stat),
            other => RpcBody::exception(other),
        };
        Ok(Self { xid, verf_flavor, verf_body, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_reply_round_trips_through_xdr() {
        let reply = RpcReplyResponse::success(7, b"result".to_vec());
        let bytes = reply.to_xdr_bytes();
        let parsed = RpcReplyResponse::from_xdr_bytes(bytes).unwrap();
        assert_eq!(parsed, reply);
    }

    #[test]
    fn exception_reply_round_trips_with_fixed_message() {
        let reply = RpcReplyResponse::exception(7, accept_stat::PROC_UNAVAIL);
        let bytes = reply.to_xdr_bytes();
        let parsed = RpcReplyResponse::from_xdr_bytes(bytes).unwrap();
        match parsed.body {
            RpcBody::Exception { accept_stat, message } => {
                assert_eq!(accept_stat, constants::accept_stat::PROC_UNAVAIL);
                assert_eq!(message, "procedure unavailable");
            }
            _ => panic!("expected an exception body"),
        }
    }

    #[test]
    fn rejected_call_is_synthesized_into_a_system_error_exception() {
        let mut w = XdrCursor::new();
        w.write_u32(9);
        w.write_u32(MSG_REPLY);
        w.write_u32(MSG_REJECTED);
        let parsed = RpcReplyResponse::from_xdr_bytes(w.into_bytes()).unwrap();
        assert_eq!(parsed.xid, 9);
        match parsed.body {
            RpcBody::Exception { accept_stat, .. } => assert_eq!(accept_stat, constants::accept_stat::SYSTEM_ERR),
            _ => panic!("expected an exception body"),
        }
    }

    #[test]
    fn non_auth_none_verifier_is_rejected_as_a_system_error() {
        let mut w = XdrCursor::new();
        w.write_u32(1);
        w.write_u32(MSG_REPLY);
        w.write_u32(MSG_ACCEPTED);
        w.write_u32(99); // not AUTH_NONE
        w.write_opaque(b"x");
        w.write_u32(accept_stat::SUCCESS);
        let parsed = RpcReplyResponse::from_xdr_bytes(w.into_bytes()).unwrap();
        match parsed.body {
            RpcBody::Exception { accept_stat, .. } => assert_eq!(accept_stat, constants::accept_stat::SYSTEM_ERR),
            _ => panic!("expected an exception body"),
        }
    }
}
