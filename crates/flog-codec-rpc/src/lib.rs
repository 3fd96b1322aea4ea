//! ONC-RPC record framing and call/reply codec: record-marked
//! framing over TCP (or a bare datagram over UDP), an XDR marshalling port
//! with one in-memory implementation, and the call/reply message shapes.

mod constants;
mod framing;
mod reply;
mod request;
mod xdr;

pub use constants::{
    AUTH_NONE, MSG_ACCEPTED, MSG_CALL, MSG_REJECTED, MSG_REPLY, RPC_VERSION, accept_stat,
    exception_message, procedure_id, program_id, version_id,
};
pub use framing::{FRAGMENT_LENGTH_CAP, FrameDecodeOutcome, RecordDecoder};
pub use reply::{RpcBody, RpcReplyResponse};
pub use request::RpcCallRequest;
pub use xdr::{XdrCursor, XdrReader, XdrWriter};
