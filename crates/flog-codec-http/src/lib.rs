//! HTTP/1.1 request/response codec: incremental
//! deserializers over the shared [`HttpMessage`] base, and gather-I/O
//! serializers, built on top of `flog-codec-rfc822`'s header parser.

mod message;
mod request;
mod response;
mod scratch;
mod status;

pub use message::{HttpMessage, MessageDecodeOutcome};
pub use request::{HttpRequest, RequestDecodeOutcome};
pub use response::{HttpResponse, ResponseDecodeOutcome};
pub use status::status_line_and_reason;
