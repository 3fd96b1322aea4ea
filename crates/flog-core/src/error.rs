//! `CoreError`: the stable error domain every layer of the runtime folds
//! transport, codec and protocol failures into.
//!
//! Grounded on `spark_core::error::CoreError` (stable `&'static str` code +
//! message + optional boxed cause + category), trimmed to what the client
//! and server engines actually branch on: is this retryable, is it a
//! timeout, is it a malformed frame.

use std::borrow::Cow;
use std::fmt;

/// Namespaced, stable error codes. `<domain>.<reason>`, matching the
/// convention `spark_core::error` uses for its `codes` module.
pub mod codes {
    pub const CONNECT: &str = "transport.connect";
    pub const READ: &str = "transport.read";
    pub const WRITE: &str = "transport.write";
    pub const WRITE_VECTORED: &str = "transport.write_vectored";
    pub const SHUTDOWN: &str = "transport.shutdown";
    pub const CONFIGURE: &str = "transport.configure";
    pub const ACCEPT: &str = "transport.accept";
    pub const BIND: &str = "transport.bind";
    pub const POLL_READY: &str = "transport.poll_ready";
    pub const TIMEOUT: &str = "transport.timeout";
    pub const CANCELLED: &str = "transport.cancelled";

    pub const BUFFER_UNSUPPORTED: &str = "buffer.unsupported_operation";
    pub const BUFFER_CAPACITY_EXCEEDED: &str = "buffer.capacity_exceeded";

    pub const HEADER_MALFORMED: &str = "codec.header_malformed";
    pub const HTTP_CHUNKED_UNSUPPORTED: &str = "codec.http_chunked_unsupported";
    pub const HTTP_MALFORMED: &str = "codec.http_malformed";

    pub const RPC_FRAGMENT_TOO_LARGE: &str = "codec.rpc_fragment_too_large";
    pub const RPC_MULTI_FRAGMENT_UNSUPPORTED: &str = "codec.rpc_multi_fragment_unsupported";
    pub const RPC_MALFORMED: &str = "codec.rpc_malformed";

    pub const PIPELINE_ATTACH: &str = "client.pipeline_attach_conflict";
}

/// How a [`CoreError`] should be treated by generic retry/backoff and
/// exception-mapping logic further up the stack.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorCategory {
    /// The underlying transport operation timed out against its deadline.
    Timeout,
    /// The operation was cancelled before it could complete.
    Cancelled,
    /// A connect/read/write/accept failed at the OS or TLS layer.
    Transport,
    /// The incoming byte stream did not parse as a well-formed message.
    Malformed,
    /// The peer returned a protocol-level exception (HTTP non-2xx,
    /// ONC-RPC `accept_stat != SUCCESS`), not a transport failure.
    Protocol,
    /// A declared resource bound (fragment size, status code range) was
    /// exceeded; treated as malformed per spec.
    ResourceExhausted,
}

#[derive(Debug)]
pub struct CoreError {
    code: &'static str,
    message: Cow<'static, str>,
    category: ErrorCategory,
    cause: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
}

impl CoreError {
    pub fn new(code: &'static str, category: ErrorCategory, message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            code,
            message: message.into(),
            category,
            cause: None,
        }
    }

    pub fn transport(code: &'static str, message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(code, ErrorCategory::Transport, message)
    }

    pub fn malformed(code: &'static str, message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(code, ErrorCategory::Malformed, message)
    }

    pub fn timeout() -> Self {
        Self::new(codes::TIMEOUT, ErrorCategory::Timeout, "operation timed out")
    }

    pub fn cancelled() -> Self {
        Self::new(codes::CANCELLED, ErrorCategory::Cancelled, "operation was cancelled")
    }

    pub fn with_cause(mut self, cause: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.cause = Some(Box::new(cause));
        self
    }

    pub fn code(&self) -> &'static str {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn category(&self) -> ErrorCategory {
        self.category
    }

    pub fn cause(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        self.cause.as_deref()
    }

    /// Maps an OS-level I/O error into a [`CoreError`] tagged with the
    /// operation it occurred during. `ETIMEDOUT`/`WouldBlock`-after-deadline
    /// paths go through [`CoreError::timeout`] instead; this is for genuine
    /// transport failures (connection refused, reset, etc).
    pub fn from_io(op: &'static str, err: std::io::Error) -> Self {
        Self::transport(op, err.to_string()).with_cause(err)
    }
}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for CoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.cause.as_ref().map(|c| c.as_ref() as &(dyn std::error::Error + 'static))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_error_is_tagged_with_operation_and_transport_category() {
        let io_err = std::io::Error::from(std::io::ErrorKind::ConnectionRefused);
        let err = CoreError::from_io(codes::CONNECT, io_err);
        assert_eq!(err.code(), codes::CONNECT);
        assert_eq!(err.category(), ErrorCategory::Transport);
        assert!(err.cause().is_some());
    }

    #[test]
    fn timeout_helper_uses_stable_code_and_category() {
        let err = CoreError::timeout();
        assert_eq!(err.code(), codes::TIMEOUT);
        assert_eq!(err.category(), ErrorCategory::Timeout);
    }
}
