//! A transparent logging decorator over any [`Socket`].
//!
//! Grounded on `spark_transport_tcp::channel::TcpChannel`'s own
//! `tracing::trace!` instrumentation at its read/write call sites, lifted
//! out into a standalone decorator so any socket variant (TCP, UDP-backed
//! stream adapters, TLS) can be wrapped identically rather than duplicating
//! the logging calls in each transport crate.

use super::{PollReady, Socket};
use crate::context::{CallContext, Context};
use crate::error::CoreError;
use crate::transport::{ShutdownDirection, TransportSocketAddr};
use async_trait::async_trait;
use std::io::IoSlice;
use tracing::{debug, warn};

/// Wraps any [`Socket`] implementation with `tracing` events at
/// `target: "flog::socket::trace"` for every call, then delegates. Used by
/// the client/server engines when `ClientConfig`/`ServerConfig` request
/// tracing.
pub struct TracingSocket<S> {
    inner: S,
    label: String,
}

impl<S: Socket> TracingSocket<S> {
    pub fn new(inner: S, label: impl Into<String>) -> Self {
        Self { inner, label: label.into() }
    }

    pub fn into_inner(self) -> S {
        self.inner
    }
}

#[async_trait]
impl<S: Socket> Socket for TracingSocket<S> {
    fn local_addr(&self) -> Option<TransportSocketAddr> {
        self.inner.local_addr()
    }

    fn peer_addr(&self) -> Option<TransportSocketAddr> {
        self.inner.peer_addr()
    }

    async fn read(&self, ctx: &CallContext, buf: &mut [u8]) -> Result<usize, CoreError> {
        let result = self.inner.read(ctx, buf).await;
        match &result {
            Ok(n) => debug!(target: "flog::socket::trace", socket = %self.label, direction = "read", bytes = n),
            Err(e) => warn!(target: "flog::socket::trace", socket = %self.label, direction = "read", error = %e),
        }
        result
    }

    async fn write(&self, ctx: &CallContext, buf: &[u8]) -> Result<usize, CoreError> {
        let result = self.inner.write(ctx, buf).await;
        match &result {
            Ok(n) => debug!(target: "flog::socket::trace", socket = %self.label, direction = "write", bytes = n),
            Err(e) => warn!(target: "flog::socket::trace", socket = %self.label, direction = "write", error = %e),
        }
        result
    }

    async fn writev(&self, ctx: &CallContext, bufs: &[IoSlice<'_>]) -> Result<usize, CoreError> {
        let result = self.inner.writev(ctx, bufs).await;
        match &result {
            Ok(n) => debug!(target: "flog::socket::trace", socket = %self.label, direction = "writev", bytes = n),
            Err(e) => warn!(target: "flog::socket::trace", socket = %self.label, direction = "writev", error = %e),
        }
        result
    }

    async fn shutdown(&self, ctx: &CallContext, direction: ShutdownDirection) -> Result<(), CoreError> {
        debug!(target: "flog::socket::trace", socket = %self.label, direction = "shutdown", ?direction);
        self.inner.shutdown(ctx, direction).await
    }

    async fn close(&self) -> Result<(), CoreError> {
        debug!(target: "flog::socket::trace", socket = %self.label, direction = "close");
        self.inner.close().await
    }

    fn poll_ready(&self, ctx: Context<'_>) -> PollReady {
        self.inner.poll_ready(ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct AlwaysOk;

    #[async_trait]
    impl Socket for AlwaysOk {
        fn local_addr(&self) -> Option<TransportSocketAddr> {
            None
        }
        fn peer_addr(&self) -> Option<TransportSocketAddr> {
            None
        }
        async fn read(&self, _ctx: &CallContext, buf: &mut [u8]) -> Result<usize, CoreError> {
            buf[0] = 7;
            Ok(1)
        }
        async fn write(&self, _ctx: &CallContext, buf: &[u8]) -> Result<usize, CoreError> {
            Ok(buf.len())
        }
        async fn writev(&self, _ctx: &CallContext, bufs: &[IoSlice<'_>]) -> Result<usize, CoreError> {
            Ok(bufs.iter().map(|s| s.len()).sum())
        }
        async fn shutdown(&self, _ctx: &CallContext, _direction: ShutdownDirection) -> Result<(), CoreError> {
            Ok(())
        }
        async fn close(&self) -> Result<(), CoreError> {
            Ok(())
        }
        fn poll_ready(&self, _ctx: Context<'_>) -> PollReady {
            std::task::Poll::Ready(Ok(super::super::ReadyState::Ready))
        }
    }

    #[tokio::test]
    async fn delegates_read_and_write_to_the_wrapped_socket() {
        let socket = TracingSocket::new(AlwaysOk, "test");
        let ctx = CallContext::new();
        let mut buf = [0u8; 1];
        assert_eq!(socket.read(&ctx, &mut buf).await.unwrap(), 1);
        assert_eq!(buf[0], 7);
        assert_eq!(socket.write(&ctx, b"abc").await.unwrap(), 3);
    }
}
