//! The socket abstraction: a polymorphic endpoint contract implemented by
//! TCP, UDP, TLS-over-TCP and a tracing decorator, each living in its own
//! transport crate. `flog-core` only defines the contract;
//! concrete async bodies live in `flog-transport-tcp`/`-udp`/`-tls`.
//!
//! Grounded on `spark_transport_tcp::channel::TcpChannel` and
//! `spark_core::transport::traits`: an `Arc<Inner>`-wrapped handle with
//! async read/write/shutdown, a synchronous `poll_ready` for backpressure,
//! and submission to an optional completion queue for the AIO path.

mod tracing;

pub use tracing::TracingSocket;

use crate::context::{CallContext, Context};
use crate::error::CoreError;
use crate::transport::{ShutdownDirection, TransportSocketAddr};
use async_trait::async_trait;
use std::io::IoSlice;
use std::task::Poll;

/// The outcome of a non-blocking readiness probe.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ReadyState {
    Ready,
    WouldBlock,
}

pub type PollReady = Poll<Result<ReadyState, CoreError>>;

/// Operations common to every socket variant. `read`/`write`
/// are the blocking-equivalent async path — in this Tokio-based runtime
/// "blocking" per spec means "runs to completion without going through the
/// completion-queue submission dance", which in practice is just awaiting
/// the future directly rather than handing a control block to
/// [`crate::reactor::CompletionQueue::submit`].
#[async_trait]
pub trait Socket: Send + Sync {
    fn local_addr(&self) -> Option<TransportSocketAddr>;
    fn peer_addr(&self) -> Option<TransportSocketAddr>;

    async fn read(&self, ctx: &CallContext, buf: &mut [u8]) -> Result<usize, CoreError>;
    async fn write(&self, ctx: &CallContext, buf: &[u8]) -> Result<usize, CoreError>;

    /// Vectored write; TLS sockets fall back to concatenating then writing.
    async fn writev(&self, ctx: &CallContext, bufs: &[IoSlice<'_>]) -> Result<usize, CoreError>;

    async fn shutdown(&self, ctx: &CallContext, direction: ShutdownDirection) -> Result<(), CoreError>;
    async fn close(&self) -> Result<(), CoreError>;

    /// Non-blocking probe of write readiness, used for backpressure
    /// classification without touching the completion queue.
    fn poll_ready(&self, ctx: Context<'_>) -> PollReady;
}

/// TCP-specific additions: `listen`/`accept`, `SO_LINGER`/`TCP_NODELAY`
/// configuration.
#[async_trait]
pub trait TcpListenerSocket: Send + Sync {
    type Accepted: Socket;

    fn local_addr(&self) -> TransportSocketAddr;
    async fn accept(&self, ctx: &CallContext) -> Result<(Self::Accepted, TransportSocketAddr), CoreError>;
}

/// UDP-specific additions: `recvfrom`/`sendto`; the datagram
/// socket is connectionless, so every read carries the originating peer
/// address and every write names a destination explicitly.
#[async_trait]
pub trait DatagramSocket: Send + Sync {
    fn local_addr(&self) -> TransportSocketAddr;

    async fn recv_from(&self, ctx: &CallContext, buf: &mut [u8]) -> Result<(usize, TransportSocketAddr), CoreError>;
    async fn send_to(&self, ctx: &CallContext, buf: &[u8], to: TransportSocketAddr) -> Result<usize, CoreError>;
}
