use async_trait::async_trait;
use flog_core::context::{CallContext, Context};
use flog_core::error::{CoreError, codes};
use flog_core::reactor::run_with_deadline;
use flog_core::socket::{PollReady, ReadyState, Socket};
use flog_core::transport::{ShutdownDirection, TransportSocketAddr};
use std::io::IoSlice;
use std::sync::Arc;
use std::task::Poll;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::Mutex as AsyncMutex;
use tokio_rustls::client::TlsStream as ClientTlsStream;
use tokio_rustls::server::TlsStream as ServerTlsStream;

/// Either side of a completed TLS handshake. Kept as an enum rather than two
/// separate socket types because `flog-client`/`flog-server` both want a
/// single `Socket` impl regardless of which side negotiated the session —
/// grounded on `spark_transport_tls::channel::TlsChannel`, which instead
/// only ever wraps the server-side stream; this workspace needs both
/// roles, so that shape is widened into an enum rather than duplicated.
pub(crate) enum TlsStreamKind {
    Client(ClientTlsStream<TcpStream>),
    Server(ServerTlsStream<TcpStream>),
}

impl TlsStreamKind {
    fn server_name(&self) -> Option<String> {
        match self {
            TlsStreamKind::Client(_) => None,
            TlsStreamKind::Server(stream) => {
                let (_, conn) = stream.get_ref();
                conn.server_name().map(|n| n.to_string())
            }
        }
    }
}

struct Inner {
    stream: AsyncMutex<TlsStreamKind>,
    local_addr: TransportSocketAddr,
    peer_addr: TransportSocketAddr,
    server_name: Option<String>,
}

/// A TLS-over-TCP connection. `read`/`write` map onto the TLS library's record-layer calls;
/// `writev` has no native gather path, so it concatenates then writes.
///
/// Grounded on `spark_transport_tls::channel::TlsChannel`.
#[derive(Clone)]
pub struct TlsSocket {
    inner: Arc<Inner>,
}

impl TlsSocket {
    pub(crate) fn new(stream: TlsStreamKind, local_addr: TransportSocketAddr, peer_addr: TransportSocketAddr) -> Self {
        let server_name = stream.server_name();
        Self {
            inner: Arc::new(Inner {
                stream: AsyncMutex::new(stream),
                local_addr,
                peer_addr,
                server_name,
            }),
        }
    }

    /// The SNI the peer presented during the handshake, if this socket is
    /// server-side and the client sent one.
    pub fn server_name(&self) -> Option<&str> {
        self.inner.server_name.as_deref()
    }
}

#[async_trait]
impl Socket for TlsSocket {
    fn local_addr(&self) -> Option<TransportSocketAddr> {
        Some(self.inner.local_addr)
    }

    fn peer_addr(&self) -> Option<TransportSocketAddr> {
        Some(self.inner.peer_addr)
    }

    async fn read(&self, ctx: &CallContext, buf: &mut [u8]) -> Result<usize, CoreError> {
        let inner = Arc::clone(&self.inner);
        let len = buf.len();
        let (n, scratch) = run_with_deadline(ctx, async move {
            let mut guard = inner.stream.lock().await;
            let mut scratch = vec![0u8; len];
            let n = read_any(&mut guard, &mut scratch).await?;
            Ok((n, scratch))
        })
        .await?;
        buf[..n].copy_from_slice(&scratch[..n]);
        Ok(n)
    }

    async fn write(&self, ctx: &CallContext, buf: &[u8]) -> Result<usize, CoreError> {
        let inner = Arc::clone(&self.inner);
        let owned = buf.to_vec();
        run_with_deadline(ctx, async move {
            let mut guard = inner.stream.lock().await;
            write_any(&mut guard, &owned).await
        })
        .await
    }

    /// TLS has no gather-write primitive; concatenate then write.
    async fn writev(&self, ctx: &CallContext, bufs: &[IoSlice<'_>]) -> Result<usize, CoreError> {
        let mut owned = Vec::with_capacity(bufs.iter().map(|s| s.len()).sum());
        for s in bufs {
            owned.extend_from_slice(s);
        }
        self.write(ctx, &owned).await
    }

    async fn shutdown(&self, ctx: &CallContext, direction: ShutdownDirection) -> Result<(), CoreError> {
        if matches!(direction, ShutdownDirection::Read) {
            return Ok(());
        }
        let inner = Arc::clone(&self.inner);
        run_with_deadline(ctx, async move {
            let mut guard = inner.stream.lock().await;
            shutdown_any(&mut guard).await
        })
        .await
    }

    async fn close(&self) -> Result<(), CoreError> {
        let mut guard = self.inner.stream.lock().await;
        shutdown_any(&mut guard).await
    }

    fn poll_ready(&self, _ctx: Context<'_>) -> PollReady {
        // Mirrors `TcpSocket::poll_ready`: the TLS engine's own record-layer
        // buffering means readiness is only meaningfully observed by
        // attempting the call, not polled ahead of time through a
        // mutex-guarded stream.
        Poll::Ready(Ok(ReadyState::Ready))
    }
}

async fn read_any(stream: &mut TlsStreamKind, buf: &mut [u8]) -> Result<usize, CoreError> {
    match stream {
        TlsStreamKind::Client(s) => s.read(buf).await,
        TlsStreamKind::Server(s) => s.read(buf).await,
    }
    .map_err(|e| CoreError::from_io(codes::READ, e))
}

async fn write_any(stream: &mut TlsStreamKind, buf: &[u8]) -> Result<usize, CoreError> {
    match stream {
        TlsStreamKind::Client(s) => s.write(buf).await,
        TlsStreamKind::Server(s) => s.write(buf).await,
    }
    .map_err(|e| CoreError::from_io(codes::WRITE, e))
}

async fn shutdown_any(stream: &mut TlsStreamKind) -> Result<(), CoreError> {
    match stream {
        TlsStreamKind::Client(s) => AsyncWriteExt::shutdown(s).await,
        TlsStreamKind::Server(s) => AsyncWriteExt::shutdown(s).await,
    }
    .map_err(|e| CoreError::from_io(codes::SHUTDOWN, e))
}
