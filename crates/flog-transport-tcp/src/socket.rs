use crate::config::TcpSocketConfig;
use async_trait::async_trait;
use flog_core::context::{CallContext, Context};
use flog_core::error::{CoreError, codes};
use flog_core::reactor::run_with_deadline;
use flog_core::socket::{PollReady, ReadyState, Socket};
use flog_core::transport::{ShutdownDirection, TransportSocketAddr, resolve_with_ipv4_fallback, should_retry_candidate};
use std::io::IoSlice;
use std::net::Shutdown as StdShutdown;
use std::sync::Arc;
use std::task::Poll;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::Mutex as AsyncMutex;

struct Inner {
    stream: AsyncMutex<TcpStream>,
    local_addr: TransportSocketAddr,
    peer_addr: TransportSocketAddr,
}

/// A single TCP connection. Reads and writes serialize on an internal
/// async mutex rather than using `TcpStream::split`, trading full-duplex
/// concurrency for a simpler `&self`-based `Socket` impl.
///
/// Grounded on `spark_transport_tcp::channel::TcpChannel`.
#[derive(Clone)]
pub struct TcpSocket {
    inner: Arc<Inner>,
}

impl TcpSocket {
    fn from_stream(stream: TcpStream) -> Result<Self, CoreError> {
        let local_addr = stream
            .local_addr()
            .map_err(|e| CoreError::from_io(codes::CONNECT, e))?
            .into();
        let peer_addr = stream
            .peer_addr()
            .map_err(|e| CoreError::from_io(codes::CONNECT, e))?
            .into();
        Ok(Self {
            inner: Arc::new(Inner {
                stream: AsyncMutex::new(stream),
                local_addr,
                peer_addr,
            }),
        })
    }

    pub(crate) fn from_accepted(stream: TcpStream, config: &TcpSocketConfig) -> Result<Self, CoreError> {
        config
            .apply(&stream)
            .map_err(|e| CoreError::from_io(codes::CONFIGURE, e))?;
        Self::from_stream(stream)
    }

    /// Connects to `addr`, trying IPv6 candidates before IPv4 and retrying
    /// on `EAFNOSUPPORT`.
    pub async fn connect(ctx: &CallContext, addr: TransportSocketAddr, config: TcpSocketConfig) -> Result<Self, CoreError> {
        let candidates = resolve_with_ipv4_fallback(&[addr.as_std()]);
        let mut last_err: Option<CoreError> = None;

        for candidate in candidates {
            let std_addr = candidate.as_std();
            let fut = async move {
                TcpStream::connect(std_addr)
                    .await
                    .map_err(|e| CoreError::from_io(codes::CONNECT, e))
            };
            match run_with_deadline(ctx, fut).await {
                Ok(stream) => {
                    config
                        .apply(&stream)
                        .map_err(|e| CoreError::from_io(codes::CONFIGURE, e))?;
                    return Self::from_stream(stream);
                }
                Err(err) => {
                    if !should_retry_candidate(&err) {
                        return Err(err);
                    }
                    last_err = Some(err);
                }
            }
        }
        Err(last_err.unwrap_or_else(|| CoreError::transport(codes::CONNECT, "no address candidates")))
    }
}

#[async_trait]
impl Socket for TcpSocket {
    fn local_addr(&self) -> Option<TransportSocketAddr> {
        Some(self.inner.local_addr)
    }

    fn peer_addr(&self) -> Option<TransportSocketAddr> {
        Some(self.inner.peer_addr)
    }

    async fn read(&self, ctx: &CallContext, buf: &mut [u8]) -> Result<usize, CoreError> {
        let inner = Arc::clone(&self.inner);
        let len = buf.len();
        // Reads into an owned scratch buffer rather than `buf` directly:
        // `run_with_deadline` spawns the I/O future so it can keep running
        // past a timeout, which means it must not borrow from a caller
        // stack frame that may already be gone by then.
        let (n, scratch) = run_with_deadline(ctx, async move {
            let mut guard = inner.stream.lock().await;
            let mut scratch = vec![0u8; len];
            let n = guard
                .read(&mut scratch)
                .await
                .map_err(|e| CoreError::from_io(codes::READ, e))?;
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
            guard
                .write(&owned)
                .await
                .map_err(|e| CoreError::from_io(codes::WRITE, e))
        })
        .await
    }

    async fn writev(&self, ctx: &CallContext, bufs: &[IoSlice<'_>]) -> Result<usize, CoreError> {
        let inner = Arc::clone(&self.inner);
        let owned: Vec<Vec<u8>> = bufs.iter().map(|s| s.to_vec()).collect();
        run_with_deadline(ctx, async move {
            let slices: Vec<IoSlice<'_>> = owned.iter().map(|v| IoSlice::new(v)).collect();
            let mut guard = inner.stream.lock().await;
            guard
                .write_vectored(&slices)
                .await
                .map_err(|e| CoreError::from_io(codes::WRITE_VECTORED, e))
        })
        .await
    }

    async fn shutdown(&self, ctx: &CallContext, direction: ShutdownDirection) -> Result<(), CoreError> {
        let inner = Arc::clone(&self.inner);
        run_with_deadline(ctx, async move {
            let guard = inner.stream.lock().await;
            let how = match direction {
                ShutdownDirection::Read => StdShutdown::Read,
                ShutdownDirection::Write => StdShutdown::Write,
                ShutdownDirection::Both => StdShutdown::Both,
            };
            socket2::SockRef::from(&*guard)
                .shutdown(how)
                .map_err(|e| CoreError::from_io(codes::SHUTDOWN, e))
        })
        .await
    }

    async fn close(&self) -> Result<(), CoreError> {
        let mut guard = self.inner.stream.lock().await;
        guard
            .shutdown()
            .await
            .map_err(|e| CoreError::from_io(codes::SHUTDOWN, e))
    }

    fn poll_ready(&self, _ctx: Context<'_>) -> PollReady {
        // `TcpStream::poll_write_ready` requires a `&mut` context we don't
        // have through `&self`; callers on the hot write path are expected
        // to attempt the write and treat `WouldBlock` as the readiness
        // signal instead. Reported as always-ready here, matching the
        // teacher's non-blocking-probe fallback for mutex-guarded streams.
        Poll::Ready(Ok(ReadyState::Ready))
    }
}
