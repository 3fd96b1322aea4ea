use async_trait::async_trait;
use flog_core::context::CallContext;
use flog_core::error::{CoreError, codes};
use flog_core::reactor::run_with_deadline;
use flog_core::socket::DatagramSocket;
use flog_core::transport::{TransportSocketAddr, resolve_with_ipv4_fallback, should_retry_candidate};
use std::sync::Arc;
use tokio::net::UdpSocket as TokioUdpSocket;

struct Inner {
    socket: TokioUdpSocket,
    local_addr: TransportSocketAddr,
}

/// A bound, connectionless UDP socket.
#[derive(Clone)]
pub struct UdpSocket {
    inner: Arc<Inner>,
}

impl UdpSocket {
    /// Binds a socket, preferring IPv6 candidates and falling back to IPv4
    /// on `EAFNOSUPPORT`, matching `flog-transport-tcp`'s `TcpListener::bind`.
    pub async fn bind(addr: TransportSocketAddr) -> Result<Self, CoreError> {
        let candidates = resolve_with_ipv4_fallback(&[addr.as_std()]);
        let mut last_err: Option<CoreError> = None;

        for candidate in candidates {
            match TokioUdpSocket::bind(candidate.as_std()).await {
                Ok(socket) => {
                    let local_addr = socket
                        .local_addr()
                        .map_err(|e| CoreError::from_io(codes::BIND, e))?
                        .into();
                    return Ok(Self {
                        inner: Arc::new(Inner { socket, local_addr }),
                    });
                }
                Err(err) => {
                    let err = CoreError::from_io(codes::BIND, err);
                    if !should_retry_candidate(&err) {
                        return Err(err);
                    }
                    last_err = Some(err);
                }
            }
        }
        Err(last_err.unwrap_or_else(|| CoreError::transport(codes::BIND, "no address candidates")))
    }
}

#[async_trait]
impl DatagramSocket for UdpSocket {
    fn local_addr(&self) -> TransportSocketAddr {
        self.inner.local_addr
    }

    async fn recv_from(&self, ctx: &CallContext, buf: &mut [u8]) -> Result<(usize, TransportSocketAddr), CoreError> {
        let inner = Arc::clone(&self.inner);
        let len = buf.len();
        let (n, from, scratch) = run_with_deadline(ctx, async move {
            let mut scratch = vec![0u8; len];
            let (n, from) = inner
                .socket
                .recv_from(&mut scratch)
                .await
                .map_err(|e| CoreError::from_io(codes::READ, e))?;
            Ok((n, from, scratch))
        })
        .await?;
        buf[..n].copy_from_slice(&scratch[..n]);
        Ok((n, from.into()))
    }

    async fn send_to(&self, ctx: &CallContext, buf: &[u8], to: TransportSocketAddr) -> Result<usize, CoreError> {
        let inner = Arc::clone(&self.inner);
        let owned = buf.to_vec();
        run_with_deadline(ctx, async move {
            inner
                .socket
                .send_to(&owned, to.as_std())
                .await
                .map_err(|e| CoreError::from_io(codes::WRITE, e))
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{IpAddr, Ipv4Addr, SocketAddr};

    #[tokio::test(flavor = "multi_thread")]
    async fn send_to_and_recv_from_round_trip() {
        let any: TransportSocketAddr = SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 0).into();
        let server = UdpSocket::bind(any).await.unwrap();
        let client = UdpSocket::bind(any).await.unwrap();
        let server_addr = server.local_addr();

        let ctx = CallContext::new();
        client.send_to(&ctx, b"ping", server_addr).await.unwrap();

        let mut buf = [0u8; 4];
        let (n, _from) = server.recv_from(&ctx, &mut buf).await.unwrap();
        assert_eq!(&buf[..n], b"ping");
    }
}
