use crate::config::TcpSocketConfig;
use crate::socket::TcpSocket;
use async_trait::async_trait;
use flog_core::context::CallContext;
use flog_core::error::{CoreError, codes};
use flog_core::reactor::run_with_deadline;
use flog_core::socket::TcpListenerSocket;
use flog_core::transport::{TransportSocketAddr, resolve_with_ipv4_fallback, should_retry_candidate};
use std::sync::Arc;
use tokio::net::TcpListener as TokioTcpListener;

/// A bound, listening TCP socket.
///
/// Grounded on `spark_transport_tcp::channel::TcpServerChannel`. The
/// listener is held behind an `Arc` — like `TcpSocket`'s `Inner` — so
/// `accept`'s future can be `Arc::clone`d into an owned, `'static` task
/// for [`run_with_deadline`] instead of borrowing `&self`.
pub struct TcpListener {
    listener: Arc<TokioTcpListener>,
    local_addr: TransportSocketAddr,
    config: TcpSocketConfig,
}

impl TcpListener {
    pub async fn bind(addr: TransportSocketAddr, config: TcpSocketConfig) -> Result<Self, CoreError> {
        let candidates = resolve_with_ipv4_fallback(&[addr.as_std()]);
        let mut last_err: Option<CoreError> = None;

        for candidate in candidates {
            match TokioTcpListener::bind(candidate.as_std()).await {
                Ok(listener) => {
                    let local_addr = listener
                        .local_addr()
                        .map_err(|e| CoreError::from_io(codes::BIND, e))?
                        .into();
                    return Ok(Self {
                        listener: Arc::new(listener),
                        local_addr,
                        config,
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
impl TcpListenerSocket for TcpListener {
    type Accepted = TcpSocket;

    fn local_addr(&self) -> TransportSocketAddr {
        self.local_addr
    }

    async fn accept(&self, ctx: &CallContext) -> Result<(TcpSocket, TransportSocketAddr), CoreError> {
        let listener = Arc::clone(&self.listener);
        let fut = async move {
            listener
                .accept()
                .await
                .map_err(|e| CoreError::from_io(codes::ACCEPT, e))
        };
        let (stream, peer) = run_with_deadline(ctx, fut).await?;
        let peer: TransportSocketAddr = peer.into();
        let socket = TcpSocket::from_accepted(stream, &self.config)?;
        Ok((socket, peer))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flog_core::socket::Socket;
    use std::net::{IpAddr, Ipv4Addr, SocketAddr};

    #[tokio::test(flavor = "multi_thread")]
    async fn accept_and_connect_round_trip() {
        let bind_addr: TransportSocketAddr = SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 0).into();
        let listener = TcpListener::bind(bind_addr, TcpSocketConfig::new()).await.unwrap();
        let local = listener.local_addr();

        let ctx = CallContext::new();
        let server = tokio::spawn(async move {
            let (socket, _peer) = listener.accept(&ctx).await.unwrap();
            let mut buf = [0u8; 5];
            socket.read(&ctx, &mut buf).await.unwrap();
            assert_eq!(&buf, b"hello");
        });

        let ctx = CallContext::new();
        let client = TcpSocket::connect(&ctx, local, TcpSocketConfig::new()).await.unwrap();
        client.write(&ctx, b"hello").await.unwrap();

        server.await.unwrap();
    }
}
