use crate::socket::{TlsSocket, TlsStreamKind};
use flog_core::context::CallContext;
use flog_core::error::{CoreError, codes};
use flog_core::reactor::run_with_deadline;
use flog_core::transport::{TransportSocketAddr, resolve_with_ipv4_fallback, should_retry_candidate};
use flog_transport_tcp::TcpSocketConfig;
use rustls_pki_types::ServerName;
use std::sync::Arc;
use tokio::net::TcpStream;

/// Client-side TLS handshake driver. Connects the raw TCP socket (with the
/// same IPv6→IPv4 fallback every other transport uses), applies the
/// caller's socket options, then wraps it in a `rustls::ClientConnection`
/// and declares the socket connected only once the handshake completes.
///
/// Grounded on `spark_transport_tls::acceptor::TlsAcceptor`'s server-side
/// shape, mirrored for the client role that crate doesn't cover.
#[derive(Clone)]
pub struct TlsConnector {
    inner: tokio_rustls::TlsConnector,
}

impl TlsConnector {
    pub fn new(config: rustls::ClientConfig) -> Self {
        Self {
            inner: tokio_rustls::TlsConnector::from(Arc::new(config)),
        }
    }

    pub async fn connect(
        &self,
        ctx: &CallContext,
        addr: TransportSocketAddr,
        server_name: ServerName<'static>,
        tcp_config: TcpSocketConfig,
    ) -> Result<TlsSocket, CoreError> {
        let candidates = resolve_with_ipv4_fallback(&[addr.as_std()]);
        let mut last_err: Option<CoreError> = None;

        for candidate in candidates {
            let std_addr = candidate.as_std();
            let connector = self.inner.clone();
            let fut = async move {
                let stream = TcpStream::connect(std_addr)
                    .await
                    .map_err(|e| CoreError::from_io(codes::CONNECT, e))?;
                Ok(stream)
            };
            let stream = match run_with_deadline(ctx, fut).await {
                Ok(stream) => stream,
                Err(err) => {
                    if !should_retry_candidate(&err) {
                        return Err(err);
                    }
                    last_err = Some(err);
                    continue;
                }
            };

            tcp_config
                .apply(&stream)
                .map_err(|e| CoreError::from_io(codes::CONFIGURE, e))?;
            let local_addr: TransportSocketAddr = stream
                .local_addr()
                .map_err(|e| CoreError::from_io(codes::CONNECT, e))?
                .into();
            let peer_addr: TransportSocketAddr = stream
                .peer_addr()
                .map_err(|e| CoreError::from_io(codes::CONNECT, e))?
                .into();

            let connector = self.inner.clone();
            let server_name = server_name.clone();
            let handshake = async move {
                connector
                    .connect(server_name, stream)
                    .await
                    .map_err(|e| CoreError::from_io(codes::CONNECT, e))
            };
            let tls_stream = run_with_deadline(ctx, handshake).await?;
            return Ok(TlsSocket::new(TlsStreamKind::Client(tls_stream), local_addr, peer_addr));
        }
        Err(last_err.unwrap_or_else(|| CoreError::transport(codes::CONNECT, "no address candidates")))
    }
}
