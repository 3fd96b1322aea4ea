use crate::socket::{TlsSocket, TlsStreamKind};
use flog_core::context::CallContext;
use flog_core::error::{CoreError, codes};
use flog_core::reactor::run_with_deadline;
use flog_core::transport::TransportSocketAddr;
use std::sync::Arc;
use tokio::net::TcpStream;

/// Server-side TLS handshake driver over an already-accepted TCP stream.
///
/// Grounded on `spark_transport_tls::acceptor::TlsAcceptor`, trimmed of the
/// teacher's `ArcSwap`-based hot-reload path — `ServerConfig` here is
/// supplied once at server construction.
#[derive(Clone)]
pub struct TlsAcceptor {
    config: Arc<rustls::ServerConfig>,
}

impl TlsAcceptor {
    pub fn new(config: Arc<rustls::ServerConfig>) -> Self {
        Self { config }
    }

    /// Performs the TLS handshake on a raw, already-accepted TCP stream.
    /// Takes ownership of the stream rather than an already-wrapped
    /// `TcpSocket`, since `flog-server`'s accept cycle hands over a bare
    /// `tokio::net::TcpStream` before any `flog-core::socket::Socket`
    /// wrapping happens.
    pub async fn accept(&self, ctx: &CallContext, stream: TcpStream) -> Result<TlsSocket, CoreError> {
        let local_addr: TransportSocketAddr = stream
            .local_addr()
            .map_err(|e| CoreError::from_io(codes::ACCEPT, e))?
            .into();
        let peer_addr: TransportSocketAddr = stream
            .peer_addr()
            .map_err(|e| CoreError::from_io(codes::ACCEPT, e))?
            .into();

        let acceptor = tokio_rustls::TlsAcceptor::from(Arc::clone(&self.config));
        let fut = async move {
            acceptor
                .accept(stream)
                .await
                .map_err(|e| CoreError::from_io(codes::ACCEPT, e))
        };
        let tls_stream = run_with_deadline(ctx, fut).await?;
        Ok(TlsSocket::new(TlsStreamKind::Server(tls_stream), local_addr, peer_addr))
    }
}
