//! `HttpServer`: the HTTP/1.1 façade over the generic server engine
//!, serving one [`RequestHandler`] over
//! either plain TCP or TLS.

use crate::config::ServerConfig;
use crate::engine::{RequestHandler, ServerHandle, ShutdownSignal};
use crate::metrics::ServerMetrics;
use flog_codec_http::{HttpRequest, HttpResponse, RequestDecodeOutcome};
use flog_core::context::CallContext;
use flog_core::error::{CoreError, ErrorCategory, codes};
use flog_core::socket::{Socket, TcpListenerSocket};
use flog_core::transport::TransportSocketAddr;
use flog_core::uri::{TransportKind, Uri};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener as TokioTcpListener;

/// A running HTTP/1.1 server bound to one address. Drop without calling
/// [`HttpServer::shutdown`] leaves the accept loop and any open
/// connections running in the background.
pub struct HttpServer {
    handle: ServerHandle,
    metrics: Arc<ServerMetrics>,
}

impl HttpServer {
    /// `bind_uri` names the listen address, e.g. `"http://127.0.0.1:0/"` to
    /// bind an ephemeral port, or `"https://0.0.0.0:8443/"` — the latter
    /// requires [`ServerConfig::with_tls_acceptor`] to have been set.
    pub async fn bind<H>(bind_uri: &str, handler: Arc<H>, config: ServerConfig) -> Result<Self, CoreError>
    where
        H: RequestHandler<Request = HttpRequest, Response = HttpResponse> + 'static,
    {
        let uri = Uri::parse(bind_uri)?;
        let addr: SocketAddr = format!("{}:{}", uri.host(), uri.port())
            .parse()
            .map_err(|_| CoreError::new(codes::BIND, ErrorCategory::Transport, format!("'{}' is not a bindable address", uri.host())))?;

        let metrics = Arc::new(ServerMetrics::new());
        let (shutdown, notify, stopped) = ShutdownSignal::new();
        let request_timeout = config.request_timeout();

        let (local_addr, accept_task) = match uri.transport_kind() {
            TransportKind::Tcp => {
                let listener = flog_transport_tcp::TcpListener::bind(addr.into(), config.tcp_socket_config.clone()).await?;
                let local_addr = listener.local_addr();
                let metrics = Arc::clone(&metrics);
                let task = tokio::spawn(accept_tcp(listener, handler, metrics, request_timeout, shutdown));
                (local_addr, task)
            }
            TransportKind::Tls => {
                let acceptor = config.tls_acceptor.clone().ok_or_else(|| {
                    CoreError::new(codes::CONFIGURE, ErrorCategory::Transport, "an https bind was requested but no TlsAcceptor is configured")
                })?;
                let raw = TokioTcpListener::bind(addr).await.map_err(|e| CoreError::from_io(codes::BIND, e))?;
                let local_addr: TransportSocketAddr = raw.local_addr().map_err(|e| CoreError::from_io(codes::BIND, e))?.into();
                let metrics = Arc::clone(&metrics);
                let task = tokio::spawn(accept_tls(raw, acceptor, config.tcp_socket_config.clone(), handler, metrics, request_timeout, shutdown));
                (local_addr, task)
            }
            TransportKind::Udp => {
                return Err(CoreError::new(codes::CONFIGURE, ErrorCategory::Transport, "HTTP does not run over UDP"));
            }
        };

        Ok(Self { handle: ServerHandle::new(local_addr, notify, stopped, accept_task), metrics })
    }

    pub fn local_addr(&self) -> TransportSocketAddr {
        self.handle.local_addr()
    }

    pub fn metrics(&self) -> &ServerMetrics {
        &self.metrics
    }

    pub async fn shutdown(self) {
        self.handle.shutdown().await;
    }
}

async fn accept_tcp<H>(
    listener: flog_transport_tcp::TcpListener,
    handler: Arc<H>,
    metrics: Arc<ServerMetrics>,
    request_timeout: Duration,
    shutdown: ShutdownSignal,
) where
    H: RequestHandler<Request = HttpRequest, Response = HttpResponse> + 'static,
{
    loop {
        if shutdown.is_stopped() {
            return;
        }
        let accept_ctx = CallContext::new();
        let accepted = tokio::select! {
            biased;
            _ = shutdown.wait() => None,
            result = listener.accept(&accept_ctx) => result.ok(),
        };
        let Some((socket, _peer)) = accepted else { return };
        metrics.record_connection_accepted();
        let socket: Arc<dyn Socket> = Arc::new(socket);
        let handler = Arc::clone(&handler);
        let metrics = Arc::clone(&metrics);
        let shutdown = shutdown.clone();
        tokio::spawn(serve_connection(socket, handler, metrics, request_timeout, shutdown));
    }
}

async fn accept_tls<H>(
    listener: TokioTcpListener,
    acceptor: flog_transport_tls::TlsAcceptor,
    tcp_config: flog_transport_tcp::TcpSocketConfig,
    handler: Arc<H>,
    metrics: Arc<ServerMetrics>,
    request_timeout: Duration,
    shutdown: ShutdownSignal,
) where
    H: RequestHandler<Request = HttpRequest, Response = HttpResponse> + 'static,
{
    loop {
        if shutdown.is_stopped() {
            return;
        }
        let accepted = tokio::select! {
            biased;
            _ = shutdown.wait() => None,
            result = listener.accept() => result.ok(),
        };
        let Some((stream, _peer)) = accepted else { return };
        if tcp_config.apply(&stream).is_err() {
            continue;
        }
        metrics.record_connection_accepted();
        let acceptor = acceptor.clone();
        let handler = Arc::clone(&handler);
        let metrics = Arc::clone(&metrics);
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            let handshake_ctx = CallContext::with_timeout(request_timeout);
            match acceptor.accept(&handshake_ctx, stream).await {
                Ok(tls_socket) => {
                    let socket: Arc<dyn Socket> = Arc::new(tls_socket);
                    serve_connection(socket, handler, metrics, request_timeout, shutdown).await;
                }
                Err(_) => {}
            }
        });
    }
}

/// Reads and dispatches requests off one connection until the peer closes
/// it, a write fails, or the server is shutting down.
async fn serve_connection<H>(socket: Arc<dyn Socket>, handler: Arc<H>, metrics: Arc<ServerMetrics>, request_timeout: Duration, shutdown: ShutdownSignal)
where
    H: RequestHandler<Request = HttpRequest, Response = HttpResponse>,
{
    loop {
        if shutdown.is_stopped() {
            let _ = socket.close().await;
            return;
        }

        let ctx = CallContext::with_timeout(request_timeout);
        let mut request = HttpRequest::new();
        match read_one_request(&socket, &ctx, &mut request).await {
            Ok(true) => {}
            Ok(false) => return,
            Err(_) => {
                metrics.record_malformed_disconnect();
                let _ = socket.close().await;
                return;
            }
        }

        let mut response = handler.handle(request).await;
        metrics.record_request_handled();
        let slices = response.serialize();
        let bytes: Vec<u8> = slices.iter().flat_map(|s| s.to_vec()).collect();
        drop(slices);

        if socket.write(&ctx, &bytes).await.is_err() {
            metrics.record_write_error();
            return;
        }
    }
}

async fn read_one_request(socket: &Arc<dyn Socket>, ctx: &CallContext, request: &mut HttpRequest) -> Result<bool, CoreError> {
    let mut first = true;
    loop {
        let mut chunk = [0u8; 1024];
        let n = socket.read(ctx, &mut chunk).await?;
        if n == 0 {
            if first {
                return Ok(false);
            }
            return Err(CoreError::malformed(codes::HTTP_MALFORMED, "connection closed mid-request"));
        }
        first = false;
        let (outcome, _consumed) = request.feed(&chunk[..n])?;
        if outcome == RequestDecodeOutcome::Done {
            return Ok(true);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Echo;

    #[async_trait::async_trait]
    impl RequestHandler for Echo {
        type Request = HttpRequest;
        type Response = HttpResponse;

        async fn handle(&self, mut request: HttpRequest) -> HttpResponse {
            let body = request.take_body().unwrap_or_default();
            HttpResponse::with_status_and_body(200, body)
        }
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn serves_a_request_and_reports_it_in_metrics() {
        let server = HttpServer::bind("http://127.0.0.1:0/", Arc::new(Echo), ServerConfig::new()).await.unwrap();
        let addr = server.local_addr();

        let ctx = CallContext::new();
        let client = flog_transport_tcp::TcpSocket::connect(&ctx, addr, Default::default()).await.unwrap();
        let mut request = HttpRequest::with_body("PUT", "/x", b"payload".to_vec());
        let slices = request.serialize();
        let bytes: Vec<u8> = slices.iter().flat_map(|s| s.to_vec()).collect();
        drop(slices);
        client.write(&ctx, &bytes).await.unwrap();

        let mut response = HttpResponse::new();
        loop {
            let mut buf = [0u8; 256];
            let n = client.read(&ctx, &mut buf).await.unwrap();
            let (outcome, _) = response.feed(&buf[..n]).unwrap();
            if outcome == flog_codec_http::ResponseDecodeOutcome::Done {
                break;
            }
        }
        assert_eq!(response.status_code(), 200);
        assert_eq!(response.body(), Some(&b"payload"[..]));
        assert_eq!(server.metrics().snapshot().requests_handled, 1);

        server.shutdown().await;
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn rejects_binding_http_over_udp() {
        let result = HttpServer::bind("oncrpcu://127.0.0.1:0/", Arc::new(Echo), ServerConfig::new()).await;
        assert!(result.is_err());
    }
}
