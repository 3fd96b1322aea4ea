//! `RpcServer`: the ONC-RPC façade over the generic server engine, serving record-marked calls over TCP/TLS or bare
//! datagrams over UDP.

use crate::config::ServerConfig;
use crate::engine::{RequestHandler, ResponseTarget, ServerHandle, ShutdownSignal};
use crate::metrics::ServerMetrics;
use flog_codec_rpc::{FrameDecodeOutcome, RecordDecoder, RpcCallRequest, RpcReplyResponse};
use flog_core::context::CallContext;
use flog_core::error::{CoreError, ErrorCategory, codes};
use flog_core::socket::{Socket, TcpListenerSocket};
use flog_core::transport::TransportSocketAddr;
use flog_core::uri::{TransportKind, Uri};
use flog_transport_udp::UdpSocket;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener as TokioTcpListener;

/// A running ONC-RPC server bound to one address and transport.
pub struct RpcServer {
    handle: ServerHandle,
    metrics: Arc<ServerMetrics>,
}

impl RpcServer {
    /// `bind_uri` picks the transport by scheme suffix: `oncrpc` for TCP,
    /// `oncrpcs` for TLS (requires [`ServerConfig::with_tls_acceptor`]),
    /// `oncrpcu` for UDP.
    pub async fn bind<H>(bind_uri: &str, handler: Arc<H>, config: ServerConfig) -> Result<Self, CoreError>
    where
        H: RequestHandler<Request = RpcCallRequest, Response = RpcReplyResponse> + 'static,
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
                    CoreError::new(codes::CONFIGURE, ErrorCategory::Transport, "an oncrpcs bind was requested but no TlsAcceptor is configured")
                })?;
                let raw = TokioTcpListener::bind(addr).await.map_err(|e| CoreError::from_io(codes::BIND, e))?;
                let local_addr: TransportSocketAddr = raw.local_addr().map_err(|e| CoreError::from_io(codes::BIND, e))?.into();
                let metrics = Arc::clone(&metrics);
                let task = tokio::spawn(accept_tls(raw, acceptor, config.tcp_socket_config.clone(), handler, metrics, request_timeout, shutdown));
                (local_addr, task)
            }
            TransportKind::Udp => {
                let socket = Arc::new(UdpSocket::bind(addr.into()).await?);
                let local_addr = socket.local_addr();
                let metrics = Arc::clone(&metrics);
                let task = tokio::spawn(serve_udp(socket, handler, metrics, request_timeout, shutdown));
                (local_addr, task)
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

async fn dispatch_and_respond<H>(
    handler: &H,
    ctx: &CallContext,
    target: &ResponseTarget,
    request: RpcCallRequest,
    framed: bool,
) -> Result<(), CoreError>
where
    H: RequestHandler<Request = RpcCallRequest, Response = RpcReplyResponse>,
{
    let reply = handler.handle(request).await;
    let bytes = reply.to_xdr_bytes();
    let bytes = if framed { RecordDecoder::encode_record(&bytes)? } else { bytes };
    target.respond(ctx, &bytes).await
}

async fn accept_tcp<H>(
    listener: flog_transport_tcp::TcpListener,
    handler: Arc<H>,
    metrics: Arc<ServerMetrics>,
    request_timeout: Duration,
    shutdown: ShutdownSignal,
) where
    H: RequestHandler<Request = RpcCallRequest, Response = RpcReplyResponse> + 'static,
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
        tokio::spawn(serve_stream_connection(socket, handler, metrics, request_timeout, shutdown));
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
    H: RequestHandler<Request = RpcCallRequest, Response = RpcReplyResponse> + 'static,
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
            if let Ok(tls_socket) = acceptor.accept(&handshake_ctx, stream).await {
                let socket: Arc<dyn Socket> = Arc::new(tls_socket);
                serve_stream_connection(socket, handler, metrics, request_timeout, shutdown).await;
            }
        });
    }
}

async fn serve_stream_connection<H>(
    socket: Arc<dyn Socket>,
    handler: Arc<H>,
    metrics: Arc<ServerMetrics>,
    request_timeout: Duration,
    shutdown: ShutdownSignal,
) where
    H: RequestHandler<Request = RpcCallRequest, Response = RpcReplyResponse>,
{
    let target = ResponseTarget::Stream(Arc::clone(&socket));
    let mut decoder = RecordDecoder::new();
    loop {
        if shutdown.is_stopped() {
            let _ = socket.close().await;
            return;
        }

        let ctx = CallContext::with_timeout(request_timeout);
        let payload = match read_one_record(&socket, &ctx, &mut decoder).await {
            Ok(Some(payload)) => payload,
            Ok(None) => return,
            Err(_) => {
                metrics.record_malformed_disconnect();
                let _ = socket.close().await;
                return;
            }
        };

        let request = match RpcCallRequest::from_xdr_bytes(payload) {
            Ok(request) => request,
            Err(_) => {
                metrics.record_malformed_disconnect();
                let _ = socket.close().await;
                return;
            }
        };
        metrics.record_request_handled();

        if dispatch_and_respond(&*handler, &ctx, &target, request, true).await.is_err() {
            metrics.record_write_error();
            return;
        }
    }
}

async fn read_one_record(socket: &Arc<dyn Socket>, ctx: &CallContext, decoder: &mut RecordDecoder) -> Result<Option<Vec<u8>>, CoreError> {
    let mut first = true;
    loop {
        let mut chunk = [0u8; 1024];
        let n = socket.read(ctx, &mut chunk).await?;
        if n == 0 {
            if first {
                return Ok(None);
            }
            return Err(CoreError::malformed(codes::RPC_MALFORMED, "connection closed mid-record"));
        }
        first = false;
        match decoder.feed(&chunk[..n])? {
            FrameDecodeOutcome::NeedMore => continue,
            FrameDecodeOutcome::Done(payload) => return Ok(Some(payload)),
        }
    }
}

/// ONC-RPC over UDP carries the XDR call body directly, with no record
/// marker; one datagram is always exactly one call.
async fn serve_udp<H>(socket: Arc<UdpSocket>, handler: Arc<H>, metrics: Arc<ServerMetrics>, request_timeout: Duration, shutdown: ShutdownSignal)
where
    H: RequestHandler<Request = RpcCallRequest, Response = RpcReplyResponse> + 'static,
{
    loop {
        if shutdown.is_stopped() {
            return;
        }
        let recv_ctx = CallContext::new();
        let mut buf = [0u8; 65536];
        let received = tokio::select! {
            biased;
            _ = shutdown.wait() => None,
            result = socket.recv_from(&recv_ctx, &mut buf) => result.ok(),
        };
        let Some((n, peer)) = received else { return };
        let payload = buf[..n].to_vec();
        let handler = Arc::clone(&handler);
        let metrics = Arc::clone(&metrics);
        let socket = Arc::clone(&socket);

        tokio::spawn(async move {
            match RpcCallRequest::from_xdr_bytes(payload) {
                Ok(request) => {
                    metrics.record_request_handled();
                    let ctx = CallContext::with_timeout(request_timeout);
                    let target = ResponseTarget::Datagram(socket, peer);
                    let _ = dispatch_and_respond(&*handler, &ctx, &target, request, false).await;
                }
                Err(_) => metrics.record_malformed_disconnect(),
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flog_codec_rpc::accept_stat;

    struct Echo;

    #[async_trait::async_trait]
    impl RequestHandler for Echo {
        type Request = RpcCallRequest;
        type Response = RpcReplyResponse;

        async fn handle(&self, request: RpcCallRequest) -> RpcReplyResponse {
            if request.proc_ == 99 {
                return RpcReplyResponse::exception(request.xid, accept_stat::PROC_UNAVAIL);
            }
            RpcReplyResponse::success(request.xid, request.call_body)
        }
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn serves_a_call_over_tcp() {
        let server = RpcServer::bind("oncrpc://127.0.0.1:0/", Arc::new(Echo), ServerConfig::new()).await.unwrap();
        let addr = server.local_addr();

        let ctx = CallContext::new();
        let client = flog_transport_tcp::TcpSocket::connect(&ctx, addr, Default::default()).await.unwrap();
        let call = RpcCallRequest::new(42, 0x2000_0001, 1, 3, b"hi".to_vec());
        let record = RecordDecoder::encode_record(&call.to_xdr_bytes()).unwrap();
        client.write(&ctx, &record).await.unwrap();

        let mut decoder = RecordDecoder::new();
        let payload = loop {
            let mut buf = [0u8; 256];
            let n = client.read(&ctx, &mut buf).await.unwrap();
            if let FrameDecodeOutcome::Done(payload) = decoder.feed(&buf[..n]).unwrap().0 {
                break payload;
            }
        };
        let reply = RpcReplyResponse::from_xdr_bytes(payload).unwrap();
        assert_eq!(reply.xid, 42);
        assert_eq!(reply.body, flog_codec_rpc::RpcBody::Success(b"hi".to_vec()));
        assert_eq!(server.metrics().snapshot().requests_handled, 1);

        server.shutdown().await;
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn serves_a_call_over_udp() {
        let server = RpcServer::bind("oncrpcu://127.0.0.1:0/", Arc::new(Echo), ServerConfig::new()).await.unwrap();
        let addr = server.local_addr();

        let client = UdpSocket::bind(SocketAddr::new(std::net::IpAddr::V4(std::net::Ipv4Addr::LOCALHOST), 0).into())
            .await
            .unwrap();
        let ctx = CallContext::new();
        let call = RpcCallRequest::new(7, 0x2000_0001, 1, 3, b"dg".to_vec());
        client.send_to(&ctx, &call.to_xdr_bytes(), addr).await.unwrap();

        let mut buf = [0u8; 256];
        let (n, _from) = client.recv_from(&ctx, &mut buf).await.unwrap();
        let reply = RpcReplyResponse::from_xdr_bytes(buf[..n].to_vec()).unwrap();
        assert_eq!(reply.xid, 7);

        server.shutdown().await;
    }
}
