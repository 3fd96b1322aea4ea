//! The generic client engine: request → idle-socket pool →
//! connect/reconnect → write → read-loop → deserialize pipeline, protocol
//! agnostic. [`crate::http::HttpClient`] and [`crate::rpc::RpcClient`] are
//! thin instantiations over this engine with their own wire codecs.
//!
//! Grounded on `spark_transport_tcp::channel::TcpChannel`'s
//! `Mutex`-guarded reuse pattern for the idle pool, and on
//! `flog_core::reactor::run_with_deadline` for the "operation timer races
//! the I/O" contract — every
//! connect/read/write call already goes through that race inside the
//! transport crates, so the engine itself only needs a single
//! [`CallContext`] per request to get it for free.

use crate::config::ClientConfig;
use crate::metrics::ClientMetrics;
use crate::transport::{self, ClientTransport};
use flog_core::context::CallContext;
use flog_core::error::{CoreError, ErrorCategory, codes};
use flog_core::uri::Uri;
use std::sync::Mutex;

/// What a protocol's chunk-feed closure did with the bytes it was handed.
pub enum FeedOutcome<T> {
    NeedMore,
    Done(T),
}

/// One request/response cycle's pipeline, parameterized by the target's
/// URI: resolved peer, TLS context, idle
/// pool, and per-operation timeout all live here; [`HttpClient`]/[`RpcClient`]
/// supply only the wire serialization and the chunk-feed closure.
///
/// [`HttpClient`]: crate::http::HttpClient
/// [`RpcClient`]: crate::rpc::RpcClient
pub struct ClientEngine {
    uri: Uri,
    config: ClientConfig,
    pool: Mutex<Vec<ClientTransport>>,
    metrics: ClientMetrics,
}

impl ClientEngine {
    pub fn new(target_uri: &str, config: ClientConfig) -> Result<Self, CoreError> {
        let uri = Uri::parse(target_uri)?;
        Ok(Self { uri, config, pool: Mutex::new(Vec::new()), metrics: ClientMetrics::new() })
    }

    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn metrics(&self) -> &ClientMetrics {
        &self.metrics
    }

    /// The idle pool's current size — never exceeds successful
    /// request/response cycles completed minus reused sockets.
    pub fn idle_pool_len(&self) -> usize {
        self.pool.lock().expect("client pool mutex poisoned").len()
    }

    async fn acquire(&self, ctx: &CallContext) -> Result<ClientTransport, CoreError> {
        if let Some(transport) = self.pool.lock().expect("client pool mutex poisoned").pop() {
            self.metrics.record_pool_hit();
            return Ok(transport);
        }
        self.metrics.record_pool_miss();
        transport::connect(ctx, &self.uri, &self.config, "flog.client").await
    }

    fn release(&self, transport: ClientTransport) {
        let mut pool = self.pool.lock().expect("client pool mutex poisoned");
        if pool.len() < self.config.pool_capacity {
            pool.push(transport);
        }
        // Beyond the high-water mark the transport is simply dropped,
        // closing the underlying socket.
    }

    /// Writes `payload` on a pooled-or-fresh socket, then reads successive
    /// chunks into the caller's `feed` closure until it reports
    /// [`FeedOutcome::Done`]. On success the socket is
    /// returned to the idle pool; on any failure — transport, timeout, or
    /// malformed — the socket is dropped rather than pooled.
    pub async fn exchange<T>(
        &self,
        payload: &[u8],
        mut feed: impl FnMut(&[u8]) -> Result<FeedOutcome<T>, CoreError>,
    ) -> Result<T, CoreError> {
        let ctx = CallContext::with_timeout(self.config.timeout);
        self.metrics.record_request_sent();

        let transport = self.acquire(&ctx).await.inspect_err(|err| self.note_failure(err))?;

        match Self::drive(&ctx, transport, payload, &mut feed).await {
            Ok((transport, value)) => {
                self.release(transport);
                self.metrics.record_response_received();
                Ok(value)
            }
            Err(err) => {
                self.note_failure(&err);
                Err(err)
            }
        }
    }

    async fn drive<T>(
        ctx: &CallContext,
        transport: ClientTransport,
        payload: &[u8],
        feed: &mut impl FnMut(&[u8]) -> Result<FeedOutcome<T>, CoreError>,
    ) -> Result<(ClientTransport, T), CoreError> {
        match &transport {
            ClientTransport::Stream(socket) => {
                socket.write(ctx, payload).await?;
                loop {
                    let mut chunk = [0u8; 1024];
                    let n = socket.read(ctx, &mut chunk).await?;
                    if n == 0 {
                        return Err(CoreError::transport(codes::READ, "peer closed the connection before the response completed"));
                    }
                    match feed(&chunk[..n])? {
                        FeedOutcome::NeedMore => continue,
                        FeedOutcome::Done(value) => return Ok((transport, value)),
                    }
                }
            }
            ClientTransport::Datagram(socket, peer) => {
                socket.send_to(ctx, payload, *peer).await?;
                let mut chunk = [0u8; 65536];
                let (n, _from) = socket.recv_from(ctx, &mut chunk).await?;
                match feed(&chunk[..n])? {
                    FeedOutcome::Done(value) => Ok((transport, value)),
                    FeedOutcome::NeedMore => {
                        Err(CoreError::malformed(codes::RPC_MALFORMED, "datagram reply did not parse from a single packet"))
                    }
                }
            }
        }
    }

    fn note_failure(&self, err: &CoreError) {
        match err.category() {
            ErrorCategory::Timeout => self.metrics.record_timeout(),
            _ => self.metrics.record_transport_error(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClientConfig;
    use flog_codec_http::{HttpRequest, HttpResponse, ResponseDecodeOutcome};
    use flog_server::{HttpServer, RequestHandler, ServerConfig};
    use std::sync::Arc;

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
    async fn a_connect_refusal_is_surfaced_as_a_transport_error_not_pooled() {
        // Port 1 is a privileged, normally-closed port; connecting there
        // should fail fast with a transport error.
        let engine = ClientEngine::new("http://127.0.0.1:1/", ClientConfig::new()).unwrap();
        let mut req = HttpRequest::build("GET", "/");
        let payload: Vec<u8> = req.serialize().iter().flat_map(|s| s.to_vec()).collect();
        let mut resp = HttpResponse::new();
        let result = engine
            .exchange(&payload, |chunk| {
                let (outcome, _) = resp.feed(chunk)?;
                Ok(match outcome {
                    ResponseDecodeOutcome::NeedMore => FeedOutcome::NeedMore,
                    ResponseDecodeOutcome::Done => FeedOutcome::Done(()),
                })
            })
            .await;
        assert!(result.is_err());
        assert_eq!(engine.idle_pool_len(), 0);
        assert_eq!(engine.metrics().snapshot().transport_errors, 1);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn a_successful_cycle_returns_the_socket_to_the_pool() {
        let server = HttpServer::bind("http://127.0.0.1:0/", Arc::new(Echo), ServerConfig::new()).await.unwrap();
        let uri = format!("http://{}/", server.local_addr());
        let engine = ClientEngine::new(&uri, ClientConfig::new()).unwrap();

        let mut req = HttpRequest::with_body("PUT", "/x", b"hi".to_vec());
        let payload: Vec<u8> = req.serialize().iter().flat_map(|s| s.to_vec()).collect();
        let mut resp = HttpResponse::new();
        engine
            .exchange(&payload, |chunk| {
                let (outcome, _) = resp.feed(chunk)?;
                Ok(match outcome {
                    ResponseDecodeOutcome::NeedMore => FeedOutcome::NeedMore,
                    ResponseDecodeOutcome::Done => FeedOutcome::Done(()),
                })
            })
            .await
            .unwrap();

        assert_eq!(resp.body(), Some(&b"hi"[..]));
        assert_eq!(engine.idle_pool_len(), 1);
        server.shutdown().await;
    }
}
