//! `RpcClient`: the ONC-RPC façade over [`ClientEngine`], picking record-mark framing or bare datagrams according
//! to the target URI's transport.

use crate::config::ClientConfig;
use crate::engine::{ClientEngine, FeedOutcome};
use flog_core::error::CoreError;
use flog_core::uri::TransportKind;
use flog_codec_rpc::{RecordDecoder, RpcCallRequest, RpcReplyResponse, FrameDecodeOutcome};
use std::sync::atomic::{AtomicU32, Ordering};

/// An ONC-RPC client bound to one server target. `oncrpc`/`oncrpcs` select
/// record-marked TCP/TLS; `oncrpcu` selects bare UDP datagrams.
pub struct RpcClient {
    engine: ClientEngine,
    next_xid: AtomicU32,
}

impl RpcClient {
    pub fn new(target_uri: &str, config: ClientConfig) -> Result<Self, CoreError> {
        Ok(Self { engine: ClientEngine::new(target_uri, config)?, next_xid: AtomicU32::new(1) })
    }

    pub fn engine(&self) -> &ClientEngine {
        &self.engine
    }

    /// Issues a call with an auto-incrementing transaction id.
    pub async fn call(&self, prog: u32, vers: u32, proc_: u32, args: Vec<u8>) -> Result<RpcReplyResponse, CoreError> {
        let xid = self.next_xid.fetch_add(1, Ordering::Relaxed);
        self.call_with_xid(xid, prog, vers, proc_, args).await
    }

    /// Issues a call with a caller-supplied transaction id, for callers
    /// that need to correlate replies themselves.
    pub async fn call_with_xid(
        &self,
        xid: u32,
        prog: u32,
        vers: u32,
        proc_: u32,
        args: Vec<u8>,
    ) -> Result<RpcReplyResponse, CoreError> {
        let request = RpcCallRequest::new(xid, prog, vers, proc_, args);
        let body = request.to_xdr_bytes();

        match self.engine.uri().transport_kind() {
            TransportKind::Udp => {
                self.engine
                    .exchange(&body, |chunk| Ok(FeedOutcome::Done(RpcReplyResponse::from_xdr_bytes(chunk.to_vec())?)))
                    .await
            }
            TransportKind::Tcp | TransportKind::Tls => {
                let record = RecordDecoder::encode_record(&body)?;
                let mut decoder = RecordDecoder::new();
                self.engine
                    .exchange(&record, |chunk| match decoder.feed(chunk)? {
                        FrameDecodeOutcome::NeedMore => Ok(FeedOutcome::NeedMore),
                        FrameDecodeOutcome::Done(payload) => Ok(FeedOutcome::Done(RpcReplyResponse::from_xdr_bytes(payload)?)),
                    })
                    .await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flog_codec_rpc::{RpcBody, accept_stat};
    use flog_server::{RequestHandler, RpcServer, ServerConfig};
    use std::sync::Arc;

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
    async fn a_call_over_tcp_round_trips_through_a_real_server() {
        let server = RpcServer::bind("oncrpc://127.0.0.1:0/", Arc::new(Echo), ServerConfig::new()).await.unwrap();
        let uri = format!("oncrpc://{}/", server.local_addr());
        let client = RpcClient::new(&uri, ClientConfig::new()).unwrap();

        let reply = client.call(0x2000_0001, 1, 3, b"payload".to_vec()).await.unwrap();
        assert_eq!(reply.body, RpcBody::Success(b"payload".to_vec()));

        server.shutdown().await;
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn an_unavailable_procedure_comes_back_as_a_fixed_exception() {
        let server = RpcServer::bind("oncrpc://127.0.0.1:0/", Arc::new(Echo), ServerConfig::new()).await.unwrap();
        let uri = format!("oncrpc://{}/", server.local_addr());
        let client = RpcClient::new(&uri, ClientConfig::new()).unwrap();

        let reply = client.call(0x2000_0001, 1, 99, Vec::new()).await.unwrap();
        match reply.body {
            RpcBody::Exception { accept_stat, .. } => assert_eq!(accept_stat, accept_stat::PROC_UNAVAIL),
            _ => panic!("expected an exception reply"),
        }

        server.shutdown().await;
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn a_call_over_udp_round_trips_through_a_real_server() {
        let server = RpcServer::bind("oncrpcu://127.0.0.1:0/", Arc::new(Echo), ServerConfig::new()).await.unwrap();
        let uri = format!("oncrpcu://{}/", server.local_addr());
        let client = RpcClient::new(&uri, ClientConfig::new()).unwrap();

        let reply = client.call(0x2000_0001, 1, 3, b"datagram".to_vec()).await.unwrap();
        assert_eq!(reply.body, RpcBody::Success(b"datagram".to_vec()));

        server.shutdown().await;
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn an_oversized_fragment_marker_closes_the_connection_and_surfaces_as_malformed() {
        use flog_core::context::CallContext;
        use flog_core::socket::Socket;

        let server = RpcServer::bind("oncrpc://127.0.0.1:0/", Arc::new(Echo), ServerConfig::new()).await.unwrap();
        let addr = server.local_addr();

        // 64 MiB declared length, last-fragment bit set: exceeds the 32
        // MiB cap the server enforces before it ever accumulates a byte
        // of payload.
        let oversized_marker: u32 = 0x8000_0000 | (64 * 1024 * 1024);

        let ctx = CallContext::new();
        let raw = flog_transport_tcp::TcpSocket::connect(&ctx, addr, Default::default()).await.unwrap();
        raw.write(&ctx, &oversized_marker.to_be_bytes()).await.unwrap();

        // The server closes the connection rather than replying; a read
        // on the same socket observes EOF instead of a reply record.
        let mut buf = [0u8; 1];
        let n = raw.read(&ctx, &mut buf).await.unwrap();
        assert_eq!(n, 0, "server should close the connection on an oversized fragment, not reply");

        server.shutdown().await;
    }
}
