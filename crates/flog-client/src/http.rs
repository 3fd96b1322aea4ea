//! `HttpClient`: the HTTP/1.1 façade over [`ClientEngine`], with `get`/`put` convenience methods mirroring the
//! original's two call sites.

use crate::config::ClientConfig;
use crate::engine::{ClientEngine, FeedOutcome};
use flog_codec_http::{HttpRequest, HttpResponse, ResponseDecodeOutcome};
use flog_core::error::CoreError;

/// An HTTP/1.1 client bound to one origin (scheme + host + port). Every
/// call goes through [`ClientEngine::exchange`], so pooling, timeouts and
/// metrics are shared with the RPC façade's implementation for free.
pub struct HttpClient {
    engine: ClientEngine,
}

impl HttpClient {
    /// `origin_uri` names the target origin, e.g. `"http://example.com/"` or
    /// `"https://example.com/"`; the resource path of each individual
    /// request is supplied to [`HttpClient::get`]/[`HttpClient::put`], not
    /// here.
    pub fn new(origin_uri: &str, config: ClientConfig) -> Result<Self, CoreError> {
        Ok(Self { engine: ClientEngine::new(origin_uri, config)? })
    }

    pub fn engine(&self) -> &ClientEngine {
        &self.engine
    }

    pub async fn get(&self, path: &str) -> Result<HttpResponse, CoreError> {
        self.send(HttpRequest::build("GET", path)).await
    }

    pub async fn put(&self, path: &str, body: Vec<u8>) -> Result<HttpResponse, CoreError> {
        self.send(HttpRequest::with_body("PUT", path, body)).await
    }

    /// Sends an arbitrary pre-built request, setting `Host` and
    /// `User-Agent` if the caller has not already.
    pub async fn send(&self, mut request: HttpRequest) -> Result<HttpResponse, CoreError> {
        if request.get_header("Host", "").is_empty() {
            request.set_header("Host", self.engine.uri().host());
        }
        if request.get_header("User-Agent", "").is_empty() {
            request.set_header("User-Agent", self.engine.config().user_agent());
        }

        let slices = request.serialize();
        let payload: Vec<u8> = slices.iter().flat_map(|s| s.to_vec()).collect();
        drop(slices);

        let mut response = HttpResponse::new();
        self.engine
            .exchange(&payload, |chunk| {
                let (outcome, _consumed) = response.feed(chunk)?;
                Ok(match outcome {
                    ResponseDecodeOutcome::NeedMore => FeedOutcome::NeedMore,
                    ResponseDecodeOutcome::Done => FeedOutcome::Done(()),
                })
            })
            .await?;
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flog_server::{HttpServer, RequestHandler, ServerConfig};
    use std::sync::Arc;
    use std::time::Duration;

    struct Upper;

    #[async_trait::async_trait]
    impl RequestHandler for Upper {
        type Request = HttpRequest;
        type Response = HttpResponse;

        async fn handle(&self, mut request: HttpRequest) -> HttpResponse {
            let body = request.take_body().unwrap_or_default();
            let upper: Vec<u8> = body.iter().map(|b| b.to_ascii_uppercase()).collect();
            HttpResponse::with_status_and_body(200, upper)
        }
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn put_then_get_round_trips_through_a_real_server() {
        let server = HttpServer::bind("http://127.0.0.1:0/", Arc::new(Upper), ServerConfig::new()).await.unwrap();
        let origin = format!("http://{}/", server.local_addr());
        let client = HttpClient::new(&origin, ClientConfig::new()).unwrap();

        let resp = client.put("/echo", b"hello".to_vec()).await.unwrap();
        assert_eq!(resp.status_code(), 200);
        assert_eq!(resp.body(), Some(&b"HELLO"[..]));

        server.shutdown().await;
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn connecting_to_a_closed_port_is_a_transport_error() {
        let client = HttpClient::new("http://127.0.0.1:1/", ClientConfig::new()).unwrap();
        let result = client.get("/").await;
        assert!(result.is_err());
    }

    struct NeverReplies;

    #[async_trait::async_trait]
    impl RequestHandler for NeverReplies {
        type Request = HttpRequest;
        type Response = HttpResponse;

        async fn handle(&self, _request: HttpRequest) -> HttpResponse {
            // Holds the handler task open well past any client timeout
            // under test so the response is never written back.
            tokio::time::sleep(Duration::from_secs(10)).await;
            HttpResponse::with_status(200)
        }
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn a_server_that_never_replies_times_out_within_the_configured_window() {
        let server = HttpServer::bind("http://127.0.0.1:0/", Arc::new(NeverReplies), ServerConfig::new()).await.unwrap();
        let origin = format!("http://{}/", server.local_addr());
        let client = HttpClient::new(&origin, ClientConfig::new().with_timeout(Duration::from_millis(100))).unwrap();

        let started = std::time::Instant::now();
        let result = client.get("/").await;
        let elapsed = started.elapsed();

        assert!(result.is_err());
        assert_eq!(result.unwrap_err().category(), flog_core::error::ErrorCategory::Timeout);
        assert!(elapsed >= Duration::from_millis(100), "fired early: {elapsed:?}");
        assert!(elapsed <= Duration::from_millis(500), "fired too late: {elapsed:?}");

        server.shutdown().await;
    }

    fn self_signed_server_config() -> rustls::ServerConfig {
        let certified = rcgen::generate_simple_self_signed(vec!["localhost".to_string()]).unwrap();
        let cert_der = certified.cert.der().clone();
        let key_der = rustls_pki_types::PrivateKeyDer::Pkcs8(rustls_pki_types::PrivatePkcs8KeyDer::from(
            certified.key_pair.serialize_der(),
        ));
        rustls::ServerConfig::builder()
            .with_no_client_auth()
            .with_single_cert(vec![cert_der], key_der)
            .expect("self-signed cert/key pair builds a valid ServerConfig")
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn https_get_with_verify_none_round_trips_like_plain_http() {
        let acceptor = flog_transport_tls::TlsAcceptor::new(Arc::new(self_signed_server_config()));
        let server_config = ServerConfig::new().with_tls_acceptor(acceptor);
        let server = HttpServer::bind("https://127.0.0.1:0/", Arc::new(Upper), server_config).await.unwrap();

        let origin = format!("https://localhost:{}/", server.local_addr().port());
        let connector = flog_transport_tls::TlsConnector::new(flog_transport_tls::insecure_client_config());
        let client_config = ClientConfig::new().with_tls_connector(connector);
        let client = HttpClient::new(&origin, client_config).unwrap();

        let resp = client.put("/echo", b"hi".to_vec()).await.unwrap();
        assert_eq!(resp.status_code(), 200);
        assert_eq!(resp.body(), Some(&b"HI"[..]));

        server.shutdown().await;
    }
}
