//! `ServerConfig`: socket tuning and optional TLS acceptor for the generic
//! server engine.
//!
//! Grounded on `flog-client::config::ClientConfig`'s builder shape, mirrored
//! for the accept side.

use flog_transport_tcp::TcpSocketConfig;
use flog_transport_tls::TlsAcceptor;
use std::time::Duration;

/// Default per-request timeout applied to every read/write on an accepted
/// connection.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Clone)]
pub struct ServerConfig {
    pub(crate) tcp_socket_config: TcpSocketConfig,
    pub(crate) tls_acceptor: Option<TlsAcceptor>,
    pub(crate) request_timeout: Duration,
    pub(crate) tracing_enabled: bool,
}

impl ServerConfig {
    pub fn new() -> Self {
        Self {
            tcp_socket_config: TcpSocketConfig::new()
                .with_nodelay(true)
                .with_keepalive(true)
                .with_linger(Some(Duration::ZERO)),
            tls_acceptor: None,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            tracing_enabled: false,
        }
    }

    pub fn with_tcp_socket_config(mut self, config: TcpSocketConfig) -> Self {
        self.tcp_socket_config = config;
        self
    }

    /// Required for `https`/`oncrpcs` targets; building a server bound to
    /// such a scheme without one fails at bind time.
    pub fn with_tls_acceptor(mut self, acceptor: TlsAcceptor) -> Self {
        self.tls_acceptor = Some(acceptor);
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_tracing(mut self, enabled: bool) -> Self {
        self.tracing_enabled = enabled;
        self
    }

    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::new()
    }
}
