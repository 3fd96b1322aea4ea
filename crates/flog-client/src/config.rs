//! `ClientConfig`: timeout, TLS context, tracing, and idle-pool sizing for
//! the generic client engine.
//!
//! Grounded on `spark_core::transport::builder::TransportBuilder`'s
//! builder-with-defaults shape, trimmed to the fields this workspace's
//! client engine actually branches on.

use flog_transport_tcp::TcpSocketConfig;
use flog_transport_tls::TlsConnector;
use std::time::Duration;

/// Default `User-Agent` the HTTP façade's convenience methods send,
/// verbatim from the original source (`ipc.cpp:419`).
pub const DEFAULT_USER_AGENT: &str = "Flog 0.99";

/// Default per-operation timeout applied to every connect/write/read when
/// a request does not override it.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default idle-socket pool high-water mark per [`crate::engine::ClientEngine`].
pub const DEFAULT_POOL_CAPACITY: usize = 16;

/// Builder for the generic client engine's tunables. Construct with
/// [`ClientConfig::new`] and chain `with_*` calls; every field has a
/// sensible default so `ClientConfig::new()` alone is usable.
#[derive(Clone)]
pub struct ClientConfig {
    pub(crate) timeout: Duration,
    pub(crate) user_agent: String,
    pub(crate) pool_capacity: usize,
    pub(crate) tracing_enabled: bool,
    pub(crate) tcp_socket_config: TcpSocketConfig,
    pub(crate) tls_connector: Option<TlsConnector>,
}

impl ClientConfig {
    pub fn new() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            pool_capacity: DEFAULT_POOL_CAPACITY,
            tracing_enabled: false,
            tcp_socket_config: TcpSocketConfig::new()
                .with_nodelay(true)
                .with_keepalive(true)
                .with_linger(Some(Duration::ZERO)),
            tls_connector: None,
        }
    }

    /// Per-operation timeout: every connect, write and read in the
    /// request pipeline races against this via
    /// [`flog_core::reactor::run_with_deadline`].
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Caps how many idle sockets a single [`crate::engine::ClientEngine`]
    /// keeps in its LIFO pool; sockets beyond the cap are simply dropped
    /// (closed) on release rather than kept.
    pub fn with_pool_capacity(mut self, capacity: usize) -> Self {
        self.pool_capacity = capacity;
        self
    }

    /// Wraps every socket the engine creates in a
    /// [`flog_core::socket::TracingSocket`].
    pub fn with_tracing(mut self, enabled: bool) -> Self {
        self.tracing_enabled = enabled;
        self
    }

    pub fn with_tcp_socket_config(mut self, config: TcpSocketConfig) -> Self {
        self.tcp_socket_config = config;
        self
    }

    /// Required for `https`/`oncrpcs` targets; omit for plain `http`/`oncrpc`/
    /// `oncrpcu` targets and the engine will error at connect time if the
    /// URI demands TLS.
    pub fn with_tls_connector(mut self, connector: TlsConnector) -> Self {
        self.tls_connector = Some(connector);
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new()
    }
}
