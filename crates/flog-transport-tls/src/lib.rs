//! TLS-over-TCP socket bindings for the Flog runtime.
//!
//! Grounded on `spark_transport_tls::{channel, acceptor}`: `rustls` +
//! `tokio-rustls` for the handshake and encrypted I/O, a
//! `tokio::sync::Mutex`-guarded stream exactly like `flog-transport-tcp`'s
//! `TcpSocket`, and `run_with_deadline` for cancellation/timeout instead of
//! `spark_transport_tls`'s own polling-based `run_with_context` helper
//! (this workspace's `flog-core::reactor` already provides that race).

mod acceptor;
mod connector;
mod danger;
mod socket;

pub use acceptor::TlsAcceptor;
pub use connector::TlsConnector;
pub use danger::insecure_client_config;
pub use socket::TlsSocket;
