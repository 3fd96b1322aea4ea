//! TCP socket and listener bindings for the Flog runtime.
//!
//! Grounded on `spark_transport_tcp::channel::TcpChannel` and
//! `TcpServerChannel`: an `Arc<Inner>` handle wrapping a
//! `tokio::sync::Mutex<TcpStream>`, `socket2::SockRef` for kernel-level
//! socket options, and the IPv6→IPv4 fallback dance on both `connect` and
//! `bind`.

mod config;
mod listener;
mod socket;

pub use config::TcpSocketConfig;
pub use listener::TcpListener;
pub use socket::TcpSocket;
