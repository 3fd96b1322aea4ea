//! Transport-facing value types shared by every socket implementation:
//! addresses, half-close direction, and the domain-fallback resolver.
//!
//! Grounded on `spark_core::transport::{address, shutdown}`, which
//! represents addresses as raw byte arrays to stay `no_std`-friendly; this
//! workspace is `std`-only (it's built entirely on Tokio), so
//! [`TransportSocketAddr`] is a thin wrapper over `std::net::SocketAddr`
//! instead, keeping the same `Display`/ordering ergonomics without
//! reinventing address parsing.

mod address;
mod resolve;
mod shutdown;

pub use address::TransportSocketAddr;
pub use resolve::{resolve_with_ipv4_fallback, should_retry_candidate};
pub use shutdown::ShutdownDirection;
