use std::fmt;
use std::net::SocketAddr;

/// A resolved socket address. Thin wrapper over `std::net::SocketAddr` so
/// call sites outside this crate never need to depend on `std::net`
/// directly — every transport crate accepts and returns
/// `TransportSocketAddr`, matching `spark_core::transport::TransportSocketAddr`'s
/// role as the address currency between layers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TransportSocketAddr(SocketAddr);

impl TransportSocketAddr {
    pub fn is_ipv6(&self) -> bool {
        self.0.is_ipv6()
    }

    pub fn is_ipv4(&self) -> bool {
        self.0.is_ipv4()
    }

    pub fn port(&self) -> u16 {
        self.0.port()
    }

    pub fn as_std(&self) -> SocketAddr {
        self.0
    }
}

impl fmt::Display for TransportSocketAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl From<SocketAddr> for TransportSocketAddr {
    fn from(addr: SocketAddr) -> Self {
        Self(addr)
    }
}

impl From<TransportSocketAddr> for SocketAddr {
    fn from(addr: TransportSocketAddr) -> Self {
        addr.0
    }
}
