use socket2::SockRef;
use std::io;
use std::time::Duration;
use tokio::net::TcpStream;

/// Kernel-level socket options applied to every `TcpSocket` at construction
/// time. `None` on any field means "leave the kernel
/// default in place".
///
/// Grounded on `spark_transport_tcp::channel::TcpSocketConfig`, extended
/// with `TCP_NODELAY`/`SO_KEEPALIVE` (the upstream version only carries
/// `SO_LINGER`).
#[derive(Clone, Copy, Debug, Default)]
pub struct TcpSocketConfig {
    linger: Option<Duration>,
    nodelay: Option<bool>,
    keepalive: Option<bool>,
}

impl TcpSocketConfig {
    pub const fn new() -> Self {
        Self {
            linger: None,
            nodelay: None,
            keepalive: None,
        }
    }

    pub fn with_linger(mut self, linger: Option<Duration>) -> Self {
        self.linger = linger;
        self
    }

    pub fn with_nodelay(mut self, nodelay: bool) -> Self {
        self.nodelay = Some(nodelay);
        self
    }

    pub fn with_keepalive(mut self, keepalive: bool) -> Self {
        self.keepalive = Some(keepalive);
        self
    }

    /// Applies the configured socket options to an already-connected
    /// stream. Public so sibling transport crates (e.g. `flog-transport-tls`,
    /// which drives its own raw `TcpStream::connect` ahead of the TLS
    /// handshake) can reuse the same option set without re-deriving it.
    pub fn apply(&self, stream: &TcpStream) -> io::Result<()> {
        let sock = SockRef::from(stream);
        if let Some(linger) = self.linger {
            sock.set_linger(Some(linger))?;
        }
        if let Some(nodelay) = self.nodelay {
            sock.set_nodelay(nodelay)?;
        }
        if let Some(keepalive) = self.keepalive {
            sock.set_keepalive(keepalive)?;
        }
        Ok(())
    }
}
