//! Socket creation by URI scheme suffix plus the idle-socket pool's element type.
//!
//! Grounded on `spark_transport_tcp::channel::TcpChannel`'s
//! `Arc<dyn Channel>`-style dynamic dispatch for the stream case; UDP is
//! kept as its own variant rather than forced through the same `Socket`
//! trait object, since a datagram socket has no single owning peer the
//! way a stream connection does.

use crate::config::ClientConfig;
use flog_core::context::CallContext;
use flog_core::error::{CoreError, ErrorCategory, codes};
use flog_core::socket::{Socket, TracingSocket};
use flog_core::transport::{TransportSocketAddr, resolve_with_ipv4_fallback, should_retry_candidate};
use flog_core::uri::{TransportKind, Uri};
use flog_transport_tcp::TcpSocket;
use flog_transport_udp::UdpSocket;
use rustls_pki_types::ServerName;
use std::sync::Arc;

/// A pooled connection: either a stream socket (TCP or TLS, dispatched
/// dynamically since both implement [`Socket`] identically from the
/// engine's point of view) or a bound UDP socket paired with the single
/// peer it has been exchanging datagrams with.
pub enum ClientTransport {
    Stream(Arc<dyn Socket>),
    Datagram(UdpSocket, TransportSocketAddr),
}

impl ClientTransport {
    pub fn peer_addr(&self) -> Option<TransportSocketAddr> {
        match self {
            ClientTransport::Stream(s) => s.peer_addr(),
            ClientTransport::Datagram(_, peer) => Some(*peer),
        }
    }
}

/// Resolves `host:port` to an ordered candidate list (IPv6 before IPv4)
/// via the ambient async resolver.
async fn resolve_candidates(host: &str, port: u16) -> Result<Vec<TransportSocketAddr>, CoreError> {
    let addrs: Vec<std::net::SocketAddr> = tokio::net::lookup_host((host, port))
        .await
        .map_err(|e| CoreError::from_io(codes::CONNECT, e))?
        .collect();
    if addrs.is_empty() {
        return Err(CoreError::transport(codes::CONNECT, format!("no addresses resolved for {host}:{port}")));
    }
    Ok(resolve_with_ipv4_fallback(&addrs))
}

/// Creates a fresh (unpooled) transport for `uri`, dispatching on its
/// scheme suffix. Tries every resolved candidate in order, but only
/// moves on to the next one on an `EAFNOSUPPORT` failure
/// ([`should_retry_candidate`]) — matching the IPv6→IPv4 domain-fallback
/// invariant one level above the per-candidate family fallback each
/// transport crate already performs internally. Any other failure
/// (connection refused, timed out, ...) propagates immediately rather
/// than silently trying a different address family.
pub async fn connect(ctx: &CallContext, uri: &Uri, config: &ClientConfig, label: &str) -> Result<ClientTransport, CoreError> {
    let candidates = resolve_candidates(uri.host(), uri.port()).await?;
    let mut last_err: Option<CoreError> = None;

    for candidate in candidates {
        let attempt = match uri.transport_kind() {
            TransportKind::Tcp => connect_tcp(ctx, candidate, config, label).await,
            TransportKind::Tls => connect_tls(ctx, candidate, uri.host(), config, label).await,
            TransportKind::Udp => connect_udp(candidate).await,
        };
        match attempt {
            Ok(transport) => return Ok(transport),
            Err(err) => {
                if !should_retry_candidate(&err) {
                    return Err(err);
                }
                last_err = Some(err);
            }
        }
    }
    Err(last_err.unwrap_or_else(|| CoreError::transport(codes::CONNECT, "no address candidates")))
}

async fn connect_tcp(
    ctx: &CallContext,
    addr: TransportSocketAddr,
    config: &ClientConfig,
    label: &str,
) -> Result<ClientTransport, CoreError> {
    let socket = TcpSocket::connect(ctx, addr, config.tcp_socket_config).await?;
    Ok(ClientTransport::Stream(wrap_stream(socket, config, label)))
}

async fn connect_tls(
    ctx: &CallContext,
    addr: TransportSocketAddr,
    host: &str,
    config: &ClientConfig,
    label: &str,
) -> Result<ClientTransport, CoreError> {
    let connector = config.tls_connector.clone().ok_or_else(|| {
        CoreError::new(
            codes::CONFIGURE,
            ErrorCategory::Transport,
            "a TLS scheme was requested but no TlsConnector is configured",
        )
    })?;
    let server_name = ServerName::try_from(host.to_string())
        .map_err(|_| CoreError::transport(codes::CONNECT, format!("'{host}' is not a valid TLS server name")))?;
    let socket = connector.connect(ctx, addr, server_name, config.tcp_socket_config).await?;
    Ok(ClientTransport::Stream(wrap_stream(socket, config, label)))
}

async fn connect_udp(addr: TransportSocketAddr) -> Result<ClientTransport, CoreError> {
    let any_local: TransportSocketAddr = if addr.is_ipv6() {
        std::net::SocketAddr::new(std::net::IpAddr::V6(std::net::Ipv6Addr::UNSPECIFIED), 0).into()
    } else {
        std::net::SocketAddr::new(std::net::IpAddr::V4(std::net::Ipv4Addr::UNSPECIFIED), 0).into()
    };
    let socket = UdpSocket::bind(any_local).await?;
    Ok(ClientTransport::Datagram(socket, addr))
}

fn wrap_stream<S: Socket + 'static>(socket: S, config: &ClientConfig, label: &str) -> Arc<dyn Socket> {
    if config.tracing_enabled {
        Arc::new(TracingSocket::new(socket, label.to_string()))
    } else {
        Arc::new(socket)
    }
}
