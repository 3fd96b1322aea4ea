//! End-to-end TLS handshake + read/write round-trip over a self-signed
//! certificate.

use flog_core::context::CallContext;
use flog_core::socket::Socket;
use flog_core::transport::TransportSocketAddr;
use flog_transport_tcp::TcpSocketConfig;
use flog_transport_tls::{TlsAcceptor, TlsConnector};
use rcgen::generate_simple_self_signed;
use rustls_pki_types::{PrivateKeyDer, PrivatePkcs8KeyDer, ServerName};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;
use tokio::net::TcpListener;

fn self_signed_server_config() -> rustls::ServerConfig {
    let certified = generate_simple_self_signed(vec!["localhost".to_string()]).unwrap();
    let cert_der = certified.cert.der().clone();
    let key_der = PrivateKeyDer::Pkcs8(PrivatePkcs8KeyDer::from(certified.key_pair.serialize_der()));

    rustls::ServerConfig::builder()
        .with_no_client_auth()
        .with_single_cert(vec![cert_der], key_der)
        .expect("self-signed cert/key pair builds a valid ServerConfig")
}

#[tokio::test(flavor = "multi_thread")]
async fn https_style_round_trip_with_self_signed_cert_and_verify_none() {
    // Ambient test logging — same `tracing_subscriber::fmt` setup used
    // elsewhere in this workspace to surface `tracing` spans during `cargo test`.
    let _ = tracing_subscriber::fmt::try_init();

    let server_config = Arc::new(self_signed_server_config());
    let acceptor = TlsAcceptor::new(server_config);

    let raw_listener = TcpListener::bind(SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 0))
        .await
        .unwrap();
    let local: TransportSocketAddr = raw_listener.local_addr().unwrap().into();

    let server = tokio::spawn(async move {
        let ctx = CallContext::new();
        let (stream, _peer) = raw_listener.accept().await.unwrap();
        let tls = acceptor.accept(&ctx, stream).await.unwrap();
        let mut buf = [0u8; 2];
        tls.read(&ctx, &mut buf).await.unwrap();
        assert_eq!(&buf, b"hi");
        tls.write(&ctx, b"ok").await.unwrap();
    });

    let client_config = flog_transport_tls::insecure_client_config();
    let connector = TlsConnector::new(client_config);
    let server_name = ServerName::try_from("localhost").unwrap();
    let ctx = CallContext::new();
    let tls = connector
        .connect(&ctx, local, server_name, TcpSocketConfig::new())
        .await
        .unwrap();
    tls.write(&ctx, b"hi").await.unwrap();
    let mut buf = [0u8; 2];
    tls.read(&ctx, &mut buf).await.unwrap();
    assert_eq!(&buf, b"ok");

    server.await.unwrap();
}
