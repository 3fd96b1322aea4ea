//! UDP datagram socket binding for the Flog runtime.
//!
//! Grounded on `spark_transport_tcp::channel::TcpChannel`'s shape, adapted
//! to the connectionless `recv_from`/`send_to` pair instead of
//! stream-oriented `read`/`write` — there's no dedicated upstream UDP
//! transport crate to ground this on, so this binding follows `flog-transport-tcp`'s own
//! pattern (Arc<Inner>, `run_with_deadline` per call) one level down.

mod socket;

pub use socket::UdpSocket;
