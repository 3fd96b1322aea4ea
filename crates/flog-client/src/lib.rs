//! A generic, protocol-agnostic client engine plus two thin
//! façades over it: [`http::HttpClient`] for HTTP/1.1 and [`rpc::RpcClient`]
//! for ONC-RPC. Both share the same idle-socket pool, timeout discipline
//! and metrics.

mod config;
mod engine;
mod metrics;
mod transport;

pub mod http;
pub mod rpc;

pub use config::ClientConfig;
pub use engine::{ClientEngine, FeedOutcome};
pub use http::HttpClient;
pub use metrics::{ClientMetrics, ClientMetricsSnapshot};
pub use rpc::RpcClient;
pub use transport::ClientTransport;
