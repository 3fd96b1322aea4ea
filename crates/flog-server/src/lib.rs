//! A generic accept/dispatch server engine plus two façades
//! over it: [`http::HttpServer`] for HTTP/1.1 and [`rpc::RpcServer`] for
//! ONC-RPC, each serving one [`engine::RequestHandler`] over TCP, TLS, or
//! (ONC-RPC only) UDP.

mod config;
mod engine;
mod metrics;

pub mod http;
pub mod rpc;

pub use config::ServerConfig;
pub use engine::{RequestHandler, ResponseTarget, ServerHandle};
pub use http::HttpServer;
pub use metrics::{ServerMetrics, ServerMetricsSnapshot};
pub use rpc::RpcServer;
