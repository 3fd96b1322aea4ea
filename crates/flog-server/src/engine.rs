//! The generic server engine: accept → associate → read →
//! deserialize → dispatch → serialize → write, protocol agnostic. The
//! HTTP/1.1 and ONC-RPC façades (`crate::http`, `crate::rpc`) each drive
//! their own accept/connection loop using the pieces defined here —
//! [`RequestHandler`], [`ResponseTarget`], [`ServerMetrics`] — since the two
//! protocols' wire decoders are shaped too differently (`HttpRequest`'s
//! three-phase front matter vs. ONC-RPC's record-mark framing) to share one
//! templated read loop without obscuring either.
//!
//! Grounded on `spark_transport_tcp::channel::TcpServerChannel`'s
//! accept-then-spawn-per-connection pattern, generalized from its
//! single-protocol body to the `RequestHandler` trait below.

use async_trait::async_trait;
use flog_core::context::CallContext;
use flog_core::error::CoreError;
use flog_core::socket::Socket;
use flog_core::transport::TransportSocketAddr;
use flog_transport_udp::UdpSocket;
use std::sync::Arc;
use tokio::sync::Notify;
use tokio::task::JoinHandle;

/// A protocol binding for the generic server engine. `Request`/`Response`
/// are the façade's own codec types (`HttpRequest`/`HttpResponse`,
/// `RpcCallRequest`/`RpcReplyResponse`).
#[async_trait]
pub trait RequestHandler: Send + Sync {
    type Request: Send;
    type Response: Send;

    async fn handle(&self, request: Self::Request) -> Self::Response;
}

/// Where a handled request's response goes, erasing whether it arrived
/// over a stream connection or a UDP datagram.
#[derive(Clone)]
pub enum ResponseTarget {
    Stream(Arc<dyn Socket>),
    Datagram(Arc<UdpSocket>, TransportSocketAddr),
}

impl ResponseTarget {
    pub async fn respond(&self, ctx: &CallContext, bytes: &[u8]) -> Result<(), CoreError> {
        match self {
            ResponseTarget::Stream(socket) => {
                socket.write(ctx, bytes).await?;
                Ok(())
            }
            ResponseTarget::Datagram(socket, peer) => {
                socket.send_to(ctx, bytes, *peer).await?;
                Ok(())
            }
        }
    }
}

/// A bound server's lifetime handle: its local address and a cooperative
/// shutdown signal for the accept loop and every connection task spawned
/// from it.
pub struct ServerHandle {
    local_addr: TransportSocketAddr,
    shutdown: Arc<Notify>,
    stopped: Arc<std::sync::atomic::AtomicBool>,
    accept_task: JoinHandle<()>,
}

impl ServerHandle {
    pub(crate) fn new(local_addr: TransportSocketAddr, shutdown: Arc<Notify>, stopped: Arc<std::sync::atomic::AtomicBool>, accept_task: JoinHandle<()>) -> Self {
        Self { local_addr, shutdown, stopped, accept_task }
    }

    pub fn local_addr(&self) -> TransportSocketAddr {
        self.local_addr
    }

    /// Signals the accept loop to stop taking new connections and waits
    /// for it to exit. In-flight connection tasks are not awaited; each
    /// one observes [`ShutdownSignal::is_stopped`] on its next read and
    /// exits on its own.
    pub async fn shutdown(self) {
        self.stopped.store(true, std::sync::atomic::Ordering::SeqCst);
        self.shutdown.notify_waiters();
        let _ = self.accept_task.await;
    }
}

/// A cheap, cloneable handle a connection task can poll to know whether
/// the server is shutting down, without holding the accept loop's own
/// `JoinHandle`.
#[derive(Clone)]
pub struct ShutdownSignal {
    notify: Arc<Notify>,
    stopped: Arc<std::sync::atomic::AtomicBool>,
}

impl ShutdownSignal {
    pub fn new() -> (Self, Arc<Notify>, Arc<std::sync::atomic::AtomicBool>) {
        let notify = Arc::new(Notify::new());
        let stopped = Arc::new(std::sync::atomic::AtomicBool::new(false));
        (Self { notify: Arc::clone(&notify), stopped: Arc::clone(&stopped) }, notify, stopped)
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(std::sync::atomic::Ordering::SeqCst)
    }

    pub async fn wait(&self) {
        self.notify.notified().await;
    }
}
