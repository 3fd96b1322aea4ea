//! Mutex-protected server-side counters, mirroring
//! [`flog_client`](../../flog-client)'s `ClientMetrics` shape on the accept
//! side.

use std::sync::Mutex;

#[derive(Debug, Default, Clone, Copy)]
pub struct ServerMetricsSnapshot {
    pub connections_accepted: u64,
    pub requests_handled: u64,
    pub malformed_disconnects: u64,
    pub write_errors: u64,
}

#[derive(Default)]
pub struct ServerMetrics {
    inner: Mutex<ServerMetricsSnapshot>,
}

impl ServerMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> ServerMetricsSnapshot {
        *self.inner.lock().expect("server metrics mutex poisoned")
    }

    pub(crate) fn record_connection_accepted(&self) {
        self.inner.lock().expect("server metrics mutex poisoned").connections_accepted += 1;
    }

    pub(crate) fn record_request_handled(&self) {
        self.inner.lock().expect("server metrics mutex poisoned").requests_handled += 1;
    }

    pub(crate) fn record_malformed_disconnect(&self) {
        self.inner.lock().expect("server metrics mutex poisoned").malformed_disconnects += 1;
    }

    pub(crate) fn record_write_error(&self) {
        self.inner.lock().expect("server metrics mutex poisoned").write_errors += 1;
    }
}
